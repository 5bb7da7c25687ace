//! Loading layouts, records, buffers and configuration from the command line

use anyhow::{bail, Context, Result};
use layout_codec::CodecConfig;
use layout_types::{Layout, Record};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a JSON array of layouts and validate every entry
pub fn load_layouts(path: &Path) -> Result<Vec<Layout>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read layouts from {}", path.display()))?;
    let layouts: Vec<Layout> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of layouts", path.display()))?;
    for (index, layout) in layouts.iter().enumerate() {
        layout
            .validate()
            .with_context(|| format!("Layout {index} in {} is invalid", path.display()))?;
    }
    debug!(count = layouts.len(), path = %path.display(), "loaded layouts");
    Ok(layouts)
}

pub fn load_record(path: &Path) -> Result<Record> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read record from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a valid record", path.display()))
}

/// TOML file if given, else environment overrides over defaults
pub fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
        }
        None => Ok(CodecConfig::from_env()),
    }
}

/// Hex buffer, with or without `0x`, whitespace ignored
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    if digits.len() % 2 != 0 {
        bail!("Hex input has an odd number of digits");
    }
    hex::decode(digits).context("Invalid hex input")
}

/// Checked layout lookup
pub fn pick(layouts: &[Layout], index: usize) -> Result<&Layout> {
    match layouts.get(index) {
        Some(layout) => Ok(layout),
        None => bail!("Layout index {index} out of range ({} layouts)", layouts.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0x01ff").unwrap(), vec![0x01, 0xff]);
        assert_eq!(parse_hex("01 02\n03").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_load_layouts_validates() {
        let good = file_with(r#"[[{"name": "tag", "item": {"integer": {"size": 1, "signed": false}}}]]"#);
        let layouts = load_layouts(good.path()).unwrap();
        assert_eq!(layouts.len(), 1);
        assert_eq!(layouts[0].len(), 1);

        let bad = file_with(r#"[[{"name": "tag", "item": {"integer": {"size": 17, "signed": false}}}]]"#);
        let err = load_layouts(bad.path()).unwrap_err();
        assert!(err.to_string().contains("Layout 0"));
    }

    #[test]
    fn test_load_config_from_toml() {
        let file = file_with("[decode]\nconsume_all = true\n");
        let config = load_config(Some(file.path())).unwrap();
        assert!(config.decode.consume_all);
        assert!(!config.discriminator.allow_ambiguous);
    }

    #[test]
    fn test_pick_out_of_range() {
        assert!(pick(&[], 0).is_err());
    }
}
