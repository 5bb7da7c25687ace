//! Encode/decode scenarios across the full item vocabulary, plus round trips
//! over generated layouts with nested objects and arrays

use hex_literal::hex;
use layout_codec::{
    decode, decode_prefix, decode_with, encode, encoded_size, CodecConfig, CodecError,
};
use layout_types::{
    ArrayLength, Endianness, IntegerItem, Layout, LayoutItem, LengthPrefix, LengthUnit, Record,
    Value,
};
use proptest::prelude::*;

mod common;

use common::{fill, layout_strategy, Entropy};

fn output() -> Layout {
    Layout::builder()
        .uint("amount", 8)
        .prefixed_bytes("script", 1)
        .build()
        .unwrap()
}

fn transaction() -> Layout {
    Layout::builder()
        .const_bytes("magic", hex!("f9beb4d9").to_vec())
        .const_uint("version", 2, 2u16)
        .field(
            "lock_time",
            LayoutItem::Integer(IntegerItem::unsigned(4).with_endianness(Endianness::Little)),
        )
        .array(
            "outputs",
            output(),
            ArrayLength::Prefixed {
                prefix: LengthPrefix::new(1),
                unit: LengthUnit::Elements,
            },
        )
        .object(
            "signer",
            Layout::builder().bytes("key", 4).int("weight", 1).build().unwrap(),
        )
        .rest_bytes("witness")
        .build()
        .unwrap()
}

fn sample() -> Record {
    let outputs = vec![
        Value::Object(
            Record::new()
                .with("amount", 1_000u64)
                .with("script", hex!("51").to_vec()),
        ),
        Value::Object(
            Record::new()
                .with("amount", 2u64)
                .with("script", Vec::<u8>::new()),
        ),
    ];
    Record::new()
        .with("lock_time", 0x0102u32)
        .with("outputs", outputs)
        .with(
            "signer",
            Record::new().with("key", hex!("aabbccdd")).with("weight", -1i64),
        )
        .with("witness", hex!("0102").to_vec())
}

#[test]
fn test_transaction_wire_format() {
    let encoded = encode(&transaction(), &sample()).unwrap();
    assert_eq!(
        encoded,
        hex!(
            "f9beb4d9" "0002" "02010000" "02"
            "00000000000003e8" "01" "51"
            "0000000000000002" "00"
            "aabbccdd" "ff"
            "0102"
        )
    );
    assert_eq!(encoded_size(&transaction(), &sample()).unwrap(), encoded.len());
}

#[test]
fn test_transaction_decodes_with_constants() {
    let encoded = encode(&transaction(), &sample()).unwrap();
    let decoded = decode(&transaction(), &encoded).unwrap();

    assert_eq!(decoded.get("magic"), Some(&Value::Bytes(hex!("f9beb4d9").to_vec())));
    assert_eq!(decoded.get("version"), Some(&Value::Uint(2)));
    assert_eq!(decoded.get("lock_time"), Some(&Value::Uint(0x0102)));
    assert_eq!(decoded.get("outputs"), sample().get("outputs"));
    assert_eq!(decoded.get("signer"), sample().get("signer"));
    assert_eq!(decoded.get("witness"), sample().get("witness"));

    let names: Vec<&str> = decoded.iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec!["magic", "version", "lock_time", "outputs", "signer", "witness"]
    );
}

#[test]
fn test_truncated_inputs_are_out_of_bounds() {
    let layout = Layout::builder()
        .const_uint("tag", 1, 1u8)
        .uint("value", 4)
        .build()
        .unwrap();
    let err = decode(&layout, &hex!("01000000")).unwrap_err();
    assert!(matches!(err, CodecError::OutOfBounds { need: 4, available: 3, .. }));

    let encoded = encode(&transaction(), &sample()).unwrap();
    // the remainder swallows any cut inside the witness, so cut earlier
    let cut = &encoded[..encoded.len() - 4];
    assert!(decode(&transaction(), cut).unwrap_err().is_truncation());
}

#[test]
fn test_consume_all_from_config() {
    let layout = Layout::builder().uint("value", 2).build().unwrap();
    let strict = CodecConfig::strict();

    assert_eq!(decode_prefix(&layout, &hex!("00010203")).unwrap().1, 2);
    assert!(decode_with(&layout, &hex!("0001"), &strict.decode).is_ok());
    assert!(matches!(
        decode_with(&layout, &hex!("00010203"), &strict.decode),
        Err(CodecError::TrailingBytes { consumed: 2, total: 4 })
    ));
}

#[test]
fn test_wide_integers() {
    let layout = Layout::builder()
        .uint("wide", 16)
        .int("signed_wide", 16)
        .uint("odd", 3)
        .build()
        .unwrap();
    let record = Record::new()
        .with("wide", u128::MAX)
        .with("signed_wide", i128::MIN)
        .with("odd", 0x00ff_ffffu32);
    let encoded = encode(&layout, &record).unwrap();
    assert_eq!(encoded.len(), 35);
    assert_eq!(decode(&layout, &encoded).unwrap(), record);

    let too_big = record.clone().with("odd", 0x0100_0000u32);
    assert!(matches!(
        encode(&layout, &too_big),
        Err(CodecError::RangeError { size: 3, .. })
    ));
}

#[test]
fn test_fixed_array_count_mismatch() {
    let layout = Layout::builder()
        .array("pair", output(), ArrayLength::Fixed(2))
        .build()
        .unwrap();
    let record = Record::new().with("pair", vec![Value::Object(Record::new())]);
    assert_eq!(
        encode(&layout, &record).unwrap_err(),
        CodecError::size_mismatch("pair", 2, 1)
    );
}

fn flat_layout() -> Layout {
    Layout::builder()
        .const_uint("tag", 1, 7u8)
        .uint("a", 2)
        .field(
            "b",
            LayoutItem::Integer(IntegerItem::signed(4).with_endianness(Endianness::Little)),
        )
        .prefixed_bytes("memo", 2)
        .array(
            "items",
            Layout::builder().uint("x", 1).bytes("y", 2).build().unwrap(),
            ArrayLength::Prefixed {
                prefix: LengthPrefix::new(2),
                unit: LengthUnit::Bytes,
            },
        )
        .rest_bytes("tail")
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn decode_inverts_encode(
        a in any::<u16>(),
        b in any::<i32>(),
        memo in prop::collection::vec(any::<u8>(), 0..40),
        items in prop::collection::vec((any::<u8>(), any::<[u8; 2]>()), 0..6),
        tail in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let items: Vec<Value> = items
            .into_iter()
            .map(|(x, y)| Value::Object(Record::new().with("x", x).with("y", y)))
            .collect();
        let record = Record::new()
            .with("a", a)
            .with("b", i64::from(b))
            .with("memo", memo)
            .with("items", items)
            .with("tail", tail);

        let layout = flat_layout();
        let encoded = encode(&layout, &record).unwrap();
        prop_assert_eq!(encoded_size(&layout, &record).unwrap(), encoded.len());

        let decoded = decode(&layout, &encoded).unwrap();
        prop_assert_eq!(decoded.get("tag"), Some(&Value::Uint(7)));
        for (name, value) in record.iter() {
            prop_assert_eq!(decoded.get(name), Some(value));
        }
        prop_assert_eq!(encode(&layout, &decoded).unwrap(), encoded);
    }

    #[test]
    fn generated_layouts_round_trip(
        layout in layout_strategy(),
        entropy in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let record = fill(&layout, &mut Entropy::new(entropy));
        let encoded = encode(&layout, &record).unwrap();
        prop_assert_eq!(encoded_size(&layout, &record).unwrap(), encoded.len());

        let (decoded, consumed) = decode_prefix(&layout, &encoded).unwrap();
        prop_assert_eq!(consumed, encoded.len());
        prop_assert_eq!(decoded, record);
    }
}
