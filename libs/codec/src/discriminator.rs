//! # Layout Discrimination
//!
//! Given a fixed array of candidate layouts and an unlabeled buffer, find
//! which layouts the buffer can conform to, using only its length and a few
//! byte inspections. Wire formats without a type header are told apart this
//! way.
//!
//! ## Algorithm
//!
//! Synthesis is a greedy divide-and-conquer over candidate sets. Two kinds of
//! test exist:
//!
//! - **byte test** at position `p`: the buffer is either too short to have a
//!   byte at `p`, or it has some value there. Layouts with a known constant at
//!   `p` survive only their own value; layouts without one survive every value
//!   they can reach; layouts whose minimum size does not reach past `p` are
//!   the only survivors of the too-short outcome.
//! - **size test**: layouts survive when the buffer length is within their
//!   size bounds.
//!
//! The *power* of a test over a set is the number of candidates it is
//! guaranteed to eliminate whatever the buffer holds, i.e. the minimum over
//! its outcomes. A test is *perfect* when its power is `|set| - 1`.
//!
//! At every set the synthesizer takes a perfect byte test if there is one,
//! else a perfect size test, else the most powerful byte test unless the size
//! test is strictly stronger. It then recurses into every outcome with the
//! tests not yet applied. A set on which no test has positive power is
//! *indistinguishable*: the layouts cannot be separated from buffer evidence
//! alone and classification reports all of them.
//!
//! The result is not guaranteed to be an optimal decision tree, but synthesis
//! is fast and the trees are shallow for realistic candidate counts.
//!
//! Size bounds are intervals only. A layout holding an array of 2-byte
//! integers can never have odd size, yet is treated as `[0, ∞)`; the size
//! test therefore under-reports its power in such cases rather than tracking
//! every combination of offsets and multiples.
//!
//! ## Usage
//!
//! ```rust
//! use layout_codec::layout_discriminator;
//! use layout_types::Layout;
//!
//! let transfer = Layout::builder().const_uint("tag", 1, 1u8).uint("amount", 4).build()?;
//! let attest = Layout::builder().const_uint("tag", 1, 2u8).bytes("addr", 32).build()?;
//!
//! let discriminator = layout_discriminator(&[transfer, attest], false)?;
//! assert_eq!(discriminator.discriminate(&[1, 0, 0, 0, 9]), Some(0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use layout_types::Layout;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace, warn};

use crate::bounds::{analyze, Bounds, LayoutMeta};
use crate::candidates::Candidates;
use crate::config::DiscriminatorConfig;
use crate::error::{CodecError, CodecResult};

/// Byte test narrowed to the candidate set it was chosen for
#[derive(Debug, Clone, PartialEq, Eq)]
struct ByteTest {
    position: usize,
    /// Survivors when the buffer ends at or before `position`
    out_of_bounds: Candidates,
    /// Candidates with a known constant at `position`, by value (ascending)
    values: Vec<(u8, Candidates)>,
    /// Candidates that accept any value at `position`
    any_value: Candidates,
}

impl ByteTest {
    fn survivors(&self, encoded: &[u8]) -> Candidates {
        match encoded.get(self.position) {
            None => self.out_of_bounds,
            Some(byte) => self.any_value | self.with_value(*byte),
        }
    }

    fn with_value(&self, byte: u8) -> Candidates {
        self.values
            .binary_search_by_key(&byte, |(value, _)| *value)
            .map_or(Candidates::EMPTY, |i| self.values[i].1)
    }

    /// Every distinct survivor set this test can produce
    fn outcomes(&self) -> impl Iterator<Item = Candidates> + '_ {
        std::iter::once(self.out_of_bounds)
            .chain(std::iter::once(self.any_value))
            .chain(self.values.iter().map(|(_, set)| *set | self.any_value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Strategy {
    Byte(ByteTest),
    Size,
    Indistinguishable,
}

/// Everything known about one byte position across all candidate layouts
#[derive(Debug, Clone)]
struct BytePosition {
    position: usize,
    values: BTreeMap<u8, Candidates>,
    /// Layouts whose minimum size does not reach past the position
    may_be_short: Candidates,
    /// Layouts without a constant here whose maximum size reaches past it
    reaches_any: Candidates,
}

impl BytePosition {
    fn narrow(&self, candidates: Candidates) -> ByteTest {
        ByteTest {
            position: self.position,
            out_of_bounds: self.may_be_short & candidates,
            values: self
                .values
                .iter()
                .map(|(value, set)| (*value, *set & candidates))
                .filter(|(_, set)| !set.is_empty())
                .collect(),
            any_value: self.reaches_any & candidates,
        }
    }
}

/// Guaranteed eliminations of a byte test over `candidates`, 0 if the test
/// has no known constant among them
fn byte_power(test: &ByteTest, candidates: Candidates) -> usize {
    if test.values.is_empty() {
        return 0;
    }
    let total = candidates.count();
    std::iter::once(test.out_of_bounds)
        .chain(test.values.iter().map(|(_, set)| *set | test.any_value))
        .map(|survivors| total - survivors.count())
        .min()
        .unwrap_or(0)
}

/// Lengths at which the set of layouts admitting that length changes
///
/// Entry `(start, set)` holds for every length in `start..next_start`.
fn size_classes(bounds: &[Bounds]) -> Vec<(usize, Candidates)> {
    let mut breakpoints: Vec<usize> = std::iter::once(0)
        .chain(bounds.iter().map(|b| b.lower))
        .chain(bounds.iter().filter_map(|b| b.upper.and_then(|u| u.checked_add(1))))
        .collect();
    breakpoints.sort_unstable();
    breakpoints.dedup();

    breakpoints
        .into_iter()
        .map(|size| {
            let set = bounds
                .iter()
                .enumerate()
                .filter(|(_, b)| b.contains(size))
                .map(|(i, _)| i)
                .collect();
            (size, set)
        })
        .collect()
}

struct Synthesizer<'a> {
    positions: &'a [BytePosition],
    size_classes: &'a [(usize, Candidates)],
    strategies: HashMap<Candidates, Strategy>,
    indistinguishable: Vec<Candidates>,
}

impl Synthesizer<'_> {
    fn install(&mut self, candidates: Candidates, strategy: Strategy) {
        trace!(?candidates, ?strategy, "installing discrimination strategy");
        self.strategies.insert(candidates, strategy);
    }

    /// Distinct non-empty survivor sets of the size test and its power
    fn size_groups(&self, candidates: Candidates) -> (Vec<Candidates>, usize) {
        let mut groups: Vec<Candidates> = self
            .size_classes
            .iter()
            .map(|(_, set)| *set & candidates)
            .filter(|set| !set.is_empty())
            .collect();
        groups.sort_unstable();
        groups.dedup();

        let largest = groups.iter().map(Candidates::count).max().unwrap_or(0);
        (groups, candidates.count() - largest)
    }

    fn build(&mut self, candidates: Candidates, tests: &[usize]) {
        if candidates.count() <= 1 || self.strategies.contains_key(&candidates) {
            return;
        }
        let perfect = candidates.count() - 1;
        let (size_groups, size_power) = self.size_groups(candidates);

        let mut ranked: Vec<(usize, usize, ByteTest)> = Vec::new();
        for &index in tests {
            let test = self.positions[index].narrow(candidates);
            let power = byte_power(&test, candidates);
            if power == 0 {
                continue;
            }
            if power == perfect {
                self.install(candidates, Strategy::Byte(test));
                return;
            }
            ranked.push((power, index, test));
        }

        if size_power == perfect {
            self.install(candidates, Strategy::Size);
            return;
        }

        // stable: equal powers keep ascending byte position
        ranked.sort_by(|lhs, rhs| rhs.0.cmp(&lhs.0));
        let remaining: Vec<usize> = ranked.iter().map(|(_, index, _)| *index).collect();

        match ranked.into_iter().next() {
            Some((power, index, test)) if power >= size_power => {
                let rest: Vec<usize> = remaining.into_iter().filter(|&i| i != index).collect();
                let outcomes: Vec<Candidates> = test.outcomes().collect();
                self.install(candidates, Strategy::Byte(test));
                for outcome in outcomes {
                    self.build(outcome, &rest);
                }
            }
            _ if size_power > 0 => {
                self.install(candidates, Strategy::Size);
                for group in size_groups {
                    self.build(group, &remaining);
                }
            }
            _ => {
                warn!(?candidates, "candidate layouts are indistinguishable");
                self.install(candidates, Strategy::Indistinguishable);
                self.indistinguishable.push(candidates);
            }
        }
    }
}

/// Decision procedure narrowing a buffer to the layouts it may conform to
///
/// Built once per candidate array and immutable afterwards, so one instance
/// can be shared freely between threads and reused for every buffer.
#[derive(Debug, Clone)]
pub struct Discriminator {
    metas: Vec<LayoutMeta>,
    size_classes: Vec<(usize, Candidates)>,
    strategies: HashMap<Candidates, Strategy>,
    /// Memoized candidate sets grouped by cardinality, for superset lookup
    by_count: BTreeMap<usize, Vec<Candidates>>,
    indistinguishable: Vec<Candidates>,
}

impl Discriminator {
    /// Synthesize a discriminator over `layouts`
    ///
    /// Succeeds for any array of 1..=128 layouts
    /// ([`Candidates::CAPACITY`], one bit per layout); use
    /// [`is_distinguishable`](Self::is_distinguishable) or
    /// [`layout_discriminator`] to insist on full separation.
    ///
    /// # Errors
    ///
    /// * [`CodecError::EmptyCandidateSet`] when `layouts` is empty
    /// * [`CodecError::TooManyCandidates`] when `layouts` holds more than
    ///   [`Candidates::CAPACITY`] layouts
    pub fn new(layouts: &[Layout]) -> CodecResult<Self> {
        if layouts.is_empty() {
            return Err(CodecError::EmptyCandidateSet);
        }
        if layouts.len() > Candidates::CAPACITY {
            return Err(CodecError::TooManyCandidates {
                count: layouts.len(),
                max: Candidates::CAPACITY,
            });
        }

        let metas: Vec<LayoutMeta> = layouts.iter().map(analyze).collect();
        let bounds: Vec<Bounds> = metas.iter().map(|m| m.bounds).collect();
        let size_classes = size_classes(&bounds);
        let positions = byte_positions(&metas);
        let all = Candidates::all(layouts.len());

        let mut synthesizer = Synthesizer {
            positions: &positions,
            size_classes: &size_classes,
            strategies: HashMap::new(),
            indistinguishable: Vec::new(),
        };
        let tests: Vec<usize> = (0..positions.len()).collect();
        synthesizer.build(all, &tests);

        let Synthesizer {
            strategies,
            indistinguishable,
            ..
        } = synthesizer;

        let mut by_count: BTreeMap<usize, Vec<Candidates>> = BTreeMap::new();
        for set in strategies.keys() {
            by_count.entry(set.count()).or_default().push(*set);
        }
        for sets in by_count.values_mut() {
            sets.sort_unstable();
        }

        debug!(
            layouts = layouts.len(),
            byte_positions = positions.len(),
            strategies = strategies.len(),
            distinguishable = indistinguishable.is_empty(),
            "synthesized layout discriminator"
        );

        Ok(Self {
            metas,
            size_classes,
            strategies,
            by_count,
            indistinguishable,
        })
    }

    /// Synthesize and apply the ambiguity policy from `config`
    pub fn with_config(layouts: &[Layout], config: &DiscriminatorConfig) -> CodecResult<Self> {
        let discriminator = Self::new(layouts)?;
        if !config.allow_ambiguous {
            if let Some(set) = discriminator.indistinguishable.first() {
                return Err(CodecError::AmbiguousLayouts {
                    candidates: set.to_vec(),
                });
            }
        }
        Ok(discriminator)
    }

    /// Whether every buffer is narrowed to at most one layout
    pub fn is_distinguishable(&self) -> bool {
        self.indistinguishable.is_empty()
    }

    /// Candidate sets no buffer evidence can separate
    pub fn ambiguous_sets(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        self.indistinguishable.iter().map(Candidates::to_vec)
    }

    pub fn layout_count(&self) -> usize {
        self.metas.len()
    }

    /// Number of memoized decision nodes
    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    /// Analyzer output for layout `index`
    pub fn meta(&self, index: usize) -> Option<&LayoutMeta> {
        self.metas.get(index)
    }

    pub fn bounds(&self, index: usize) -> Option<Bounds> {
        self.metas.get(index).map(|m| m.bounds)
    }

    /// Indices of every layout `encoded` may conform to, ascending
    ///
    /// More than one index means the layouts are ambiguous for this buffer;
    /// none means no layout matches structurally.
    pub fn classify(&self, encoded: &[u8]) -> Vec<usize> {
        self.classify_set(encoded).to_vec()
    }

    /// First surviving layout, for callers that rely on full separation
    pub fn discriminate(&self, encoded: &[u8]) -> Option<usize> {
        self.classify_set(encoded).first()
    }

    pub fn classify_set(&self, encoded: &[u8]) -> Candidates {
        let mut candidates = Candidates::all(self.metas.len());
        while candidates.count() > 1 {
            let Some(strategy) = self
                .strategies
                .get(&candidates)
                .or_else(|| self.superset_strategy(candidates))
            else {
                break;
            };

            let narrowed = match strategy {
                Strategy::Indistinguishable => break,
                Strategy::Size => candidates & self.size_class(encoded.len()),
                Strategy::Byte(test) => candidates & test.survivors(encoded),
            };
            if narrowed == candidates {
                // only reachable through a superset strategy that does not
                // split this particular set
                break;
            }
            candidates = narrowed;
        }
        candidates
    }

    fn size_class(&self, size: usize) -> Candidates {
        let index = self.size_classes.partition_point(|(start, _)| *start <= size);
        index
            .checked_sub(1)
            .and_then(|i| self.size_classes.get(i))
            .map_or(Candidates::EMPTY, |(_, set)| *set)
    }

    /// Strategy of the smallest memoized superset of `candidates`
    ///
    /// Applying a superset's tests can only narrow further, never drop a
    /// layout that the buffer actually conforms to.
    fn superset_strategy(&self, candidates: Candidates) -> Option<&Strategy> {
        self.by_count
            .range(candidates.count() + 1..)
            .flat_map(|(_, sets)| sets.iter())
            .find(|set| candidates.is_subset_of(**set))
            .and_then(|set| self.strategies.get(set))
    }
}

fn byte_positions(metas: &[LayoutMeta]) -> Vec<BytePosition> {
    let mut values: BTreeMap<usize, BTreeMap<u8, Candidates>> = BTreeMap::new();
    for (index, meta) in metas.iter().enumerate() {
        for (position, byte) in meta.fixed_bytes.bytes() {
            values
                .entry(position)
                .or_default()
                .entry(byte)
                .or_default()
                .insert(index);
        }
    }

    values
        .into_iter()
        .map(|(position, values)| {
            let fixed: Candidates = values.values().fold(Candidates::EMPTY, |acc, set| acc | *set);
            let mut may_be_short = Candidates::EMPTY;
            let mut reaches_any = Candidates::EMPTY;
            for (index, meta) in metas.iter().enumerate() {
                if meta.bounds.lower <= position {
                    may_be_short.insert(index);
                }
                if !fixed.contains(index) && meta.bounds.reaches(position) {
                    reaches_any.insert(index);
                }
            }
            BytePosition {
                position,
                values,
                may_be_short,
                reaches_any,
            }
        })
        .collect()
}

/// Build a discriminator, failing with [`CodecError::AmbiguousLayouts`]
/// unless `allow_ambiguous` is set or the layouts are fully separable
pub fn layout_discriminator(layouts: &[Layout], allow_ambiguous: bool) -> CodecResult<Discriminator> {
    Discriminator::with_config(layouts, &DiscriminatorConfig { allow_ambiguous })
}
