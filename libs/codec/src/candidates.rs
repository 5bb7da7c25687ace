//! Candidate layout sets
//!
//! A fixed-width bitset over layout indices. Discriminator synthesis spends
//! most of its time intersecting, differencing and counting these sets, and
//! realistic candidate arrays hold tens of layouts, so a single `u128` word
//! covers them with branch-free set algebra.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Sub, SubAssign};

/// Set of layout indices, `0..Candidates::CAPACITY`
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Candidates(u128);

impl Candidates {
    pub const CAPACITY: usize = u128::BITS as usize;
    pub const EMPTY: Candidates = Candidates(0);

    /// The set `{0, 1, .., count - 1}`
    pub fn all(count: usize) -> Self {
        debug_assert!(count <= Self::CAPACITY);
        if count >= Self::CAPACITY {
            Candidates(u128::MAX)
        } else {
            Candidates((1u128 << count) - 1)
        }
    }

    pub fn single(index: usize) -> Self {
        debug_assert!(index < Self::CAPACITY);
        Candidates(1u128 << index)
    }

    pub fn insert(&mut self, index: usize) {
        *self |= Self::single(index);
    }

    pub fn contains(&self, index: usize) -> bool {
        index < Self::CAPACITY && self.0 & (1u128 << index) != 0
    }

    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_subset_of(&self, other: Candidates) -> bool {
        self.0 & other.0 == self.0
    }

    /// Lowest index in the set
    pub fn first(&self) -> Option<usize> {
        (self.0 != 0).then(|| self.0.trailing_zeros() as usize)
    }

    /// Indices in ascending order
    pub fn iter(&self) -> CandidatesIter {
        CandidatesIter(self.0)
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

impl FromIterator<usize> for Candidates {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Candidates::EMPTY;
        for index in iter {
            set.insert(index);
        }
        set
    }
}

impl IntoIterator for Candidates {
    type Item = usize;
    type IntoIter = CandidatesIter;

    fn into_iter(self) -> CandidatesIter {
        self.iter()
    }
}

/// Ascending iterator over a [`Candidates`] set
#[derive(Debug, Clone)]
pub struct CandidatesIter(u128);

impl Iterator for CandidatesIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for CandidatesIter {}

impl BitAnd for Candidates {
    type Output = Candidates;
    fn bitand(self, rhs: Candidates) -> Candidates {
        Candidates(self.0 & rhs.0)
    }
}

impl BitAndAssign for Candidates {
    fn bitand_assign(&mut self, rhs: Candidates) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Candidates {
    type Output = Candidates;
    fn bitor(self, rhs: Candidates) -> Candidates {
        Candidates(self.0 | rhs.0)
    }
}

impl BitOrAssign for Candidates {
    fn bitor_assign(&mut self, rhs: Candidates) {
        self.0 |= rhs.0;
    }
}

/// Set difference
impl Sub for Candidates {
    type Output = Candidates;
    fn sub(self, rhs: Candidates) -> Candidates {
        Candidates(self.0 & !rhs.0)
    }
}

impl SubAssign for Candidates {
    fn sub_assign(&mut self, rhs: Candidates) {
        self.0 &= !rhs.0;
    }
}

impl fmt::Debug for Candidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
