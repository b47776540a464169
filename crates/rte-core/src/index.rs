//! Dual index spaces.
//!
//! The engine addresses text in two coordinate systems:
//!
//! - [`ContentIndex`]: counts only non-newline characters. Formatting runs
//!   and layout positions live in this space, because newlines never receive
//!   a glyph of their own.
//! - [`RawIndex`]: counts every character including `\n`. The backing text
//!   store operates in this space.
//!
//! The two drift apart by exactly the number of newlines before a position.
//! Keeping them as distinct newtypes makes it a type error to hand a raw
//! offset to a formatting operation or vice versa.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// An offset counting only non-newline characters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ContentIndex(pub usize);

impl ContentIndex {
    /// The start of the document.
    pub const ZERO: Self = Self(0);

    /// The underlying offset.
    pub fn get(self) -> usize {
        self.0
    }

    /// Subtract without underflow.
    pub fn saturating_sub(self, n: usize) -> Self {
        Self(self.0.saturating_sub(n))
    }
}

impl Add<usize> for ContentIndex {
    type Output = Self;

    fn add(self, rhs: usize) -> Self {
        Self(self.0 + rhs)
    }
}

impl AddAssign<usize> for ContentIndex {
    fn add_assign(&mut self, rhs: usize) {
        self.0 += rhs;
    }
}

impl fmt::Display for ContentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An offset counting every character, newlines included.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct RawIndex(pub usize);

impl RawIndex {
    /// The start of the document.
    pub const ZERO: Self = Self(0);

    /// The underlying offset.
    pub fn get(self) -> usize {
        self.0
    }

    /// Subtract without underflow.
    pub fn saturating_sub(self, n: usize) -> Self {
        Self(self.0.saturating_sub(n))
    }
}

impl Add<usize> for RawIndex {
    type Output = Self;

    fn add(self, rhs: usize) -> Self {
        Self(self.0 + rhs)
    }
}

impl AddAssign<usize> for RawIndex {
    fn add_assign(&mut self, rhs: usize) {
        self.0 += rhs;
    }
}

impl fmt::Display for RawIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved reference to one rendered character, as produced by hit
/// testing in the host and consumed by cursor/selection handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRef {
    /// Page the character is rendered on.
    pub page: usize,
    /// Position within the page's flattened render items.
    pub span_index: usize,
    /// Document-global content offset.
    pub char_index: ContentIndex,
    /// Document-global raw offset.
    pub raw_index: RawIndex,
}
