//! The [`Element`] trait: values that can live in a stencil array.

use std::fmt::Debug;

/// A value type storable in a stencil array.
///
/// Arrays are shared between fork-join workers during plan execution and
/// store every cell as a 64-bit word, so an element must round-trip
/// losslessly through `u64`. `zero()` is the additive identity returned
/// by the zero-fill boundary policy.
pub trait Element: Copy + Send + Sync + PartialEq + Debug + 'static {
    /// The additive identity.
    fn zero() -> Self;

    /// Encode as a 64-bit word.
    fn to_bits(self) -> u64;

    /// Decode from a word produced by [`to_bits`](Element::to_bits).
    fn from_bits(bits: u64) -> Self;

    /// Absolute difference as `f64`, used when comparing two arrays.
    fn abs_diff(self, other: Self) -> f64;
}

impl Element for f64 {
    fn zero() -> Self {
        0.0
    }

    fn to_bits(self) -> u64 {
        f64::to_bits(self)
    }

    fn from_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }

    fn abs_diff(self, other: Self) -> f64 {
        (self - other).abs()
    }
}

impl Element for f32 {
    fn zero() -> Self {
        0.0
    }

    fn to_bits(self) -> u64 {
        f32::to_bits(self) as u64
    }

    fn from_bits(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }

    fn abs_diff(self, other: Self) -> f64 {
        (self as f64 - other as f64).abs()
    }
}

impl Element for i64 {
    fn zero() -> Self {
        0
    }

    fn to_bits(self) -> u64 {
        self as u64
    }

    fn from_bits(bits: u64) -> Self {
        bits as i64
    }

    fn abs_diff(self, other: Self) -> f64 {
        self.abs_diff(other) as f64
    }
}

impl Element for i32 {
    fn zero() -> Self {
        0
    }

    fn to_bits(self) -> u64 {
        self as u32 as u64
    }

    fn from_bits(bits: u64) -> Self {
        bits as u32 as i32
    }

    fn abs_diff(self, other: Self) -> f64 {
        self.abs_diff(other) as f64
    }
}
