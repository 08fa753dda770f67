//! Degree type and utilities for forest nodes.
//!
//! # Why u8?
//!
//! The degree of a node in a Fibonacci-style forest is bounded by
//! `log_φ(n)` where `n` is the number of elements and φ ≈ 1.618. Even for
//! 2⁶⁴ elements that stays below 93, so `u8` has ample headroom and keeps the
//! node small.
//!
//! # Consolidation bound
//!
//! [`slot_count`] sizes the degree-indexed slot array used while
//! consolidating the root ring after an extraction.

/// Type alias for node degree.
pub type Rank = u8;

/// Maximum valid degree value.
pub const MAX_RANK: Rank = u8::MAX;

/// Safely increment a degree, panicking on overflow.
///
/// # Panics
///
/// Panics if `rank == MAX_RANK`, which would require more elements than fit
/// in memory.
///
/// # Example
///
/// ```rust
/// use fib_sssp::rank::{checked_increment, Rank};
///
/// let rank: Rank = 5;
/// assert_eq!(checked_increment(rank), 6);
/// ```
#[inline]
pub fn checked_increment(rank: Rank) -> Rank {
    rank.checked_add(1).expect(
        "rank overflow: this should be impossible since the degree of a node \
         is bounded by log_phi(n)",
    )
}

/// Decrement a degree, returning 0 if already at minimum.
///
/// # Example
///
/// ```rust
/// use fib_sssp::rank::{saturating_decrement, Rank};
///
/// let rank: Rank = 5;
/// assert_eq!(saturating_decrement(rank), 4);
///
/// let zero: Rank = 0;
/// assert_eq!(saturating_decrement(zero), 0);
/// ```
#[inline]
pub fn saturating_decrement(rank: Rank) -> Rank {
    rank.saturating_sub(1)
}

/// Number of degree slots needed to consolidate a forest of `len` elements.
///
/// A tree whose root has degree `k` holds at least `F(k+2)` nodes, so no
/// degree exceeds `log_φ(len) ≈ 1.44 · log₂(len)`. The result is
/// `⌊log₂ len⌋ · 1.5 + 2`, computed in integers.
///
/// ```rust
/// use fib_sssp::rank::slot_count;
///
/// assert_eq!(slot_count(0), 2);
/// assert_eq!(slot_count(1), 2);
/// assert_eq!(slot_count(8), 6);
/// ```
#[inline]
pub fn slot_count(len: usize) -> usize {
    let log2 = if len == 0 { 0 } else { len.ilog2() as usize };
    log2 + log2 / 2 + 2
}
