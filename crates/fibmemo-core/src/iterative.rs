//! Linear iterative Fibonacci: the native fast path and a big-integer reference.

use num_bigint::BigUint;

use crate::constants::MAX_FIB_U64;

/// F(n) in native 64-bit arithmetic, or `None` when F(n) does not fit (n > 93).
#[must_use]
pub fn fib_u64(n: u64) -> Option<u64> {
    if n > MAX_FIB_U64 {
        return None;
    }
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        // b runs one index ahead; for n = 93 it wraps past F(93) and is discarded.
        let next = a.wrapping_add(b);
        a = b;
        b = next;
    }
    Some(a)
}

/// F(n) by `n` big-integer additions.
///
/// O(n) additions: only meant as a reference for checking the doubling engine.
#[must_use]
pub fn fib_iterative(n: u64) -> BigUint {
    let mut a = BigUint::ZERO;
    let mut b = BigUint::from(1u32);
    for _ in 0..n {
        let next = &a + &b;
        a = std::mem::replace(&mut b, next);
    }
    a
}
