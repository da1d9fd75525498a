//! Matrix types for the Matrix Exponentiation algorithm.

use num_bigint::BigUint;

/// Symmetric 2x2 matrix `[[a, b], [b, d]]` holding a power of Q = [[1,1],[1,0]].
///
/// For Q^k with k >= 1 the entries are `[[F(k+1), F(k)], [F(k), F(k-1)]]`,
/// so `a == b + d` always holds and is used to save multiplications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    pub a: BigUint,
    pub b: BigUint,
    pub d: BigUint,
}

impl Matrix {
    /// Create the Fibonacci Q matrix [[1,1],[1,0]].
    #[must_use]
    pub fn fibonacci_q() -> Self {
        Self {
            a: BigUint::from(1u32),
            b: BigUint::from(1u32),
            d: BigUint::ZERO,
        }
    }

    /// Q^2k from Q^k: three multiplications.
    #[must_use]
    pub fn square(&self) -> Self {
        let b = &self.b * (&self.a + &self.d);
        let d = &self.b * &self.b + &self.d * &self.d;
        Self { a: &b + &d, b, d }
    }

    /// Q^(k+1) from Q^k: additions only.
    #[must_use]
    pub fn mul_q(&self) -> Self {
        Self {
            a: &self.a + &self.b,
            b: self.a.clone(),
            d: self.b.clone(),
        }
    }
}
