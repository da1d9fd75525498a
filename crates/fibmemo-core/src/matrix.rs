//! Matrix Exponentiation algorithm for Fibonacci computation.
//!
//! Computes F(n) as the top-left entry of Q^(n-1), Q = [[1,1],[1,0]], by
//! iterative square-and-multiply over the bits of n-1.

use num_bigint::BigUint;

use crate::calculator::{CoreCalculator, FibError};
use crate::matrix_types::Matrix;
use crate::options::Options;
use crate::progress::CancellationToken;

/// Matrix Exponentiation calculator.
pub struct MatrixExponentiation;

impl MatrixExponentiation {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Q^e for e >= 1, scanning the bits of e below its most significant one.
    fn power(e: u64, cancel: &CancellationToken) -> Result<Matrix, FibError> {
        let num_bits = u64::BITS - e.leading_zeros();
        let mut result = Matrix::fibonacci_q();
        for i in (0..num_bits - 1).rev() {
            cancel.check_cancelled()?;
            result = result.square();
            if (e >> i) & 1 == 1 {
                result = result.mul_q();
            }
        }
        Ok(result)
    }
}

impl Default for MatrixExponentiation {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreCalculator for MatrixExponentiation {
    fn calculate_core(
        &self,
        n: u64,
        cancel: &CancellationToken,
        _opts: &Options,
    ) -> Result<BigUint, FibError> {
        if n <= 1 {
            return Ok(BigUint::from(n));
        }
        Ok(Self::power(n - 1, cancel)?.a)
    }

    fn name(&self) -> &'static str {
        "MatrixExponentiation"
    }
}
