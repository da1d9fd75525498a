//! Optimized Fast Doubling algorithm for Fibonacci computation.
//!
//! Uses the doubling identities:
//!   F(2k)   = F(k) * (2*F(k+1) - F(k))
//!   F(2k+1) = F(k)^2 + F(k+1)^2
//!
//! Iterates over the bits of n from MSB to LSB. After consuming the top bits
//! of n, the state holds `(F(k), F(k+1))` where k is the value of those bits.

use num_bigint::BigUint;

use crate::calculator::{CoreCalculator, FibError};
use crate::options::Options;
use crate::progress::CancellationToken;

/// Loop state of the doubling recurrence for a fixed target index.
///
/// Exposed so the per-bit invariant can be observed step by step.
///
/// # Example
/// ```
/// use fibmemo_core::fastdoubling::DoublingState;
/// use fibmemo_core::options::Options;
///
/// let mut state = DoublingState::new(10); // 0b1010
/// let opts = Options::default();
/// let mut ks = Vec::new();
/// while state.step(&opts) {
///     ks.push(state.k());
/// }
/// assert_eq!(ks, vec![1, 2, 5, 10]);
/// assert_eq!(state.into_value().to_string(), "55");
/// ```
pub struct DoublingState {
    n: u64,
    remaining_bits: u32,
    k: u64,
    fk: BigUint,
    fk1: BigUint,
}

impl DoublingState {
    /// Start the recurrence for F(n) at k = 0: `(F(0), F(1)) = (0, 1)`.
    #[must_use]
    pub fn new(n: u64) -> Self {
        Self {
            n,
            remaining_bits: u64::BITS - n.leading_zeros(),
            k: 0,
            fk: BigUint::ZERO,
            fk1: BigUint::from(1u32),
        }
    }

    /// Index whose Fibonacci pair is currently held.
    #[must_use]
    pub fn k(&self) -> u64 {
        self.k
    }

    /// Current F(k).
    #[must_use]
    pub fn fk(&self) -> &BigUint {
        &self.fk
    }

    /// Current F(k+1).
    #[must_use]
    pub fn fk1(&self) -> &BigUint {
        &self.fk1
    }

    /// Number of bits of n not yet consumed.
    #[must_use]
    pub fn remaining_bits(&self) -> u32 {
        self.remaining_bits
    }

    /// Whether every bit of n has been consumed (then `k() == n`).
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.remaining_bits == 0
    }

    /// Consume the next bit of n. Returns `false` once all bits are consumed.
    #[allow(clippy::cast_possible_truncation)]
    pub fn step(&mut self, opts: &Options) -> bool {
        if self.remaining_bits == 0 {
            return false;
        }
        self.remaining_bits -= 1;

        // 2*F(k+1) >= F(k), so the subtraction never underflows.
        let t = (&self.fk1 << 1u32) - &self.fk;

        let max_bits = self.fk.bits().max(self.fk1.bits()) as usize;
        let (f2k, f2k1) = if max_bits >= opts.parallel_threshold {
            let (f2k, (fk_sq, fk1_sq)) = rayon::join(
                || &self.fk * &t,
                || rayon::join(|| &self.fk * &self.fk, || &self.fk1 * &self.fk1),
            );
            (f2k, fk_sq + fk1_sq)
        } else {
            (&self.fk * &t, &self.fk * &self.fk + &self.fk1 * &self.fk1)
        };

        if (self.n >> self.remaining_bits) & 1 == 0 {
            self.k *= 2;
            self.fk = f2k;
            self.fk1 = f2k1;
        } else {
            self.k = 2 * self.k + 1;
            self.fk1 = &f2k + &f2k1;
            self.fk = f2k1;
        }
        true
    }

    /// Take F(k) out of the state.
    #[must_use]
    pub fn into_value(self) -> BigUint {
        self.fk
    }
}

/// Optimized Fast Doubling calculator.
///
/// # Example
/// ```
/// use fibmemo_core::fastdoubling::OptimizedFastDoubling;
/// use fibmemo_core::calculator::CoreCalculator;
/// use fibmemo_core::options::Options;
/// use fibmemo_core::progress::CancellationToken;
///
/// let calc = OptimizedFastDoubling::new();
/// let cancel = CancellationToken::new();
/// let result = calc.calculate_core(100, &cancel, &Options::default()).unwrap();
/// assert_eq!(result.to_string(), "354224848179261915075");
/// ```
pub struct OptimizedFastDoubling;

impl OptimizedFastDoubling {
    /// Create a new `OptimizedFastDoubling` calculator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for OptimizedFastDoubling {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreCalculator for OptimizedFastDoubling {
    fn calculate_core(
        &self,
        n: u64,
        cancel: &CancellationToken,
        opts: &Options,
    ) -> Result<BigUint, FibError> {
        let mut state = DoublingState::new(n);
        while !state.is_done() {
            cancel.check_cancelled()?;
            state.step(opts);
        }
        Ok(state.into_value())
    }

    fn name(&self) -> &'static str {
        "FastDoubling"
    }
}
