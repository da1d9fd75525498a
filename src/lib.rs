//! Shared fixtures for the workspace-level integration tests.

use num_bigint::BigUint;
use serde::Deserialize;

/// Contents of `tests/testdata/fibonacci_golden.json`.
#[derive(Debug, Deserialize)]
pub struct GoldenData {
    pub description: String,
    pub values: Vec<GoldenEntry>,
    pub range_sums: Vec<GoldenSum>,
}

/// Reference value of F(n): either exact, or digit count plus leading and trailing digits.
#[derive(Debug, Deserialize)]
pub struct GoldenEntry {
    pub n: u64,
    #[serde(default)]
    pub fib: Option<String>,
    #[serde(default)]
    pub fib_prefix: Option<String>,
    #[serde(default)]
    pub fib_suffix: Option<String>,
    #[serde(default)]
    pub fib_digits: Option<usize>,
}

impl GoldenEntry {
    /// Check `value` against every field present in the entry.
    pub fn check(&self, value: &BigUint) -> Result<(), String> {
        let digits = value.to_string();
        if let Some(exact) = &self.fib {
            if &digits != exact {
                return Err(format!("F({}) = {digits}, expected {exact}", self.n));
            }
        }
        if let Some(len) = self.fib_digits {
            if digits.len() != len {
                return Err(format!(
                    "F({}) has {} digits, expected {len}",
                    self.n,
                    digits.len()
                ));
            }
        }
        if let Some(prefix) = &self.fib_prefix {
            if !digits.starts_with(prefix.as_str()) {
                return Err(format!("F({}) does not start with {prefix}", self.n));
            }
        }
        if let Some(suffix) = &self.fib_suffix {
            if !digits.ends_with(suffix.as_str()) {
                return Err(format!("F({}) does not end with {suffix}", self.n));
            }
        }
        Ok(())
    }
}

/// Reference value of F(low) + ... + F(high).
#[derive(Debug, Deserialize)]
pub struct GoldenSum {
    pub low: u64,
    pub high: u64,
    pub sum: String,
}

impl GoldenSum {
    /// The expected sum as a big integer, `None` if the file is malformed.
    pub fn expected(&self) -> Option<BigUint> {
        BigUint::parse_bytes(self.sum.as_bytes(), 10)
    }
}

/// Load the golden file shipped with the workspace.
pub fn load_golden_data() -> Result<GoldenData, String> {
    let path = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/testdata/fibonacci_golden.json"
    );
    let data = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    serde_json::from_str(&data).map_err(|e| format!("{path}: {e}"))
}
