//! CLI output formatting.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use num_bigint::BigUint;

/// Significant digits shown by `format_sci` by default.
pub const SCI_DIGITS: usize = 5;

/// Format a `BigUint` for display, abbreviating values over 100 digits unless `verbose`.
#[must_use]
pub fn format_result(value: &BigUint, verbose: bool) -> String {
    let s = value.to_string();
    if !verbose && s.len() > 100 {
        format!("{}...{} ({} digits)", &s[..50], &s[s.len() - 50..], s.len())
    } else {
        s
    }
}

/// Format a `BigUint` in scientific notation with at most `digits` significant digits.
///
/// The mantissa is truncated, not rounded, and trailing zeros are dropped.
///
/// ```
/// use num_bigint::BigUint;
/// use fibmemo_cli::output::format_sci;
///
/// assert_eq!(format_sci(&BigUint::from(354_224_848_179_261_915_075u128), 5), "3.5422e20");
/// assert_eq!(format_sci(&BigUint::from(55u32), 5), "5.5e1");
/// assert_eq!(format_sci(&BigUint::from(0u32), 5), "0");
/// ```
#[must_use]
pub fn format_sci(value: &BigUint, digits: usize) -> String {
    let s = value.to_string();
    if s == "0" {
        return s;
    }
    let exponent = s.len() - 1;
    let significant = &s[..s.len().min(digits.max(1))];
    let (lead, rest) = significant.split_at(1);
    let rest = rest.trim_end_matches('0');
    if rest.is_empty() {
        format!("{lead}e{exponent}")
    } else {
        format!("{lead}.{rest}e{exponent}")
    }
}

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 0.001 {
        format!("{:.2}µs", secs * 1_000_000.0)
    } else if secs < 1.0 {
        format!("{:.2}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.3}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.1}s")
    }
}

/// Format a number with thousand separators.
#[must_use]
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Write a value to a file, followed by a newline.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_to_file(path: &Path, value: &BigUint) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "{value}")?;
    file.flush()
}
