//! Memory size parsing
//!
//! Sizes are given as `<decimal><unit>` where the unit is `g` (gigabytes)
//! or `m` (megabytes), e.g. `4g`, `0.5g`, `512m`. Parsed sizes are always
//! megabytes.

use crate::error::{DeploymentError, Result};

pub const MB_PER_GB: u32 = 1024;

/// Parse a human memory size into megabytes
///
/// An empty input returns zero. Fractional values are rounded to the
/// nearest megabyte.
pub fn parse(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let invalid = |reason: &str| DeploymentError::InvalidSize {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let unit_len = trimmed.chars().last().map_or(0, char::len_utf8);
    let (body, unit) = trimmed.split_at(trimmed.len() - unit_len);
    let multiplier = match unit {
        "g" | "G" => f64::from(MB_PER_GB),
        "m" | "M" => 1.0,
        _ => return Err(invalid("unit must be g (gigabytes) or m (megabytes)")),
    };

    if body.starts_with('-') {
        return Err(invalid("size cannot be negative"));
    }
    let well_formed = body.chars().any(|c| c.is_ascii_digit())
        && body.chars().all(|c| c.is_ascii_digit() || c == '.')
        && body.matches('.').count() <= 1;
    if !well_formed {
        return Err(invalid("expected a decimal number followed by a unit"));
    }

    let value: f64 = body
        .parse()
        .map_err(|_| invalid("expected a decimal number followed by a unit"))?;
    let megabytes = (value * multiplier).round();
    if megabytes > f64::from(u32::MAX) {
        return Err(invalid("size is too large"));
    }

    Ok(megabytes as u32)
}

/// Format megabytes using the largest unit that represents them exactly
pub fn format(megabytes: u32) -> String {
    if megabytes % MB_PER_GB == 0 {
        format!("{}g", megabytes / MB_PER_GB)
    } else {
        format!("{}m", megabytes)
    }
}
