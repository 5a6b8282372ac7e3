//! Human-readable byte counts using decimal (SI) units.

const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

/// Formats `bytes` like `"12.5 MB"`, with at most one decimal place.
pub fn format_byte_count(bytes: u64) -> String {
    match bytes {
        1 => return "1 byte".to_string(),
        0..=999 => return format!("{} bytes", bytes),
        _ => {}
    }

    let mut value = bytes as f64 / 1000.0;
    let mut unit = 0;
    // Round first so 999_950 bytes reads "1 MB" rather than "1000 KB"
    while round_tenths(value) >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    let text = format!("{:.1}", value);
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{} {}", text, UNITS[unit])
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_counts() {
        assert_eq!(format_byte_count(0), "0 bytes");
        assert_eq!(format_byte_count(1), "1 byte");
        assert_eq!(format_byte_count(999), "999 bytes");
    }

    #[test]
    fn test_decimal_units() {
        assert_eq!(format_byte_count(1_000), "1 KB");
        assert_eq!(format_byte_count(1_500), "1.5 KB");
        assert_eq!(format_byte_count(12_500_000), "12.5 MB");
        assert_eq!(format_byte_count(3_000_000_000), "3 GB");
    }

    #[test]
    fn test_rounding_promotes_unit() {
        assert_eq!(format_byte_count(999_950), "1 MB");
    }
}
