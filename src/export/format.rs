//! Human-facing number formatting for the dashboard.

/// Round to an integer and group thousands with commas (`1234567.8` -> `"1,234,568"`).
///
/// Halves round away from zero.
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Fixed number of fractional digits (`25.0` with 1 -> `"25.0"`).
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Shortest round-tripping form, switching to exponent notation from 1e21 up
/// and for non-zero magnitudes below 1e-6.
pub fn format_plain(value: f64) -> String {
    let magnitude = value.abs();
    if value.is_finite() && (magnitude >= 1e21 || (magnitude > 0.0 && magnitude < 1e-6)) {
        let formatted = format!("{:e}", value);
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        }
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0.0), "0");
        assert_eq!(format_grouped(999.4), "999");
        assert_eq!(format_grouped(999.5), "1,000");
        assert_eq!(format_grouped(1_234_567.8), "1,234,568");
        assert_eq!(format_grouped(100_000.0), "100,000");
        assert_eq!(format_grouped(-4_321.0), "-4,321");
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(75.0, 1), "75.0");
        assert_eq!(format_fixed(33.333333, 1), "33.3");
        assert_eq!(format_fixed(0.5, 2), "0.50");
        assert_eq!(format_fixed(12.345678, 2), "12.35");
    }

    #[test]
    fn test_format_plain() {
        assert_eq!(format_plain(10_350_000_000.0), "10350000000");
        assert_eq!(format_plain(0.25), "0.25");
        assert_eq!(format_plain(1.2e58), "1.2e+58");
        assert_eq!(format_plain(0.0), "0");
    }

    #[test]
    fn test_format_plain_dust_uses_exponent() {
        assert_eq!(format_plain(1.035e-8), "1.035e-8");
        assert_eq!(format_plain(1e-7), "1e-7");
        assert_eq!(format_plain(-2.5e-9), "-2.5e-9");
        assert_eq!(format_plain(0.000001), "0.000001");
        assert_eq!(format_plain(0.00000123), "0.00000123");
    }
}
