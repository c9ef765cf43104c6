//! Timestamp formatting and parsing for subtitle timing lines.
//!
//! WebVTT renders timestamps as `HH:MM:SS.mmm`. Hand-edited and
//! SRT-flavored files also show up with `MM:SS` shapes and comma decimal
//! separators, so parsing accepts all of those while formatting stays strict.

/// Format seconds into a `HH:MM:SS.mmm` timestamp.
///
/// Rounding policy:
/// - We round to the nearest millisecond so formatted output and re-parsed
///   values agree to within 0.001s.
/// - Negative (and non-finite) input clamps to zero.
///
/// Hours are not capped at two digits; a 100-hour recording renders as
/// `100:00:00.000`.
pub fn format_timestamp(seconds: f64) -> String {
    let clamped = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let total_ms = (clamped * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Parse a subtitle timestamp into seconds, tolerating the format's laxity.
///
/// Accepted shapes: `HH:MM:SS(.|,)mmm`, `MM:SS(.|,)mmm`, or a bare number.
/// Anything unparseable yields `0.0` for the whole input; a bad timestamp
/// must not abort a document. Callers that need strictness should use
/// [`try_parse_timestamp`].
pub fn parse_timestamp(text: &str) -> f64 {
    try_parse_timestamp(text).unwrap_or(0.0)
}

/// The fallible core of [`parse_timestamp`].
///
/// Returns `None` when any colon-separated component fails to parse as a
/// number, or when the shape is not 1, 2, or 3 components.
pub fn try_parse_timestamp(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");

    let mut parts = Vec::new();
    for component in normalized.split(':') {
        parts.push(component.parse::<f64>().ok()?);
    }

    match parts.as_slice() {
        [h, m, s] => Some(h * 3600.0 + m * 60.0 + s),
        [m, s] => Some(m * 60.0 + s),
        [s] => Some(*s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_renders_fixed_width_fields() {
        assert_eq!(format_timestamp(0.0), "00:00:00.000");
        assert_eq!(format_timestamp(0.5), "00:00:00.500");
        assert_eq!(format_timestamp(59.999), "00:00:59.999");
        assert_eq!(format_timestamp(3661.5), "01:01:01.500");
    }

    #[test]
    fn format_rounds_to_nearest_millisecond() {
        assert_eq!(format_timestamp(0.0004), "00:00:00.000");
        assert_eq!(format_timestamp(0.0006), "00:00:00.001");
        assert_eq!(format_timestamp(59.9996), "00:01:00.000");
    }

    #[test]
    fn format_clamps_negative_and_non_finite_input() {
        assert_eq!(format_timestamp(-12.5), "00:00:00.000");
        assert_eq!(format_timestamp(f64::NAN), "00:00:00.000");
    }

    #[test]
    fn format_does_not_cap_hours_at_two_digits() {
        assert_eq!(format_timestamp(359_999.999), "99:59:59.999");
        assert_eq!(format_timestamp(360_000.0), "100:00:00.000");
        assert_eq!(format_timestamp(360_000.001), "100:00:00.001");
    }

    #[test]
    fn parse_accepts_three_part_two_part_and_bare_shapes() {
        assert!((parse_timestamp("00:01:23.456") - 83.456).abs() < 1e-9);
        assert!((parse_timestamp("01:23.456") - 83.456).abs() < 1e-9);
        assert!((parse_timestamp("12.5") - 12.5).abs() < 1e-9);
        assert!((parse_timestamp("5") - 5.0).abs() < 1e-9);
    }

    #[test]
    fn parse_accepts_comma_decimal_separator() {
        assert!((parse_timestamp("00:00:05,250") - 5.25).abs() < 1e-9);
        assert!((parse_timestamp("02:03,500") - 123.5).abs() < 1e-9);
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        assert!((parse_timestamp("  00:10.000\t") - 10.0).abs() < 1e-9);
    }

    #[test]
    fn parse_yields_zero_for_garbage() {
        assert_eq!(parse_timestamp(""), 0.0);
        assert_eq!(parse_timestamp("aa:bb:cc"), 0.0);
        assert_eq!(parse_timestamp("1:2:3:4"), 0.0);
        assert_eq!(parse_timestamp("--:--"), 0.0);
    }

    #[test]
    fn try_parse_surfaces_failures_instead_of_zero() {
        assert!(try_parse_timestamp("not a time").is_none());
        assert_eq!(try_parse_timestamp("00:00:01.000"), Some(1.0));
    }

    #[test]
    fn round_trips_to_millisecond_precision() {
        let values = [
            0.0,
            0.001,
            1.0,
            59.999,
            61.37,
            3_599.5,
            3_661.001,
            7_200.25,
            86_399.999,
            360_000.123,
        ];
        for x in values {
            let restored = parse_timestamp(&format_timestamp(x));
            assert!(
                (restored - x).abs() <= 0.001,
                "round trip drifted for {x}: got {restored}"
            );
        }
    }
}
