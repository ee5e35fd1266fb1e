/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Parses a boardings count that may carry thousands separators ("1,234").
/// Returns `None` for empty, non-numeric, or non-finite values.
pub fn parse_count(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_values() {
        assert_eq!(mean(&[100.0, 200.0, 300.0]), 200.0);
    }

    #[test]
    fn test_parse_count_plain() {
        assert_eq!(parse_count("120"), Some(120.0));
        assert_eq!(parse_count(" 3.5 "), Some(3.5));
    }

    #[test]
    fn test_parse_count_thousands_separator() {
        assert_eq!(parse_count("1,234"), Some(1234.0));
        assert_eq!(parse_count("12,345,678"), Some(12345678.0));
    }

    #[test]
    fn test_parse_count_rejects_garbage() {
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("n/a"), None);
        assert_eq!(parse_count("NaN"), None);
    }
}
