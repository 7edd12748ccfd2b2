pub fn mean_ms(data: &[u32]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().map(|&v| f64::from(v)).sum::<f64>() / count as f64),
    }
}

/// Signed percentage change from `base` to `value`; `None` when `base` is zero
pub fn percent_change(base: f64, value: f64) -> Option<f64> {
    if base == 0.0 {
        None
    } else {
        Some((value - base) / base * 100.0)
    }
}

/// Ratio of `part` to `whole` as a percentage; `None` when `whole` is zero
pub fn percentage(part: u64, whole: u64) -> Option<f64> {
    match whole {
        0 => None,
        w => Some(part as f64 / w as f64 * 100.0),
    }
}

/// Accuracy with one decimal, or a dash when there were no trials
pub fn accuracy_text(accuracy: Option<f64>) -> String {
    match accuracy {
        Some(acc) => format!("{acc:.1}%"),
        None => "—".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_ms() {
        assert_eq!(mean_ms(&[100, 200, 300]), Some(200.0));
        assert!((mean_ms(&[100, 200, 301]).unwrap() - 200.333).abs() < 1e-3);
        assert_eq!(mean_ms(&[]), None);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(300.0, 450.0), Some(50.0));
        assert_eq!(percent_change(400.0, 300.0), Some(-25.0));
        assert_eq!(percent_change(0.0, 300.0), None);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(15, 20), Some(75.0));
        assert_eq!(percentage(0, 0), None);
    }

    #[test]
    fn test_accuracy_text() {
        assert_eq!(accuracy_text(Some(80.0)), "80.0%");
        assert_eq!(accuracy_text(Some(66.666)), "66.7%");
        assert_eq!(accuracy_text(None), "—");
    }
}
