//! Text shown on and around chart marks.

/// Label options for grouped bar charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataLabels {
    /// Digits after the decimal point in the printed label.
    pub decimals: usize,
    /// A value that rounds to zero at this many digits gets no label.
    pub round_number: i32,
    /// Values are fractions; print them as percentages.
    pub is_percentage: bool,
}

impl Default for DataLabels {
    fn default() -> Self {
        Self { decimals: 2, round_number: 2, is_percentage: false }
    }
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Shortest decimal form, always keeping at least one fractional digit
/// ("50.0", "12.34").
fn decimal_text(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Label for one segment of a stacked share bar: the share as a percentage
/// rounded to two digits, blank when the share is 0 at three digits.
pub fn share_label(share: f64) -> String {
    if round_to(share, 3) == 0.0 {
        String::new()
    } else {
        format!("{}%", decimal_text(round_to(share * 100.0, 2)))
    }
}

/// Label for one bar of a grouped chart.
pub fn data_label(value: f64, params: &DataLabels) -> String {
    if round_to(value, params.round_number) == 0.0 {
        return String::new();
    }
    if params.is_percentage {
        format!("{:.*}%", params.decimals, value * 100.0)
    } else {
        format!("{:.*}", params.decimals, value)
    }
}

/// Each value's share of the total as `"12.34%"`.
pub fn percent_labels(values: &[usize]) -> Vec<String> {
    let total: usize = values.iter().sum();
    values
        .iter()
        .map(|v| {
            let share = if total == 0 { 0.0 } else { *v as f64 * 100.0 / total as f64 };
            format!("{:.2}%", share)
        })
        .collect()
}

/// Plotly renders HTML in labels, so line breaks need `<br>`.
pub fn html_text(label: &str) -> String {
    label.replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_label_rounds_to_two_digits() {
        assert_eq!(share_label(0.1236), "12.36%");
        assert_eq!(share_label(0.5), "50.0%");
    }

    #[test]
    fn test_share_label_is_blank_for_negligible_share() {
        assert_eq!(share_label(0.0004), "");
        assert_eq!(share_label(0.0), "");
        assert_eq!(share_label(0.0006), "0.06%");
    }

    #[test]
    fn test_count_labels_without_decimals() {
        let params = DataLabels { decimals: 0, round_number: 0, ..Default::default() };
        assert_eq!(data_label(1523.0, &params), "1523");
        assert_eq!(data_label(0.2, &params), "", "rounds to zero");
    }

    #[test]
    fn test_percentage_labels_are_scaled() {
        let params = DataLabels { decimals: 2, round_number: 3, is_percentage: true };
        assert_eq!(data_label(0.01234, &params), "1.23%");
        assert_eq!(data_label(0.0004, &params), "");
    }

    #[test]
    fn test_percent_labels_sum_to_hundred() {
        assert_eq!(percent_labels(&[1, 1, 2]), vec!["25.00%", "25.00%", "50.00%"]);
        assert_eq!(percent_labels(&[0]), vec!["0.00%"]);
    }

    #[test]
    fn test_html_text_converts_newlines() {
        assert_eq!(html_text("Urban area\n (12)"), "Urban area<br> (12)");
    }
}
