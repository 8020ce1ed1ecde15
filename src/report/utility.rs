use super::types::Average;

/// Computes the arithmetic mean of a slice of values. Returns [`Average::NoData`] for empty input.
pub fn mean(values: &[f64]) -> Average {
    if values.is_empty() {
        return Average::NoData;
    }
    Average::Numeric(values.iter().sum::<f64>() / values.len() as f64)
}
