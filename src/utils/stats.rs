//! Statistical utility functions.

/// Arithmetic mean of a slice; NaN when empty.
pub fn mean(values: &[f64]) -> f64 {
    match values.len() {
        0 => f64::NAN,
        n => values.iter().sum::<f64>() / n as f64,
    }
}

/// Sample variance (n-1 denominator); NaN below two observations.
pub fn variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let center = mean(values);
    values.iter().map(|x| (x - center).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Sample standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}
