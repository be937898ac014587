// Small descriptive-statistics helpers shared by the screening kernels.

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (n - 1 denominator); `None` for fewer than two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss = values.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    Some(ss / (values.len() - 1) as f64)
}

/// `values[i] - values[i - lag]` over every valid index.
pub fn lagged_differences(values: &[f64], lag: usize) -> Vec<f64> {
    if lag == 0 || values.len() <= lag {
        return Vec::new();
    }
    values
        .iter()
        .skip(lag)
        .zip(values.iter())
        .map(|(cur, prev)| cur - prev)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_variance() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), Some(5.0));
        let var = sample_variance(&v).unwrap();
        assert!((var - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_lengths() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_variance(&[1.0]), None);
        assert!(lagged_differences(&[1.0, 2.0], 2).is_empty());
        assert!(lagged_differences(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn lagged_differences_by_lag() {
        let v = [1.0, 3.0, 6.0, 10.0];
        assert_eq!(lagged_differences(&v, 1), vec![2.0, 3.0, 4.0]);
        assert_eq!(lagged_differences(&v, 2), vec![5.0, 7.0]);
    }
}
