pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

/// Mean and spread of signed hit offsets in ms (negative = early).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct OffsetStats {
    pub mean_ms: f64,
    pub std_dev_ms: f64,
}

pub fn offset_stats(offsets: &[i64]) -> Option<OffsetStats> {
    let data: Vec<f64> = offsets.iter().map(|&o| o as f64).collect();
    Some(OffsetStats {
        mean_ms: mean(&data)?,
        std_dev_ms: std_dev(&data)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[42.0]), Some(0.0));
        assert_eq!(std_dev(&[5.0, 5.0, 5.0]), Some(0.0));
        let result = std_dev(&[-10.0, -5.0, -15.0]).unwrap();
        assert!((result - 4.08248290463863).abs() < 1e-10);
    }

    #[test]
    fn offset_stats_of_early_and_late() {
        let stats = offset_stats(&[-20, 20, -20, 20]).unwrap();
        assert_eq!(stats.mean_ms, 0.0);
        assert_eq!(stats.std_dev_ms, 20.0);
        assert_eq!(offset_stats(&[]), None);
    }
}
