use windsong::time_series::TimeSeriesPoint;

/// Compute X (seconds) and Y bounds for a results chart
pub fn compute_chart_params(points: &[TimeSeriesPoint]) -> (f64, f64) {
    let highest = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);

    let overall_duration = points.last().map_or(1.0, |p| p.t).max(1.0);

    (overall_duration, highest.round().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
