use serde::Serialize;

/// One sample of a value over track time, used for the results chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    /// Track time in seconds.
    pub t: f64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, value: f64) -> Self {
        Self { t, value }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.value)
    }
}

/// Fixed-interval sampler; records at most one point per `interval_ms` of track time.
#[derive(Debug, Clone)]
pub struct Sampler {
    interval_ms: i64,
    next_ms: Option<i64>,
    points: Vec<TimeSeriesPoint>,
}

impl Sampler {
    pub fn new(interval_ms: i64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            next_ms: None,
            points: Vec::new(),
        }
    }

    pub fn record(&mut self, track_ms: i64, value: f64) {
        if track_ms < 0 {
            return;
        }
        match self.next_ms {
            Some(next) if track_ms < next => {}
            _ => {
                self.points
                    .push(TimeSeriesPoint::new(track_ms as f64 / 1000.0, value));
                self.next_ms = Some(track_ms + self.interval_ms);
            }
        }
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }
}
