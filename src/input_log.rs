use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One recorded hit attempt, stamped in track time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitAttempt {
    pub time_ms: i64,
    pub position: usize,
}

impl HitAttempt {
    pub fn new(time_ms: i64, position: usize) -> Self {
        Self { time_ms, position }
    }
}

/// Reads a `time_ms,position` CSV (with header) and returns attempts in time order.
pub fn read_attempts<R: Read>(reader: R) -> Result<Vec<HitAttempt>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);
    let mut attempts = rdr
        .deserialize::<HitAttempt>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    attempts.sort_by_key(|a| a.time_ms);
    Ok(attempts)
}

pub fn load_attempts<P: AsRef<Path>>(path: P) -> Result<Vec<HitAttempt>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_attempts(file)
}

/// Writes attempts in the format [`read_attempts`] accepts.
pub fn write_attempts<W: std::io::Write>(writer: W, attempts: &[HitAttempt]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for attempt in attempts {
        wtr.serialize(attempt)?;
    }
    wtr.flush()?;
    Ok(())
}
