use std::fs;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::session::SessionRecord;

#[derive(Debug, Serialize)]
struct CsvRow {
    date: String,
    time: String,
    category: String,
    sub_test: String,
    score: u32,
    total_trials: u32,
    correct_responses: u32,
    errors: u32,
    accuracy: Option<String>,
    avg_reaction_time: u32,
    reaction_times: String,
    stress: Option<u8>,
    fatigue: Option<u8>,
    age: Option<u32>,
}

impl From<&SessionRecord> for CsvRow {
    fn from(s: &SessionRecord) -> Self {
        let factors = s.factors();
        Self {
            date: s.date().to_string(),
            time: s.time().format("%H:%M").to_string(),
            category: s.category().to_string(),
            sub_test: s.sub_test().to_string(),
            score: s.score(),
            total_trials: s.total_trials(),
            correct_responses: s.correct_responses(),
            errors: s.errors(),
            accuracy: s.accuracy().map(|a| format!("{a:.1}")),
            avg_reaction_time: s.avg_reaction_time(),
            reaction_times: s.reaction_times().iter().join(";"),
            stress: factors.stress,
            fatigue: factors.fatigue,
            age: factors.age,
        }
    }
}

/// One row per session under a header taken from the first row, so an empty
/// history writes nothing. Reaction times are `;`-joined.
pub fn write_csv<W: Write>(writer: W, sessions: &[SessionRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for session in sessions {
        wtr.serialize(CsvRow::from(session))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export to `path`, creating parent directories; returns the number of rows written
pub fn export_csv<P: AsRef<Path>>(path: P, sessions: &[SessionRecord]) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    write_csv(file, sessions)?;
    info!(path = %path.display(), rows = sessions.len(), "exported sessions");
    Ok(sessions.len())
}
