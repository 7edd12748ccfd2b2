use crate::session::SessionRecord;
use crate::util::percentage;

/// Summary statistics over a set of sessions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionStats {
    pub count: usize,
    /// Mean of the per-session average reaction times (not a pooled mean of raw times)
    pub avg_rt: f64,
    pub total_errors: u64,
    pub correct_responses: u64,
    pub total_trials: u64,
    /// `None` when the set contains no trials at all
    pub accuracy: Option<f64>,
    /// Fastest and slowest per-session averages, ignoring untimed sessions
    pub fastest_rt: Option<u32>,
    pub slowest_rt: Option<u32>,
}

impl SessionStats {
    pub const EMPTY: SessionStats = SessionStats {
        count: 0,
        avg_rt: 0.0,
        total_errors: 0,
        correct_responses: 0,
        total_trials: 0,
        accuracy: None,
        fastest_rt: None,
        slowest_rt: None,
    };

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn rounded_avg_rt(&self) -> u32 {
        self.avg_rt.round() as u32
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Aggregate any subset of sessions. An empty input yields [`SessionStats::EMPTY`].
pub fn compute_stats<'a, I>(sessions: I) -> SessionStats
where
    I: IntoIterator<Item = &'a SessionRecord>,
{
    let mut stats = SessionStats::EMPTY;
    let mut rt_sum = 0.0;

    for s in sessions {
        stats.count += 1;
        rt_sum += f64::from(s.avg_reaction_time());
        stats.total_errors += u64::from(s.errors());
        stats.correct_responses += u64::from(s.correct_responses());
        stats.total_trials += u64::from(s.total_trials());

        let rt = s.avg_reaction_time();
        if rt > 0 {
            stats.fastest_rt = Some(stats.fastest_rt.map_or(rt, |f| f.min(rt)));
            stats.slowest_rt = Some(stats.slowest_rt.map_or(rt, |f| f.max(rt)));
        }
    }

    if stats.count > 0 {
        stats.avg_rt = rt_sum / stats.count as f64;
    }
    stats.accuracy = percentage(stats.correct_responses, stats.total_trials);
    stats
}
