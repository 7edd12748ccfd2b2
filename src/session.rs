use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{SubTest, TestCategory};
use crate::error::{Error, Result};
use crate::factors::Factors;
use crate::util::{mean_ms, percentage};

/// One completed run of a mini-test.
///
/// Built once when a run ends and never mutated afterwards; the store only
/// hands out shared references. `avg_reaction_time` is a snapshot taken at
/// creation and is trusted as stored when loading history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    date: NaiveDate,
    #[serde(with = "minute_time")]
    time: NaiveTime,
    #[serde(rename = "testType")]
    category: TestCategory,
    #[serde(rename = "subTest")]
    sub_test: SubTest,
    score: u32,
    reaction_times: Vec<u32>,
    errors: u32,
    total_trials: u32,
    correct_responses: u32,
    avg_reaction_time: u32,
    #[serde(default)]
    factors: Factors,
}

impl SessionRecord {
    /// Stamp a finished run. Truncates `at` to minute precision and derives
    /// the category and average reaction time.
    pub fn new(
        candidate: SessionCandidate,
        sub_test: SubTest,
        factors: Factors,
        at: NaiveDateTime,
    ) -> Self {
        let avg_reaction_time = mean_ms(&candidate.reaction_times)
            .map(|m| m.round() as u32)
            .unwrap_or(0);
        let time = at
            .time()
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or_else(|| at.time());

        Self {
            date: at.date(),
            time,
            category: sub_test.category(),
            sub_test,
            score: candidate.score,
            reaction_times: candidate.reaction_times,
            errors: candidate.errors,
            total_trials: candidate.total_trials,
            correct_responses: candidate.correct_responses,
            avg_reaction_time,
            factors,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn category(&self) -> TestCategory {
        self.category
    }

    pub fn sub_test(&self) -> SubTest {
        self.sub_test
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn reaction_times(&self) -> &[u32] {
        &self.reaction_times
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn total_trials(&self) -> u32 {
        self.total_trials
    }

    pub fn correct_responses(&self) -> u32 {
        self.correct_responses
    }

    pub fn avg_reaction_time(&self) -> u32 {
        self.avg_reaction_time
    }

    pub fn factors(&self) -> &Factors {
        &self.factors
    }

    /// Correct responses as a percentage of trials, `None` for a run with no trials
    pub fn accuracy(&self) -> Option<f64> {
        percentage(
            u64::from(self.correct_responses),
            u64::from(self.total_trials),
        )
    }
}

/// Raw outcome counts handed over by a mini-game when its run ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCandidate {
    pub score: u32,
    pub reaction_times: Vec<u32>,
    pub errors: u32,
    pub total_trials: u32,
    pub correct_responses: u32,
}

impl SessionCandidate {
    /// Capture-boundary sanity checks for counts supplied from outside a [`TrialRun`]
    pub fn validate(&self) -> Result<()> {
        if self.total_trials == 0 {
            return Err(Error::InvalidSession(
                "a completed session needs at least one trial".into(),
            ));
        }
        if self.correct_responses > self.total_trials {
            return Err(Error::InvalidSession(format!(
                "{} correct responses exceed {} trials",
                self.correct_responses, self.total_trials
            )));
        }
        if self.reaction_times.len() > self.total_trials as usize {
            return Err(Error::InvalidSession(format!(
                "{} reaction times recorded for {} trials",
                self.reaction_times.len(),
                self.total_trials
            )));
        }
        Ok(())
    }
}

/// What happened on a single trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// Correct timed response
    Hit { reaction_ms: u32 },
    /// Correctly withheld a response (no-go stimulus)
    CorrectRejection,
    /// Incorrect answer given
    Wrong,
    /// Commission error: responded when no response was required
    FalseAlarm,
    /// Omission error: required response never came
    Miss,
}

/// In-progress test context, created when a test starts and consumed when it ends
#[derive(Debug, Clone)]
pub struct TrialRun {
    sub_test: SubTest,
    factors: Factors,
    started_at: NaiveDateTime,
    counts: SessionCandidate,
}

impl TrialRun {
    pub fn start(sub_test: SubTest, factors: Factors) -> Self {
        Self::start_at(sub_test, factors, Local::now().naive_local())
    }

    pub fn start_at(sub_test: SubTest, factors: Factors, started_at: NaiveDateTime) -> Self {
        debug!(%sub_test, ?factors, "trial run started");
        Self {
            sub_test,
            factors,
            started_at,
            counts: SessionCandidate::default(),
        }
    }

    pub fn sub_test(&self) -> SubTest {
        self.sub_test
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    pub fn trials(&self) -> u32 {
        self.counts.total_trials
    }

    pub fn record(&mut self, outcome: TrialOutcome) {
        let c = &mut self.counts;
        c.total_trials += 1;
        match outcome {
            TrialOutcome::Hit { reaction_ms } => {
                c.reaction_times.push(reaction_ms);
                c.correct_responses += 1;
                c.score += 1;
            }
            TrialOutcome::CorrectRejection => {
                c.correct_responses += 1;
                c.score += 1;
            }
            TrialOutcome::Wrong | TrialOutcome::FalseAlarm | TrialOutcome::Miss => {
                c.errors += 1;
            }
        }
        debug!(trial = c.total_trials, ?outcome, "trial recorded");
    }

    /// Current counts without ending the run
    pub fn counts(&self) -> &SessionCandidate {
        &self.counts
    }

    pub fn finish(self) -> SessionRecord {
        self.finish_at(Local::now().naive_local())
    }

    pub fn finish_at(self, at: NaiveDateTime) -> SessionRecord {
        debug!(
            sub_test = %self.sub_test,
            trials = self.counts.total_trials,
            elapsed_secs = (at - self.started_at).num_seconds(),
            "trial run finished"
        );
        SessionRecord::new(self.counts, self.sub_test, self.factors, at)
    }
}

mod minute_time {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;

    pub(crate) fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    /// Build a record with a single reaction time so that its average is `avg_rt`
    pub(crate) fn record(
        sub_test: SubTest,
        stress: Option<u8>,
        fatigue: Option<u8>,
        avg_rt: u32,
        correct: u32,
        total: u32,
        errors: u32,
    ) -> SessionRecord {
        let candidate = SessionCandidate {
            score: correct,
            reaction_times: if avg_rt > 0 { vec![avg_rt] } else { vec![] },
            errors,
            total_trials: total,
            correct_responses: correct,
        };
        let factors = Factors {
            stress,
            fatigue,
            age: None,
        };
        SessionRecord::new(candidate, sub_test, factors, at("2024-03-01", "09:30:00"))
    }

    #[test]
    fn derives_average_and_category() {
        let candidate = SessionCandidate {
            score: 3,
            reaction_times: vec![250, 300, 351],
            errors: 1,
            total_trials: 4,
            correct_responses: 3,
        };
        let rec = SessionRecord::new(
            candidate,
            SubTest::StroopReaction,
            Factors::none(),
            at("2024-03-01", "14:05:59"),
        );
        assert_eq!(rec.avg_reaction_time(), 300);
        assert_eq!(rec.category(), TestCategory::ReactionAttention);
        assert_eq!(rec.time().format("%H:%M:%S").to_string(), "14:05:00");
        assert_eq!(rec.accuracy(), Some(75.0));
    }

    #[test]
    fn empty_reaction_times_average_to_zero() {
        let rec = record(SubTest::SequenceMemory, None, None, 0, 2, 5, 3);
        assert!(rec.reaction_times().is_empty());
        assert_eq!(rec.avg_reaction_time(), 0);
    }

    #[test]
    fn serializes_in_browser_payload_shape() {
        let rec = record(SubTest::GoNoGo, Some(20), None, 300, 9, 10, 1);
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["date"], "2024-03-01");
        assert_eq!(value["time"], "09:30");
        assert_eq!(value["testType"], "Reaction & Attention");
        assert_eq!(value["subTest"], "Go/No-Go");
        assert_eq!(value["avgReactionTime"], 300);
        assert_eq!(value["correctResponses"], 9);
        assert_eq!(value["factors"]["stress"], 20);
        assert!(value["factors"]["fatigue"].is_null());
    }

    #[test]
    fn parses_browser_payload() {
        let json = r#"{
            "date": "2024-02-11", "time": "21:47",
            "testType": "Working Memory", "subTest": "N-Back",
            "score": 14, "reactionTimes": [612, 580], "errors": 6,
            "totalTrials": 20, "correctResponses": 14, "avgReactionTime": 596,
            "factors": {"stress": 65, "fatigue": 80, "age": null}
        }"#;
        let rec: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.sub_test(), SubTest::NBack);
        assert_eq!(rec.avg_reaction_time(), 596);
        assert_eq!(rec.factors().fatigue, Some(80));
        assert_eq!(rec.accuracy(), Some(70.0));
    }

    #[test]
    fn trial_run_accounts_every_outcome() {
        let mut run = TrialRun::start_at(
            SubTest::GoNoGo,
            Factors::none(),
            at("2024-03-01", "10:00:00"),
        );
        run.record(TrialOutcome::Hit { reaction_ms: 320 });
        run.record(TrialOutcome::CorrectRejection);
        run.record(TrialOutcome::FalseAlarm);
        run.record(TrialOutcome::Miss);
        run.record(TrialOutcome::Hit { reaction_ms: 280 });
        assert_eq!(run.trials(), 5);

        let rec = run.finish_at(at("2024-03-01", "10:01:30"));
        assert_eq!(rec.total_trials(), 5);
        assert_eq!(rec.correct_responses(), 3);
        assert_eq!(rec.score(), 3);
        assert_eq!(rec.errors(), 2);
        assert_eq!(rec.reaction_times(), &[320, 280]);
        assert_eq!(rec.avg_reaction_time(), 300);
        assert_eq!(rec.time().format("%H:%M").to_string(), "10:01");
    }

    #[test]
    fn candidate_validation() {
        let ok = SessionCandidate {
            score: 1,
            reaction_times: vec![200],
            errors: 0,
            total_trials: 1,
            correct_responses: 1,
        };
        assert!(ok.validate().is_ok());

        let no_trials = SessionCandidate::default();
        assert_matches!(no_trials.validate(), Err(Error::InvalidSession(_)));

        let too_many_correct = SessionCandidate {
            correct_responses: 3,
            total_trials: 2,
            ..ok.clone()
        };
        assert_matches!(too_many_correct.validate(), Err(Error::InvalidSession(_)));

        let too_many_rts = SessionCandidate {
            reaction_times: vec![1, 2, 3],
            total_trials: 2,
            ..ok
        };
        assert_matches!(too_many_rts.validate(), Err(Error::InvalidSession(_)));
    }
}
