use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::session::SessionRecord;
use crate::util::{mean_ms, percent_change};

/// Attention-dip detection needs more reaction times than this
pub const ATTENTION_MIN_REACTIONS: usize = 6;
/// Middle-third slowdown (percent) above which an attention dip is reported
pub const ATTENTION_DIP_PERCENT: f64 = 15.0;
/// Stress or fatigue above this level counts as high
pub const HIGH_FACTOR_LEVEL: u8 = 70;
/// Accuracy (percent) separating factor impact from resilience
pub const RESILIENCE_ACCURACY: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Attention,
    Factors,
    Learning,
    Performance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyBand {
    Excellent,
    Good,
    RoomForImprovement,
}

impl AccuracyBand {
    /// Band for an accuracy percentage; nothing below 60%
    pub fn from_accuracy(accuracy: f64) -> Option<Self> {
        if accuracy >= 90.0 {
            Some(AccuracyBand::Excellent)
        } else if accuracy >= 75.0 {
            Some(AccuracyBand::Good)
        } else if accuracy >= 60.0 {
            Some(AccuracyBand::RoomForImprovement)
        } else {
            None
        }
    }
}

/// Which recorded factors were above [`HIGH_FACTOR_LEVEL`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighFactors {
    pub stress: bool,
    pub fatigue: bool,
}

impl fmt::Display for HighFactors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.stress, self.fatigue) {
            (true, true) => write!(f, "high stress and high fatigue"),
            (true, false) => write!(f, "high stress"),
            (false, true) => write!(f, "high fatigue"),
            (false, false) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Insight {
    AttentionDip { slowdown_percent: f64 },
    FactorImpact(HighFactors),
    Resilience(HighFactors),
    Improvement { points: u32 },
    PerformanceVaries,
    Accuracy(AccuracyBand),
}

impl Insight {
    pub fn kind(&self) -> InsightKind {
        match self {
            Insight::AttentionDip { .. } => InsightKind::Attention,
            Insight::FactorImpact(_) | Insight::Resilience(_) => InsightKind::Factors,
            Insight::Improvement { .. } | Insight::PerformanceVaries => InsightKind::Learning,
            Insight::Accuracy(_) => InsightKind::Performance,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Insight::AttentionDip { slowdown_percent } => format!(
                "Attention dip detected: your reaction time slowed by {}% in the middle of the test. Try maintaining focus throughout.",
                slowdown_percent.round()
            ),
            Insight::FactorImpact(factors) => format!(
                "Factor impact: your {factors} may have affected your performance. Consider retesting when more relaxed and rested."
            ),
            Insight::Resilience(factors) => format!(
                "Resilience: despite {factors}, you maintained good performance."
            ),
            Insight::Improvement { points } => format!(
                "Learning effect: you improved by {points} point(s) compared to your last session. Keep practicing."
            ),
            Insight::PerformanceVaries => {
                "Performance variation: your score decreased slightly. Performance varies between sessions; try again when fresh.".to_string()
            }
            Insight::Accuracy(AccuracyBand::Excellent) => {
                "Excellent accuracy! You're performing at a high level. Consider trying a more challenging test.".to_string()
            }
            Insight::Accuracy(AccuracyBand::Good) => {
                "Good performance! Your accuracy is solid. Keep practicing to improve further.".to_string()
            }
            Insight::Accuracy(AccuracyBand::RoomForImprovement) => {
                "Room for improvement. Try taking the test again when you're more focused.".to_string()
            }
        }
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Percent slowdown of the middle third of `reaction_times` against the first third.
///
/// Thirds use floor division on both boundaries, so trailing remainder entries
/// belong to neither. `None` with too few reactions or a zero first-third mean.
pub fn attention_slowdown(reaction_times: &[u32]) -> Option<f64> {
    let n = reaction_times.len();
    if n <= ATTENTION_MIN_REACTIONS {
        return None;
    }
    let first = mean_ms(&reaction_times[..n / 3])?;
    let middle = mean_ms(&reaction_times[n / 3..2 * n / 3])?;
    percent_change(first, middle)
}

/// Insights for a just-completed session, in attention, factors, learning,
/// performance order.
///
/// `previous` holds the sessions stored before `session`, in insertion order,
/// and must not include `session` itself. For a history whose last entry is
/// the session in question use [`generate_insights_for_latest`].
pub fn generate_insights(session: &SessionRecord, previous: &[SessionRecord]) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(slowdown) = attention_slowdown(session.reaction_times()) {
        if slowdown > ATTENTION_DIP_PERCENT {
            insights.push(Insight::AttentionDip {
                slowdown_percent: slowdown,
            });
        }
    }

    insights.extend(factor_insight(session));
    insights.extend(learning_insight(session, previous));

    if let Some(band) = session.accuracy().and_then(AccuracyBand::from_accuracy) {
        insights.push(Insight::Accuracy(band));
    }

    debug!(
        sub_test = %session.sub_test(),
        insights = insights.len(),
        "generated session insights"
    );
    insights
}

/// Insights for the newest entry of a stored history
pub fn generate_insights_for_latest(history: &[SessionRecord]) -> Vec<Insight> {
    match history.split_last() {
        Some((latest, previous)) => generate_insights(latest, previous),
        None => Vec::new(),
    }
}

fn factor_insight(session: &SessionRecord) -> Option<Insight> {
    let factors = session.factors();
    if factors.stress.is_none() && factors.fatigue.is_none() {
        return None;
    }
    let high = HighFactors {
        stress: factors.stress.is_some_and(|s| s > HIGH_FACTOR_LEVEL),
        fatigue: factors.fatigue.is_some_and(|f| f > HIGH_FACTOR_LEVEL),
    };
    if !high.stress && !high.fatigue {
        return None;
    }
    let accuracy = session.accuracy()?;
    if accuracy < RESILIENCE_ACCURACY {
        Some(Insight::FactorImpact(high))
    } else {
        Some(Insight::Resilience(high))
    }
}

fn learning_insight(session: &SessionRecord, previous: &[SessionRecord]) -> Option<Insight> {
    let last_score = previous
        .iter()
        .rev()
        .find(|s| s.sub_test() == session.sub_test())?
        .score();
    let current = session.score();
    let previous = last_score;

    if current > previous {
        Some(Insight::Improvement {
            points: current - previous,
        })
    } else if current < previous && current > 0 {
        Some(Insight::PerformanceVaries)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SubTest;
    use crate::factors::Factors;
    use crate::session::tests::{at, record};
    use crate::session::SessionCandidate;

    fn with_times(reaction_times: Vec<u32>) -> SessionRecord {
        let total = reaction_times.len() as u32;
        SessionRecord::new(
            SessionCandidate {
                score: total,
                reaction_times,
                errors: 0,
                total_trials: total,
                correct_responses: total,
            },
            SubTest::SimpleReaction,
            Factors::none(),
            at("2024-03-01", "12:00:00"),
        )
    }

    fn kinds(insights: &[Insight]) -> Vec<InsightKind> {
        insights.iter().map(Insight::kind).collect()
    }

    #[test]
    fn attention_dip_uses_floor_thirds() {
        let times = [100, 100, 100, 500, 500, 500, 100, 100];
        let slowdown = attention_slowdown(&times).unwrap();
        // first = [100, 100], middle = [100, 500, 500]
        assert!((slowdown - 800.0 / 3.0).abs() < 1e-9);

        let session = with_times(times.to_vec());
        let insights = generate_insights(&session, &[]);
        assert_eq!(insights[0].kind(), InsightKind::Attention);
        assert!(insights[0].message().contains("slowed by 267%"));
    }

    #[test]
    fn attention_needs_more_than_six_reactions() {
        assert_eq!(attention_slowdown(&[100, 100, 500, 500, 500, 500]), None);
        assert!(attention_slowdown(&[100, 100, 500, 500, 500, 500, 500]).is_some());
    }

    #[test]
    fn steady_reactions_have_no_dip() {
        let session = with_times(vec![300, 310, 320, 330, 340, 350, 360, 370, 380]);
        let slowdown = attention_slowdown(session.reaction_times()).unwrap();
        assert!(slowdown < ATTENTION_DIP_PERCENT);
        assert!(!kinds(&generate_insights(&session, &[])).contains(&InsightKind::Attention));
    }

    #[test]
    fn high_factors_with_low_accuracy_is_impact() {
        let session = record(SubTest::GoNoGo, Some(80), Some(20), 350, 6, 10, 4);
        let insights = generate_insights(&session, &[]);
        assert_eq!(
            insights,
            vec![
                Insight::FactorImpact(HighFactors {
                    stress: true,
                    fatigue: false
                }),
                Insight::Accuracy(AccuracyBand::RoomForImprovement),
            ]
        );
        assert!(insights[0].message().contains("your high stress may have"));
    }

    #[test]
    fn high_factors_with_good_accuracy_is_resilience() {
        let session = record(SubTest::GoNoGo, Some(90), Some(95), 350, 8, 10, 2);
        let insights = generate_insights(&session, &[]);
        assert_eq!(
            insights[0],
            Insight::Resilience(HighFactors {
                stress: true,
                fatigue: true
            })
        );
        assert!(insights[0]
            .message()
            .contains("despite high stress and high fatigue"));
    }

    #[test]
    fn moderate_factors_produce_no_factor_insight() {
        let session = record(SubTest::GoNoGo, Some(70), Some(70), 350, 5, 10, 5);
        assert!(generate_insights(&session, &[]).is_empty());
    }

    #[test]
    fn learning_effect_against_previous_same_test() {
        let first = record(SubTest::NBack, None, None, 600, 5, 10, 5);
        let other = record(SubTest::GoNoGo, None, None, 300, 9, 10, 1);
        let current = record(SubTest::NBack, None, None, 550, 8, 10, 2);
        let mut history = vec![first, other];

        let insights = generate_insights(&current, &history);
        assert!(insights.contains(&Insight::Improvement { points: 3 }));

        // once stored, the latest entry is compared against what came before it
        history.push(current);
        let insights = generate_insights_for_latest(&history);
        assert!(insights.contains(&Insight::Improvement { points: 3 }));
    }

    #[test]
    fn learning_needs_a_previous_session() {
        let current = record(SubTest::NBack, None, None, 550, 8, 10, 2);
        let insights = generate_insights(&current, &[]);
        assert!(!kinds(&insights).contains(&InsightKind::Learning));

        let insights = generate_insights_for_latest(std::slice::from_ref(&current));
        assert!(!kinds(&insights).contains(&InsightKind::Learning));
        assert!(generate_insights_for_latest(&[]).is_empty());
    }

    #[test]
    fn repeated_identical_session_compares_with_latest_stored() {
        let n_back = |score: u32, time: &str| {
            SessionRecord::new(
                SessionCandidate {
                    score,
                    reaction_times: vec![500],
                    errors: 10 - score,
                    total_trials: 10,
                    correct_responses: score,
                },
                SubTest::NBack,
                Factors::none(),
                at("2024-03-01", time),
            )
        };
        let latest = n_back(8, "10:05:00");
        let history = vec![n_back(5, "10:00:00"), latest.clone()];

        // a new run identical to the stored 10:05 one scores the same
        let insights = generate_insights(&latest, &history);
        assert!(!kinds(&insights).contains(&InsightKind::Learning));
        assert!(!insights.contains(&Insight::Improvement { points: 3 }));
    }

    #[test]
    fn lower_or_equal_scores() {
        let previous = record(SubTest::NBack, None, None, 500, 8, 10, 2);

        let lower = record(SubTest::NBack, None, None, 520, 6, 10, 4);
        assert!(generate_insights(&lower, &[previous.clone()])
            .contains(&Insight::PerformanceVaries));

        let equal = record(SubTest::NBack, None, None, 480, 8, 10, 2);
        assert!(!kinds(&generate_insights(&equal, &[previous.clone()]))
            .contains(&InsightKind::Learning));

        let zero = record(SubTest::NBack, None, None, 0, 0, 10, 10);
        assert!(generate_insights(&zero, &[previous]).is_empty());
    }

    #[test]
    fn accuracy_bands() {
        assert_eq!(AccuracyBand::from_accuracy(90.0), Some(AccuracyBand::Excellent));
        assert_eq!(AccuracyBand::from_accuracy(89.9), Some(AccuracyBand::Good));
        assert_eq!(AccuracyBand::from_accuracy(75.0), Some(AccuracyBand::Good));
        assert_eq!(
            AccuracyBand::from_accuracy(60.0),
            Some(AccuracyBand::RoomForImprovement)
        );
        assert_eq!(AccuracyBand::from_accuracy(59.9), None);
    }

    #[test]
    fn insights_follow_fixed_order() {
        let previous = record(SubTest::SimpleReaction, Some(80), None, 300, 2, 8, 6);
        let history = vec![previous];
        let session = SessionRecord::new(
            SessionCandidate {
                score: 8,
                reaction_times: vec![100, 100, 100, 500, 500, 500, 100, 100],
                errors: 0,
                total_trials: 8,
                correct_responses: 8,
            },
            SubTest::SimpleReaction,
            Factors::new(Some(85), None, None).unwrap(),
            at("2024-03-02", "08:00:00"),
        );
        assert_eq!(
            kinds(&generate_insights(&session, &history)),
            vec![
                InsightKind::Attention,
                InsightKind::Factors,
                InsightKind::Learning,
                InsightKind::Performance,
            ]
        );
    }
}
