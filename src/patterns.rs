use serde::Serialize;
use tracing::debug;

use crate::factors::{FatigueTier, StressTier};
use crate::grouping::{Bucket, BucketKey, GroupMode};
use crate::stats::SessionStats;
use crate::util::{accuracy_text, percent_change};

/// Observations beyond this count are dropped
pub const MAX_OBSERVATIONS: usize = 6;

/// Reaction-time gaps at or below this are reported as similar impact
pub const SIMILAR_IMPACT_MS: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationKind {
    Rt,
    Accuracy,
    Errors,
    Neutral,
}

/// Templated, directional statement comparing two buckets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub kind: ObservationKind,
    /// The literal numbers compared, one line per bucket
    pub metrics: Vec<String>,
    pub conclusion: String,
    /// Signed magnitude behind the conclusion: percent for reaction-time
    /// changes, percentage points for accuracy, a count for errors and
    /// milliseconds for the stress/fatigue dominance comparison.
    pub delta: Option<f64>,
}

/// A bucket reduced to its aggregate statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketSummary {
    pub key: BucketKey,
    pub stats: SessionStats,
}

impl BucketSummary {
    pub fn label(&self) -> String {
        self.key.label()
    }

    fn rt_line(&self) -> String {
        format!(
            "{}: avg RT = {}ms ({})",
            self.label(),
            self.stats.rounded_avg_rt(),
            sessions_noun(self.stats.count)
        )
    }

    fn accuracy_line(&self) -> String {
        format!(
            "{}: accuracy = {} ({} errors)",
            self.label(),
            accuracy_text(self.stats.accuracy),
            self.stats.total_errors
        )
    }

    fn errors_line(&self) -> String {
        format!("{}: total errors = {}", self.label(), self.stats.total_errors)
    }
}

fn sessions_noun(count: usize) -> String {
    match count {
        1 => "1 session".to_string(),
        n => format!("{n} sessions"),
    }
}

/// Run every bucket through the aggregator, skipping empty ones
pub fn summarize(buckets: &[Bucket]) -> Vec<BucketSummary> {
    buckets
        .iter()
        .filter(|b| !b.is_empty())
        .map(|b| BucketSummary {
            key: b.key,
            stats: b.stats(),
        })
        .collect()
}

/// Compare reference buckets for `mode` and describe the direction of the differences.
///
/// An observation is only produced when both of its reference buckets are
/// present; a missing bucket silently suppresses it. The result never holds
/// more than [`MAX_OBSERVATIONS`] entries and is empty for fewer than two buckets.
pub fn analyze_patterns(summaries: &[BucketSummary], mode: GroupMode) -> Vec<Observation> {
    if summaries.len() < 2 {
        return Vec::new();
    }
    let lookup = Lookup(summaries);

    let mut observations = match mode {
        GroupMode::None => Vec::new(),
        GroupMode::Stress => stress_observations(&lookup),
        GroupMode::Fatigue => fatigue_observations(&lookup),
        GroupMode::StressFatigue => combined_observations(&lookup),
    };
    observations.truncate(MAX_OBSERVATIONS);

    debug!(
        ?mode,
        buckets = summaries.len(),
        observations = observations.len(),
        "analyzed factor patterns"
    );
    observations
}

/// What the trends view should show under the bucket chart
#[derive(Debug, Clone, PartialEq)]
pub enum FactorAnalysis {
    /// No factor grouping selected, nothing to compare
    Ungrouped,
    /// Grouping selected but no reference pair was available
    InsufficientData,
    Observations(Vec<Observation>),
}

pub fn factor_analysis(summaries: &[BucketSummary], mode: GroupMode) -> FactorAnalysis {
    if mode == GroupMode::None {
        return FactorAnalysis::Ungrouped;
    }
    match analyze_patterns(summaries, mode) {
        obs if obs.is_empty() => FactorAnalysis::InsufficientData,
        obs => FactorAnalysis::Observations(obs),
    }
}

struct Lookup<'a>(&'a [BucketSummary]);

impl Lookup<'_> {
    fn get(&self, key: BucketKey) -> Option<&BucketSummary> {
        self.0.iter().find(|s| s.key == key)
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

fn signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.1}")
    } else {
        format!("{value:.1}")
    }
}

fn rt_direction(percent: f64) -> &'static str {
    if percent > 0.0 {
        "slower"
    } else if percent < 0.0 {
        "faster"
    } else {
        "unchanged"
    }
}

/// Reaction-time change from `base` to `other`, suppressed when `base` has no timing
fn rt_change(
    base: &BucketSummary,
    other: &BucketSummary,
    describe: impl FnOnce(f64) -> String,
) -> Option<Observation> {
    let percent = percent_change(base.stats.avg_rt, other.stats.avg_rt)?;
    Some(Observation {
        kind: ObservationKind::Rt,
        metrics: vec![other.rt_line(), base.rt_line()],
        conclusion: describe(percent),
        delta: Some(percent),
    })
}

/// Error-count increase from `base` to `other`, only when `other` has more
fn error_increase(
    base: &BucketSummary,
    other: &BucketSummary,
    condition: &str,
) -> Option<Observation> {
    let increase = other.stats.total_errors.checked_sub(base.stats.total_errors)?;
    if increase == 0 {
        return None;
    }
    Some(Observation {
        kind: ObservationKind::Errors,
        metrics: vec![base.errors_line(), other.errors_line()],
        conclusion: format!("Error pattern: +{increase} more error(s) {condition}."),
        delta: Some(increase as f64),
    })
}

fn stress_observations(lookup: &Lookup) -> Vec<Observation> {
    let low = lookup.get(BucketKey::Stress(StressTier::Low));
    let medium = lookup.get(BucketKey::Stress(StressTier::Medium));
    let high = lookup.get(BucketKey::Stress(StressTier::High));
    let mut out = Vec::new();

    if let (Some(low), Some(high)) = (low, high) {
        out.extend(rt_change(low, high, |pct| {
            format!(
                "Stress impact: {}% {} reactions under high stress than under low stress.",
                signed(pct),
                rt_direction(pct)
            )
        }));
    }

    if let (Some(low), Some(medium)) = (low, medium) {
        if let (Some(low_acc), Some(med_acc)) = (low.stats.accuracy, medium.stats.accuracy) {
            let diff = med_acc - low_acc;
            let direction = if diff > 0.0 { "improvement" } else { "decline" };
            out.push(Observation {
                kind: ObservationKind::Accuracy,
                metrics: vec![low.accuracy_line(), medium.accuracy_line()],
                conclusion: format!(
                    "Accuracy shift: {}% {direction} from low to medium stress.",
                    signed(diff)
                ),
                delta: Some(diff),
            });
        }
    }

    if let (Some(low), Some(high)) = (low, high) {
        out.extend(error_increase(low, high, "under high stress"));
    }

    out
}

fn fatigue_observations(lookup: &Lookup) -> Vec<Observation> {
    let (Some(rested), Some(tired)) = (
        lookup.get(BucketKey::Fatigue(FatigueTier::WellRested)),
        lookup.get(BucketKey::Fatigue(FatigueTier::VeryTired)),
    ) else {
        return Vec::new();
    };
    let mut out = Vec::new();

    out.extend(rt_change(rested, tired, |pct| {
        format!(
            "Fatigue impact: {}% {} reactions when very tired than when well-rested.",
            signed(pct),
            rt_direction(pct)
        )
    }));

    out.extend(error_increase(rested, tired, "when very tired"));

    if let (Some(rested_acc), Some(tired_acc)) = (rested.stats.accuracy, tired.stats.accuracy) {
        if rested_acc > tired_acc {
            let decline = rested_acc - tired_acc;
            out.push(Observation {
                kind: ObservationKind::Accuracy,
                metrics: vec![rested.accuracy_line(), tired.accuracy_line()],
                conclusion: format!("Accuracy decline: -{decline:.1}% when very tired."),
                delta: Some(decline),
            });
        }
    }

    out
}

fn combined_observations(lookup: &Lookup) -> Vec<Observation> {
    let mut out = Vec::new();

    // Each side has exactly one factor high, so the slower side points at
    // the factor with the larger reaction-time cost.
    if let (Some(stressed), Some(fatigued)) = (
        lookup.get(BucketKey::Combined(StressTier::High, FatigueTier::WellRested)),
        lookup.get(BucketKey::Combined(StressTier::Low, FatigueTier::VeryTired)),
    ) {
        let gap = fatigued.stats.avg_rt - stressed.stats.avg_rt;
        let conclusion = if gap.abs() <= SIMILAR_IMPACT_MS {
            format!(
                "Factor comparison: stress and fatigue appear similarly impactful ({:.0}ms apart).",
                gap.abs()
            )
        } else if gap > 0.0 {
            format!(
                "Factor comparison: fatigue appears more impactful than stress ({:.0}ms slower when only fatigue is high).",
                gap
            )
        } else {
            format!(
                "Factor comparison: stress appears more impactful than fatigue ({:.0}ms slower when only stress is high).",
                -gap
            )
        };
        out.push(Observation {
            kind: ObservationKind::Rt,
            metrics: vec![stressed.rt_line(), fatigued.rt_line()],
            conclusion,
            delta: Some(gap),
        });
    }

    if let (Some(high), Some(low)) = (
        lookup.get(BucketKey::Combined(StressTier::High, FatigueTier::VeryTired)),
        lookup.get(BucketKey::Combined(StressTier::Low, FatigueTier::WellRested)),
    ) {
        if let Some(pct) = percent_change(low.stats.avg_rt, high.stats.avg_rt) {
            let line = |s: &BucketSummary| {
                format!(
                    "{}: avg RT = {}ms, accuracy = {}",
                    s.label(),
                    s.stats.rounded_avg_rt(),
                    accuracy_text(s.stats.accuracy)
                )
            };
            out.push(Observation {
                kind: ObservationKind::Accuracy,
                metrics: vec![line(high), line(low)],
                conclusion: format!(
                    "Combined effect: with both stress and fatigue high, reactions are {:.1}% {} than with both low.",
                    pct.abs(),
                    rt_direction(pct)
                ),
                delta: Some(pct),
            });
        }
    }

    if lookup.len() >= 3 {
        out.push(Observation {
            kind: ObservationKind::Neutral,
            metrics: vec![format!(
                "You have {} different factor combinations tracked.",
                lookup.len()
            )],
            conclusion: "Keep recording sessions across varied stress and fatigue levels to see your own patterns.".to_string(),
            delta: None,
        });
    }

    out
}
