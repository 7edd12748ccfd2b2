use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::SubTest;
use crate::factors::{FactorKind, FatigueTier, StressTier};
use crate::session::SessionRecord;
use crate::stats::{compute_stats, SessionStats};

/// Factor dimension used to partition sessions
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum GroupMode {
    #[default]
    None,
    Stress,
    Fatigue,
    StressFatigue,
}

impl GroupMode {
    pub const ALL: [GroupMode; 4] = [
        GroupMode::None,
        GroupMode::Stress,
        GroupMode::Fatigue,
        GroupMode::StressFatigue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GroupMode::None => "All Sessions",
            GroupMode::Stress => "Stress Level",
            GroupMode::Fatigue => "Fatigue Level",
            GroupMode::StressFatigue => "Stress × Fatigue",
        }
    }

    pub fn next(self) -> Self {
        match self {
            GroupMode::None => GroupMode::Stress,
            GroupMode::Stress => GroupMode::Fatigue,
            GroupMode::Fatigue => GroupMode::StressFatigue,
            GroupMode::StressFatigue => GroupMode::None,
        }
    }
}

/// Structured identity of a bucket; ordering is the display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    All,
    Stress(StressTier),
    Fatigue(FatigueTier),
    Combined(StressTier, FatigueTier),
    /// Factor of the active grouping was not recorded
    NoData(FactorKind),
    /// Stress or fatigue missing under the combined grouping
    IncompleteData,
}

impl BucketKey {
    pub fn for_session(session: &SessionRecord, mode: GroupMode) -> Self {
        let factors = session.factors();
        match mode {
            GroupMode::None => BucketKey::All,
            GroupMode::Stress => factors
                .stress_tier()
                .map_or(BucketKey::NoData(FactorKind::Stress), BucketKey::Stress),
            GroupMode::Fatigue => factors
                .fatigue_tier()
                .map_or(BucketKey::NoData(FactorKind::Fatigue), BucketKey::Fatigue),
            GroupMode::StressFatigue => match (factors.stress_tier(), factors.fatigue_tier()) {
                (Some(s), Some(f)) => BucketKey::Combined(s, f),
                _ => BucketKey::IncompleteData,
            },
        }
    }

    pub fn label(&self) -> String {
        match self {
            BucketKey::All => "All Sessions".to_string(),
            BucketKey::Stress(t) => format!("{} Stress ({})", t.label(), t.range()),
            BucketKey::Fatigue(t) => format!("{} ({})", t.label(), t.range()),
            BucketKey::Combined(s, f) => {
                format!("Stress:{} + Fatigue:{}", s.short_label(), f.short_label())
            }
            BucketKey::NoData(_) => "No Data".to_string(),
            BucketKey::IncompleteData => "Incomplete Data".to_string(),
        }
    }
}

/// Non-empty named subset of sessions
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<'a> {
    pub key: BucketKey,
    pub sessions: Vec<&'a SessionRecord>,
}

impl Bucket<'_> {
    pub fn label(&self) -> String {
        self.key.label()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn stats(&self) -> SessionStats {
        compute_stats(self.sessions.iter().copied())
    }
}

/// Partition sessions by `mode`.
///
/// Every session lands in exactly one bucket; sessions lacking the grouped
/// factor go to a catch-all bucket rather than being dropped. Only non-empty
/// buckets are returned, in [`BucketKey`] order, and members keep input order.
pub fn group_by<'a, I>(sessions: I, mode: GroupMode) -> Vec<Bucket<'a>>
where
    I: IntoIterator<Item = &'a SessionRecord>,
{
    let buckets: Vec<Bucket<'a>> = sessions
        .into_iter()
        .into_group_map_by(|s| BucketKey::for_session(s, mode))
        .into_iter()
        .sorted_by_key(|(key, _)| *key)
        .map(|(key, sessions)| Bucket { key, sessions })
        .collect();

    debug!(
        ?mode,
        buckets = buckets.len(),
        sessions = buckets.iter().map(Bucket::len).sum::<usize>(),
        "grouped sessions"
    );
    buckets
}

/// Restrict to one sub-test, or pass everything through when `filter` is `None`
pub fn filter_by_sub_test(
    sessions: &[SessionRecord],
    filter: Option<SubTest>,
) -> Vec<&SessionRecord> {
    sessions
        .iter()
        .filter(|s| filter.map_or(true, |t| s.sub_test() == t))
        .collect()
}
