use crate::grouping::{Bucket, BucketKey};

/// One bar of the factor chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub key: BucketKey,
    pub label: String,
    pub avg_rt: u32,
    /// Bar length relative to the slowest single session in the chart, 0..=100
    pub bar_percent: f64,
    pub total_errors: u64,
    pub accuracy: Option<f64>,
    pub sessions: usize,
}

/// Chart rows for non-empty buckets.
///
/// Bars are scaled against the largest per-session average reaction time across
/// every bucket (at least 1ms), so a bucket mean never exceeds 100%.
pub fn chart_rows(buckets: &[Bucket]) -> Vec<ChartRow> {
    let max_rt = buckets
        .iter()
        .flat_map(|b| b.sessions.iter().map(|s| s.avg_reaction_time()))
        .max()
        .unwrap_or(0)
        .max(1);

    buckets
        .iter()
        .filter(|b| !b.is_empty())
        .map(|b| {
            let stats = b.stats();
            let avg_rt = stats.rounded_avg_rt();
            ChartRow {
                key: b.key,
                label: b.label(),
                avg_rt,
                bar_percent: f64::from(avg_rt) * 100.0 / f64::from(max_rt),
                total_errors: stats.total_errors,
                accuracy: stats.accuracy,
                sessions: stats.count,
            }
        })
        .collect()
}

/// Text bar of `width` cells filled in proportion to `percent`
pub fn bar(percent: f64, width: usize) -> String {
    let filled = (percent.clamp(0.0, 100.0) / 100.0 * width as f64).round() as usize;
    "█".repeat(filled.min(width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SubTest;
    use crate::grouping::{group_by, GroupMode};
    use crate::session::tests::record;
    use crate::util::accuracy_text;

    #[test]
    fn bars_scale_to_slowest_session() {
        let sessions = vec![
            record(SubTest::SimpleReaction, Some(10), None, 200, 9, 10, 1),
            record(SubTest::SimpleReaction, Some(90), None, 300, 8, 10, 2),
            record(SubTest::SimpleReaction, Some(90), None, 500, 6, 10, 4),
        ];
        let rows = chart_rows(&group_by(&sessions, GroupMode::Stress));
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].label, "Low Stress (0-30%)");
        assert_eq!(rows[0].avg_rt, 200);
        assert_eq!(rows[0].bar_percent, 40.0);

        assert_eq!(rows[1].avg_rt, 400);
        assert_eq!(rows[1].bar_percent, 80.0);
        assert_eq!(rows[1].total_errors, 6);
        assert_eq!(rows[1].sessions, 2);
        assert_eq!(accuracy_text(rows[1].accuracy), "70.0%");
    }

    #[test]
    fn untimed_sessions_do_not_divide_by_zero() {
        let sessions = vec![record(SubTest::SpatialMemory, None, None, 0, 3, 5, 2)];
        let rows = chart_rows(&group_by(&sessions, GroupMode::None));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].avg_rt, 0);
        assert_eq!(rows[0].bar_percent, 0.0);
        assert_eq!(rows[0].label, "All Sessions");
    }

    #[test]
    fn zero_trial_bucket_has_no_accuracy() {
        let sessions = vec![record(SubTest::SpatialMemory, None, None, 0, 0, 0, 0)];
        let rows = chart_rows(&group_by(&sessions, GroupMode::None));
        assert_eq!(accuracy_text(rows[0].accuracy), "—");
    }

    #[test]
    fn text_bar_widths() {
        assert_eq!(bar(50.0, 10).chars().count(), 5);
        assert_eq!(bar(100.0, 4), "████");
        assert_eq!(bar(0.0, 4), "");
        assert_eq!(bar(250.0, 4).chars().count(), 4);
    }
}
