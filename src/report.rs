//! Plain-text renderings shared by the CLI subcommands and the terminal UI.

use crate::catalog::{SubTest, TestCategory};
use crate::chart::{bar, chart_rows, ChartRow};
use crate::factors::Factors;
use crate::grouping::{filter_by_sub_test, group_by, GroupMode};
use crate::insights::Insight;
use crate::patterns::{factor_analysis, summarize, FactorAnalysis};
use crate::session::SessionRecord;
use crate::stats::{compute_stats, SessionStats};
use crate::util::accuracy_text;

pub const NO_DATA_MESSAGE: &str = "No data available for the selected filters";
pub const INSUFFICIENT_DATA_MESSAGE: &str =
    "Not enough data to identify clear patterns yet. Try more sessions with different factor combinations.";
pub const NO_SESSIONS_MESSAGE: &str = "No sessions recorded yet.";

/// Everything the trends view shows for one grouping and filter
#[derive(Debug, Clone, PartialEq)]
pub struct TrendsReport {
    pub mode: GroupMode,
    pub filter: Option<SubTest>,
    pub overall: SessionStats,
    pub rows: Vec<ChartRow>,
    pub analysis: FactorAnalysis,
}

impl TrendsReport {
    /// True when the filter matched no sessions
    pub fn is_empty(&self) -> bool {
        self.overall.is_empty()
    }

    pub fn filter_label(&self) -> String {
        match self.filter {
            Some(t) => t.to_string(),
            None => "All Tests".to_string(),
        }
    }
}

/// Filter, group, aggregate and analyze in one pass
pub fn trends_report(
    sessions: &[SessionRecord],
    mode: GroupMode,
    filter: Option<SubTest>,
) -> TrendsReport {
    let filtered = filter_by_sub_test(sessions, filter);
    let buckets = group_by(filtered.iter().copied(), mode);
    let summaries = summarize(&buckets);

    TrendsReport {
        mode,
        filter,
        overall: compute_stats(filtered.iter().copied()),
        rows: chart_rows(&buckets),
        analysis: factor_analysis(&summaries, mode),
    }
}

/// `Stress 20%, Fatigue 80%`, or `None` when neither was recorded
pub fn factors_line(factors: &Factors) -> Option<String> {
    let parts: Vec<String> = [
        factors.stress.map(|s| format!("Stress {s}%")),
        factors.fatigue.map(|f| format!("Fatigue {f}%")),
    ]
    .into_iter()
    .flatten()
    .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Results screen for a just-finished session
pub fn render_session_summary(session: &SessionRecord, insights: &[Insight]) -> String {
    let mut lines = vec![
        format!(
            "{} ({}) · {} {}",
            session.sub_test(),
            session.category(),
            session.date(),
            session.time().format("%H:%M")
        ),
        String::new(),
        format!("Score: {}/{}", session.score(), session.total_trials()),
    ];
    let has_times = !session.reaction_times().is_empty();
    if has_times {
        lines.push(format!(
            "Avg Reaction Time: {}ms",
            session.avg_reaction_time()
        ));
    }
    lines.push(format!("Errors: {}", session.errors()));
    lines.push(format!("Accuracy: {}", accuracy_text(session.accuracy())));

    lines.push(String::new());
    lines.push("Summary".to_string());
    lines.push(format!(
        "You completed {} trials with {} correct responses.",
        session.total_trials(),
        session.correct_responses()
    ));
    if has_times {
        lines.push(format!(
            "Your average reaction time was {}ms.",
            session.avg_reaction_time()
        ));
    }
    if session.errors() > 0 {
        lines.push(format!(
            "You made {} error(s) during this test.",
            session.errors()
        ));
    } else {
        lines.push("No errors in this run.".to_string());
    }

    if !insights.is_empty() {
        lines.push(String::new());
        lines.push("Insights & Observations".to_string());
        lines.extend(insights.iter().map(|i| format!("- {i}")));
    }

    let factors = session.factors();
    if !factors.is_empty() {
        lines.push(String::new());
        lines.push("Recorded Factors".to_string());
        if let (Some(level), Some(tier)) = (factors.stress, factors.stress_tier()) {
            lines.push(format!("Stress Level: {level}% ({})", tier.label()));
        }
        if let (Some(level), Some(tier)) = (factors.fatigue, factors.fatigue_tier()) {
            lines.push(format!("Fatigue Level: {level}% ({})", tier.label()));
        }
        if let Some(age) = factors.age {
            lines.push(format!("Age: {age} years"));
        }
    }

    lines.join("\n")
}

/// Lines for one history entry
pub fn history_entry(session: &SessionRecord) -> Vec<String> {
    let mut lines = vec![
        session.sub_test().to_string(),
        format!("{} {}", session.date(), session.time().format("%H:%M")),
        format!(
            "Score: {}/{} | Accuracy: {}",
            session.score(),
            session.total_trials(),
            accuracy_text(session.accuracy())
        ),
    ];
    if session.avg_reaction_time() > 0 {
        lines.push(format!(
            "Avg Reaction Time: {}ms",
            session.avg_reaction_time()
        ));
    }
    if let Some(factors) = factors_line(session.factors()) {
        lines.push(format!("Factors recorded: {factors}"));
    }
    lines
}

/// History entries separated by blank lines, in the order given
pub fn render_history(history: &[&SessionRecord]) -> String {
    if history.is_empty() {
        return NO_SESSIONS_MESSAGE.to_string();
    }
    history
        .iter()
        .map(|s| history_entry(s).join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Text form of the trends view
pub fn render_analysis(report: &TrendsReport) -> String {
    let mut lines = vec![format!(
        "Trends: {} · grouped by {}",
        report.filter_label(),
        report.mode.label()
    )];

    if report.is_empty() {
        lines.push(NO_DATA_MESSAGE.to_string());
        return lines.join("\n");
    }

    let overall = &report.overall;
    lines.push(format!(
        "{} sessions · avg RT {}ms · accuracy {} · {} errors",
        overall.count,
        overall.rounded_avg_rt(),
        accuracy_text(overall.accuracy),
        overall.total_errors
    ));
    if let (Some(fastest), Some(slowest)) = (overall.fastest_rt, overall.slowest_rt) {
        lines.push(format!("Fastest session {fastest}ms · slowest {slowest}ms"));
    }

    lines.push(String::new());
    let width = report.rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
    for row in &report.rows {
        lines.push(format!(
            "{:<width$}  {:>5}ms  {:<20}  errors {:>3}  accuracy {:>6}  (n={})",
            row.label,
            row.avg_rt,
            bar(row.bar_percent, 20),
            row.total_errors,
            accuracy_text(row.accuracy),
            row.sessions,
        ));
    }

    match &report.analysis {
        FactorAnalysis::Ungrouped => {}
        FactorAnalysis::InsufficientData => {
            lines.push(String::new());
            lines.push("Factor-Based Observations".to_string());
            lines.push(INSUFFICIENT_DATA_MESSAGE.to_string());
        }
        FactorAnalysis::Observations(observations) => {
            lines.push(String::new());
            lines.push("Factor-Based Observations".to_string());
            for obs in observations {
                lines.push(String::new());
                lines.extend(obs.metrics.iter().map(|m| format!("  {m}")));
                lines.push(format!("  → {}", obs.conclusion));
            }
        }
    }

    lines.join("\n")
}

/// The test catalog grouped by category
pub fn render_catalog() -> String {
    let mut lines = Vec::new();
    for category in TestCategory::ALL {
        lines.push(category.to_string());
        for test in category.sub_tests() {
            lines.push(format!(
                "  {:<22} {:<24} {}",
                test.to_string(),
                test.slug(),
                test.description()
            ));
        }
    }
    lines.join("\n")
}
