use cogtrack::{
    chart::{bar, ChartRow},
    patterns::FactorAnalysis,
    report::{TrendsReport, INSUFFICIENT_DATA_MESSAGE, NO_DATA_MESSAGE, NO_SESSIONS_MESSAGE},
    util::accuracy_text,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::{
    charting::{accuracy_color, observation_style, rt_color},
    footer, placeholder, HORIZONTAL_MARGIN, VERTICAL_MARGIN,
};
use crate::App;

const BAR_WIDTH: u16 = 24;
const KEYS: &str = "(g) grouping  (t) test filter  (h) history  (r) reload  (c) clear  (q) quit";

fn present_row(row: &ChartRow) -> Row<'static> {
    Row::new(vec![
        Cell::from(row.label.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{}ms", row.avg_rt)).style(Style::default().fg(rt_color(row.avg_rt))),
        Cell::from(bar(row.bar_percent, BAR_WIDTH as usize))
            .style(Style::default().fg(rt_color(row.avg_rt))),
        Cell::from(row.total_errors.to_string()),
        Cell::from(accuracy_text(row.accuracy)).style(Style::default().fg(accuracy_color(row.accuracy))),
        Cell::from(row.sessions.to_string()),
    ])
}

fn summary_line(report: &TrendsReport) -> Line<'static> {
    let overall = &report.overall;
    let mut spans = vec![
        Span::raw(format!("{} sessions · avg RT ", overall.count)),
        Span::styled(
            format!("{}ms", overall.rounded_avg_rt()),
            Style::default().fg(rt_color(overall.rounded_avg_rt())),
        ),
        Span::raw(" · accuracy "),
        Span::styled(
            accuracy_text(overall.accuracy),
            Style::default().fg(accuracy_color(overall.accuracy)),
        ),
        Span::raw(format!(" · {} errors", overall.total_errors)),
    ];
    if let (Some(fastest), Some(slowest)) = (overall.fastest_rt, overall.slowest_rt) {
        spans.push(Span::styled(
            format!(" · fastest {fastest}ms, slowest {slowest}ms"),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    Line::from(spans)
}

fn analysis_lines(analysis: &FactorAnalysis) -> Vec<Line<'static>> {
    match analysis {
        FactorAnalysis::Ungrouped => vec![Line::from(Span::styled(
            "Group by a factor (g) to compare stress and fatigue levels.",
            Style::default().add_modifier(Modifier::DIM),
        ))],
        FactorAnalysis::InsufficientData => vec![Line::from(INSUFFICIENT_DATA_MESSAGE)],
        FactorAnalysis::Observations(observations) => {
            let mut lines = Vec::new();
            for (idx, obs) in observations.iter().enumerate() {
                if idx > 0 {
                    lines.push(Line::default());
                }
                lines.extend(obs.metrics.iter().map(|m| {
                    Line::from(Span::styled(
                        m.clone(),
                        Style::default().add_modifier(Modifier::DIM),
                    ))
                }));
                lines.push(Line::from(Span::styled(
                    format!("→ {}", obs.conclusion),
                    observation_style(obs.kind),
                )));
            }
            lines
        }
    }
}

/// Render the factor trends screen
pub fn render_trends(app: &mut App, f: &mut Frame) {
    let report = &app.report;
    let chart_height = (report.rows.len() as u16).saturating_add(3);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),            // Title
            Constraint::Length(1),            // Overall summary
            Constraint::Length(chart_height), // Bucket chart
            Constraint::Min(0),               // Observations
            Constraint::Length(2),            // Keys and status
        ])
        .split(f.area());

    let title = Paragraph::new(format!(
        "{} · grouped by {}",
        report.filter_label(),
        report.mode.label()
    ))
    .block(Block::default().borders(Borders::ALL).title("Trends"))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);
    f.render_widget(footer(KEYS, app.status.as_deref()), chunks[4]);

    if report.is_empty() {
        let message = if app.store.is_empty() {
            NO_SESSIONS_MESSAGE
        } else {
            NO_DATA_MESSAGE
        };
        f.render_widget(placeholder(message), chunks[3]);
        return;
    }

    f.render_widget(Paragraph::new(summary_line(report)), chunks[1]);

    let label_width = report
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(6) as u16;
    let header = Row::new(vec![
        Cell::from("Group"),
        Cell::from("Avg RT"),
        Cell::from(""),
        Cell::from("Errors"),
        Cell::from("Accuracy"),
        Cell::from("Sessions"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let widths = [
        Constraint::Length(label_width),
        Constraint::Length(8),
        Constraint::Length(BAR_WIDTH),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(8),
    ];
    let table = Table::new(report.rows.iter().map(present_row), widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Performance by group"))
        .column_spacing(2);
    f.render_widget(table, chunks[2]);

    let analysis = Paragraph::new(analysis_lines(&report.analysis))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .title("Factor-Based Observations"),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(analysis, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogtrack::patterns::{Observation, ObservationKind};

    #[test]
    fn test_ungrouped_hint() {
        let lines = analysis_lines(&FactorAnalysis::Ungrouped);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_observation_lines_are_separated() {
        let obs = |kind| Observation {
            kind,
            metrics: vec!["a".into(), "b".into()],
            conclusion: "c".into(),
            delta: None,
        };
        let lines = analysis_lines(&FactorAnalysis::Observations(vec![
            obs(ObservationKind::Rt),
            obs(ObservationKind::Errors),
        ]));
        // 3 lines each plus one separator
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[2].spans[0].content, "→ c");
    }
}
