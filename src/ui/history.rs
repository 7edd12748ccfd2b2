use cogtrack::{
    report::{factors_line, NO_SESSIONS_MESSAGE},
    session::SessionRecord,
    util::accuracy_text,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use super::{
    charting::{accuracy_color, rt_color},
    footer, placeholder, HORIZONTAL_MARGIN, VERTICAL_MARGIN,
};
use crate::App;

const KEYS: &str = "(↑/↓) scroll  (PgUp/PgDn) page  (Home) top  (c) clear  (b/backspace) back  (q) quit";

/// Pure presenter for a single history row
pub fn present_row(session: &SessionRecord) -> Row<'static> {
    let avg_rt = session.avg_reaction_time();
    let rt_display = if avg_rt > 0 {
        format!("{avg_rt}ms")
    } else {
        "—".to_string()
    };
    let accuracy = session.accuracy();

    Row::new(vec![
        Cell::from(format!(
            "{} {}",
            session.date(),
            session.time().format("%H:%M")
        )),
        Cell::from(session.sub_test().to_string())
            .style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{}/{}", session.score(), session.total_trials())),
        Cell::from(rt_display).style(Style::default().fg(rt_color(avg_rt))),
        Cell::from(accuracy_text(accuracy)).style(Style::default().fg(accuracy_color(accuracy))),
        Cell::from(session.errors().to_string()),
        Cell::from(factors_line(session.factors()).unwrap_or_else(|| "—".to_string())),
    ])
}

/// Render the session history screen, newest first
pub fn render_history(app: &mut App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Sessions table
            Constraint::Length(2), // Keys and status
        ])
        .split(f.area());

    let history = app.store.history();

    let title = Paragraph::new(format!("Session History ({} sessions)", history.len()))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);
    f.render_widget(footer(KEYS, app.status.as_deref()), chunks[2]);

    if history.is_empty() {
        f.render_widget(placeholder(NO_SESSIONS_MESSAGE), chunks[1]);
        return;
    }

    let table_height = chunks[1].height.saturating_sub(3) as usize; // borders + header
    let max_scroll = history.len().saturating_sub(table_height);
    let offset = app.history_state.scroll_offset.min(max_scroll);

    let header = Row::new(vec![
        Cell::from("When"),
        Cell::from("Test"),
        Cell::from("Score"),
        Cell::from("Avg RT"),
        Cell::from("Accuracy"),
        Cell::from("Errors"),
        Cell::from("Factors"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let visible_rows: Vec<Row> = history
        .iter()
        .skip(offset)
        .take(table_height)
        .map(|s| present_row(s))
        .collect();

    let widths = [
        Constraint::Length(16), // When
        Constraint::Length(21), // Test
        Constraint::Length(7),  // Score
        Constraint::Length(7),  // Avg RT
        Constraint::Length(8),  // Accuracy
        Constraint::Length(6),  // Errors
        Constraint::Min(10),    // Factors
    ];

    let table = Table::new(visible_rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Sessions"))
        .column_spacing(2);
    f.render_widget(table, chunks[1]);

    app.history_state.scroll_offset = offset;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use cogtrack::{catalog::SubTest, factors::Factors, session::SessionCandidate};

    #[test]
    fn test_present_untimed_session() {
        let session = SessionRecord::new(
            SessionCandidate {
                score: 4,
                reaction_times: vec![],
                errors: 1,
                total_trials: 5,
                correct_responses: 4,
            },
            SubTest::SequenceMemory,
            Factors::none(),
            NaiveDateTime::parse_from_str("2024-03-01 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap(),
        );
        let table = Table::new(vec![present_row(&session)], [Constraint::Length(20); 7]);
        let area = ratatui::layout::Rect::new(0, 0, 160, 1);
        let mut buf = ratatui::buffer::Buffer::empty(area);
        ratatui::widgets::Widget::render(table, area, &mut buf);
        let rendered: String = buf.content().iter().map(|c| c.symbol()).collect();

        assert!(rendered.contains("Sequence Memory"));
        assert!(rendered.contains("4/5"));
        assert!(rendered.contains("80.0%"));
        // no reaction times and no factors
        assert_eq!(rendered.matches('—').count(), 2);
    }
}
