pub mod charting;
pub mod confirm;
pub mod history;
pub mod screen;
pub mod trends;

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

pub fn draw(app: &mut App, f: &mut Frame) {
    let screen = screen::current_screen(&app.state);
    screen.render(app, f);
}

/// Key hints plus the latest status message, if any
fn footer(keys: &str, status: Option<&str>) -> Paragraph<'static> {
    let text = match status {
        Some(status) => format!("{keys}\n{status}"),
        None => keys.to_string(),
    };
    Paragraph::new(text)
        .style(Style::default().add_modifier(Modifier::DIM))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

fn placeholder(message: &str) -> Paragraph<'static> {
    Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true })
}
