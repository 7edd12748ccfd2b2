use ratatui::Frame;

use crate::{
    ui::{confirm::render_confirm_clear, history::render_history, trends::render_trends},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one application state
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

pub struct TrendsScreen;

impl Screen for TrendsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_trends(app, f);
    }
}

pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_history(app, f);
    }
}

/// Draws the screen the dialog was opened from, then the dialog on top
pub struct ConfirmClearScreen;

impl Screen for ConfirmClearScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        match app.previous_state {
            AppState::History => HistoryScreen.render(app, f),
            _ => TrendsScreen.render(app, f),
        }
        render_confirm_clear(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Trends => Box::new(TrendsScreen),
        AppState::History => Box::new(HistoryScreen),
        AppState::ConfirmClear => Box::new(ConfirmClearScreen),
    }
}
