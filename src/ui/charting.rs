use cogtrack::patterns::ObservationKind;
use ratatui::style::{Color, Modifier, Style};

/// Colour for an average reaction time in milliseconds; 0 means untimed
pub fn rt_color(avg_rt: u32) -> Color {
    match avg_rt {
        0 => Color::Gray,
        1..=399 => Color::Green,
        400..=699 => Color::Yellow,
        _ => Color::Red,
    }
}

pub fn accuracy_color(accuracy: Option<f64>) -> Color {
    match accuracy {
        None => Color::Gray,
        Some(acc) if acc >= 90.0 => Color::Green,
        Some(acc) if acc >= 70.0 => Color::Yellow,
        Some(_) => Color::Red,
    }
}

/// Style of the conclusion line for an observation
pub fn observation_style(kind: ObservationKind) -> Style {
    let base = Style::default().add_modifier(Modifier::BOLD);
    match kind {
        ObservationKind::Rt => base.fg(Color::Cyan),
        ObservationKind::Accuracy => base.fg(Color::Magenta),
        ObservationKind::Errors => base.fg(Color::Red),
        ObservationKind::Neutral => Style::default().add_modifier(Modifier::ITALIC),
    }
}
