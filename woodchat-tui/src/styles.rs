//! Terminal palette: warm wood tones for Tesa, cool blue for the user.
use ratatui::style::{Color, Modifier, Style};

const OAK: Color = Color::Rgb(214, 163, 98);
const WALNUT: Color = Color::Rgb(240, 214, 170);
const SKY: Color = Color::Rgb(120, 180, 235);

pub fn you_label() -> Style {
    Style::default().fg(SKY).add_modifier(Modifier::BOLD)
}

pub fn you_text() -> Style {
    Style::default().fg(SKY)
}

pub fn tesa_label() -> Style {
    Style::default().fg(OAK).add_modifier(Modifier::BOLD)
}

pub fn tesa_text() -> Style {
    Style::default().fg(WALNUT)
}

pub fn tesa_strong() -> Style {
    tesa_text().fg(OAK).add_modifier(Modifier::BOLD)
}

/// Panel title and the closed-panel hint.
pub fn accent() -> Style {
    Style::default().fg(OAK).add_modifier(Modifier::BOLD)
}

pub fn busy() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn ready() -> Style {
    Style::default().fg(Color::Green)
}

pub fn notice() -> Style {
    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
}

pub fn error() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

pub fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}
