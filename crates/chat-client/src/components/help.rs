// crates/chat-client/src/components/help.rs

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
    Frame,
};

const KEYS: &[(&str, &str, Color)] = &[
    ("S/s", "Start a chat with a random stranger", Color::Green),
    ("X/x", "Leave the current chat", Color::Red),
    ("I/i, Enter", "Write a message", Color::Yellow),
    ("Enter", "Send (while matched)", Color::Yellow),
    ("Esc", "Stop writing", Color::White),
    ("F1", "Toggle Help", Color::Gray),
    ("Q/q", "Quit", Color::Red),
];

pub fn draw_help(f: &mut Frame, area: Rect) {
    // Clear the area first for the overlay
    f.render_widget(Clear, area);

    let items: Vec<ListItem> = KEYS
        .iter()
        .map(|(key, action, color)| {
            ListItem::new(Line::from(vec![
                Span::styled(*key, Style::default().fg(*color).add_modifier(Modifier::BOLD)),
                Span::raw(format!(" - {}", action)),
            ]))
        })
        .collect();

    let help_list = List::new(items).block(
        Block::default()
            .title(" Help - Keyboard Shortcuts ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(help_list, area);
}
