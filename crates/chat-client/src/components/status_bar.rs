// crates/chat-client/src/components/status_bar.rs

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, InputMode};

pub fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (msg, style, alignment) = match app.input_mode {
        InputMode::Normal => {
            let shortcuts = vec![
                Span::styled("[S]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::raw("tart "),
                Span::styled("[X]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::raw(" Exit "),
                Span::styled("[I]", Style::default().fg(Color::Yellow)),
                Span::raw("nput "),
                Span::styled("[Q]", Style::default().fg(Color::Gray)),
                Span::raw("uit"),
            ];
            (Line::from(shortcuts), Style::default(), Alignment::Center)
        }
        InputMode::Editing => {
            let hint = if app.can_send() {
                " [Enter] Send [Esc] Done"
            } else {
                " (waiting for a partner) [Esc] Done"
            };
            let input = vec![
                Span::raw("> "),
                Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::Yellow)),
                Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
                Span::styled(hint, Style::default().fg(Color::Gray)),
            ];
            (Line::from(input), Style::default().fg(Color::Yellow), Alignment::Left)
        }
    };

    let paragraph = Paragraph::new(msg)
        .block(Block::default().borders(Borders::ALL).border_style(style))
        .alignment(alignment);

    f.render_widget(paragraph, area);
}
