// crates/chat-client/src/components/message_list.rs

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, ChatLine, Origin};

pub fn draw_message_list(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app.lines.iter().map(|l| render_line(l, app)).collect();

    // Keep the newest lines in view.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Chat ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    f.render_widget(paragraph, area);
}

fn render_line<'a>(line: &'a ChatLine, app: &'a App) -> Line<'a> {
    let time = Span::styled(
        line.timestamp.format("%H:%M:%S ").to_string(),
        Style::default().fg(Color::DarkGray),
    );

    match line.origin {
        Origin::System => Line::from(vec![
            time,
            Span::styled(
                line.text.as_str(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            ),
        ]),
        Origin::Partner => Line::from(vec![
            time,
            Span::styled("Stranger: ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(line.text.as_str()),
        ]),
        Origin::Me => Line::from(vec![
            time,
            Span::styled(
                format!("{}: ", app.display_name),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(line.text.as_str()),
        ]),
    }
}
