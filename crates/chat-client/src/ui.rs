// crates/chat-client/src/ui.rs

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Session};
use crate::components::{
    help::draw_help, message_list::draw_message_list, status_bar::draw_status_bar,
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Chat
            Constraint::Length(3), // Status bar / input
        ])
        .split(f.size());

    draw_header(f, chunks[0], app);
    draw_message_list(f, chunks[1], app);
    draw_status_bar(f, chunks[2], app);

    if app.show_help {
        draw_help(f, centered_rect(60, 50, f.size()));
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    let session_color = match app.session {
        Session::Idle => Color::Red,
        Session::Connecting | Session::Waiting => Color::Yellow,
        Session::Chatting => Color::Green,
        Session::Ended => Color::Magenta,
    };

    let left_text = vec![
        Span::styled("randomchat", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" - "),
        Span::styled(app.session.label(), Style::default().fg(session_color)),
    ];
    f.render_widget(
        Paragraph::new(Line::from(left_text)).block(Block::default().borders(Borders::ALL)),
        header_chunks[0],
    );

    let online = if app.session.is_live() {
        format!("Online: {}", app.user_count)
    } else {
        "Online: -".to_string()
    };
    let center_text = format!(
        "{} | Sent: {} | Recv: {}",
        online, app.messages_sent, app.messages_received
    );
    f.render_widget(
        Paragraph::new(center_text)
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL)),
        header_chunks[1],
    );

    f.render_widget(
        Paragraph::new("[F1]Help [S]tart [X]Exit")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL)),
        header_chunks[2],
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
