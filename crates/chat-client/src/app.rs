// crates/chat-client/src/app.rs

use chat_core::Envelope;
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::types::{ClientConfig, NetCommand, NetEvent};

pub const WELCOME: &str = "Welcome! You're now connected to the server.";
pub const MATCHED: &str = "Match found! Say hello.";
pub const PARTNER_LEFT: &str = "Your partner has left the chat.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// No connection; `s` starts one.
    Idle,
    Connecting,
    /// Connected, waiting in the pool for a partner.
    Waiting,
    Chatting,
    /// The partner left; the server is closing us.
    Ended,
}

impl Session {
    pub fn label(&self) -> &'static str {
        match self {
            Session::Idle => "offline",
            Session::Connecting => "connecting",
            Session::Waiting => "waiting for a partner",
            Session::Chatting => "chatting",
            Session::Ended => "partner left",
        }
    }

    pub fn is_live(&self) -> bool {
        !matches!(self, Session::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    System,
    Partner,
    Me,
}

#[derive(Debug, Clone)]
pub struct ChatLine {
    pub origin: Origin,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

pub struct App {
    // Connection state
    pub session: Session,
    pub user_count: usize,
    pub server_url: String,
    pub display_name: String,

    // UI state
    pub input_mode: InputMode,
    pub should_quit: bool,
    pub show_help: bool,

    // Transcript
    pub lines: VecDeque<ChatLine>,
    history_limit: usize,

    // Input buffer
    pub input_buffer: String,

    // Statistics
    pub messages_sent: u64,
    pub messages_received: u64,

    network_tx: Option<UnboundedSender<NetCommand>>,
}

impl App {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            session: Session::Idle,
            user_count: 0,
            server_url: config.server_url.clone(),
            display_name: config.display_name.clone(),
            input_mode: InputMode::Normal,
            should_quit: false,
            show_help: false,
            lines: VecDeque::with_capacity(config.history_limit.min(1024)),
            history_limit: config.history_limit.max(1),
            input_buffer: String::new(),
            messages_sent: 0,
            messages_received: 0,
            network_tx: None,
        }
    }

    pub fn can_start(&self) -> bool {
        self.session == Session::Idle
    }

    /// Only a matched session may send.
    pub fn can_send(&self) -> bool {
        self.session == Session::Chatting && self.network_tx.is_some()
    }

    /// Record that a new session is being opened through `tx`.
    pub fn begin_session(&mut self, tx: UnboundedSender<NetCommand>) {
        self.lines.clear();
        self.network_tx = Some(tx);
        self.session = Session::Connecting;
        self.push(Origin::System, format!("Connecting to {}...", self.server_url));
    }

    /// Leave the current session, if any.
    pub fn end_session(&mut self) {
        if let Some(tx) = &self.network_tx {
            let _ = tx.send(NetCommand::Leave);
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn start_editing(&mut self) {
        self.input_mode = InputMode::Editing;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn enter_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn delete_char(&mut self) {
        self.input_buffer.pop();
    }

    /// Send the input buffer to the partner. The buffer is kept if
    /// sending is not possible right now.
    pub fn submit_input(&mut self) {
        if self.input_buffer.trim().is_empty() || !self.can_send() {
            return;
        }
        let content = std::mem::take(&mut self.input_buffer);
        if let Some(tx) = &self.network_tx {
            if tx.send(NetCommand::Say(content.clone())).is_err() {
                self.input_buffer = content;
                return;
            }
        }
        self.messages_sent += 1;
        self.push(Origin::Me, content);
    }

    pub fn handle_net_event(&mut self, event: NetEvent) {
        match event {
            NetEvent::Connected => {
                debug!("socket open");
            }
            NetEvent::Envelope(envelope) => self.handle_envelope(envelope),
            NetEvent::Disconnected(reason) => {
                if let Some(reason) = reason {
                    self.push(Origin::System, format!("Connection error: {}", reason));
                }
                self.push(Origin::System, "Disconnected. Press [S] to find someone new.");
                self.network_tx = None;
                self.session = Session::Idle;
                self.user_count = 0;
                self.input_mode = InputMode::Normal;
            }
        }
    }

    pub fn handle_envelope(&mut self, envelope: Envelope) {
        match envelope {
            Envelope::ConnectedToServer => {
                self.session = Session::Waiting;
                self.push(Origin::System, WELCOME);
            }
            Envelope::ConnectedToUser => {
                self.session = Session::Chatting;
                self.push(Origin::System, MATCHED);
            }
            Envelope::DisconnectedFromServer => {
                self.session = Session::Ended;
                self.input_mode = InputMode::Normal;
                self.push(Origin::System, PARTNER_LEFT);
            }
            Envelope::UserCount(count) => {
                self.user_count = count;
            }
            Envelope::ServerMessage(message) => {
                self.messages_received += 1;
                self.push(Origin::Partner, message.content);
            }
            other => {
                debug!("ignoring {} from server", other.kind());
            }
        }
    }

    fn push(&mut self, origin: Origin, text: impl Into<String>) {
        while self.lines.len() >= self.history_limit {
            self.lines.pop_front();
        }
        self.lines.push_back(ChatLine {
            origin,
            text: text.into(),
            timestamp: Local::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{AppMessage, Role};
    use tokio::sync::mpsc;

    fn app() -> App {
        App::new(&ClientConfig::default())
    }

    fn texts(app: &App) -> Vec<&str> {
        app.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn session_walks_through_status_messages() {
        let mut app = app();
        let (tx, _rx) = mpsc::unbounded_channel();
        app.begin_session(tx);
        assert_eq!(app.session, Session::Connecting);

        app.handle_net_event(NetEvent::Envelope(Envelope::ConnectedToServer));
        assert_eq!(app.session, Session::Waiting);
        app.handle_net_event(NetEvent::Envelope(Envelope::UserCount(3)));
        assert_eq!(app.user_count, 3);
        app.handle_net_event(NetEvent::Envelope(Envelope::ConnectedToUser));
        assert_eq!(app.session, Session::Chatting);
        app.handle_net_event(NetEvent::Envelope(Envelope::DisconnectedFromServer));
        assert_eq!(app.session, Session::Ended);

        let shown = texts(&app);
        assert!(shown.contains(&WELCOME));
        assert!(shown.contains(&MATCHED));
        assert!(shown.contains(&PARTNER_LEFT));

        app.handle_net_event(NetEvent::Disconnected(None));
        assert_eq!(app.session, Session::Idle);
        assert_eq!(app.user_count, 0);
        assert!(app.can_start());
    }

    #[test]
    fn sending_requires_a_partner() {
        let mut app = app();
        let (tx, mut rx) = mpsc::unbounded_channel();
        app.begin_session(tx);
        app.handle_envelope(Envelope::ConnectedToServer);

        app.input_buffer = "anyone?".into();
        app.submit_input();
        assert!(rx.try_recv().is_err());
        assert_eq!(app.input_buffer, "anyone?");

        app.handle_envelope(Envelope::ConnectedToUser);
        app.submit_input();
        assert_eq!(rx.try_recv().unwrap(), NetCommand::Say("anyone?".into()));
        assert!(app.input_buffer.is_empty());
        assert_eq!(app.messages_sent, 1);
        assert_eq!(app.lines.back().unwrap().origin, Origin::Me);
    }

    #[test]
    fn partner_messages_are_shown() {
        let mut app = app();
        app.handle_envelope(Envelope::ServerMessage(AppMessage {
            sender: Role::Server,
            receiver: Role::Client,
            content: "hi".into(),
        }));
        let last = app.lines.back().unwrap();
        assert_eq!(last.origin, Origin::Partner);
        assert_eq!(last.text, "hi");
        assert_eq!(app.messages_received, 1);
    }

    #[test]
    fn transcript_is_bounded() {
        let config = ClientConfig {
            history_limit: 2,
            ..ClientConfig::default()
        };
        let mut app = App::new(&config);
        for _ in 0..5 {
            app.handle_envelope(Envelope::ConnectedToServer);
        }
        assert_eq!(app.lines.len(), 2);
    }

    #[test]
    fn leaving_sends_leave() {
        let mut app = app();
        let (tx, mut rx) = mpsc::unbounded_channel();
        app.begin_session(tx);
        app.end_session();
        assert_eq!(rx.try_recv().unwrap(), NetCommand::Leave);
    }
}
