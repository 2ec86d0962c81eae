// crates/chat-client/src/components/mod.rs

pub mod help;
pub mod message_list;
pub mod status_bar;
