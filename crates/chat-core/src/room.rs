//! The chat room: admission, relay, disconnect propagation and
//! presence broadcast, composed over a [`Directory`] and a
//! [`Matchmaker`].
//!
//! Every operation takes `&mut self`, so whoever owns the room
//! serializes all mutations.
//! In the server that owner is one task fed by a channel, which gives
//! the ordering guarantees below without any locking in here:
//!
//! - a connection is never observable as both waiting and paired;
//! - once a pairing is dissolved, no later `route` can reach it, because
//!   `route` looks the partner up afresh on every call.
//!
//! Sends never fail loudly. A [`SendOutcome::Closed`] is logged and
//! otherwise ignored; the transport will report the close on its own.

use tracing::{debug, error, info, warn};

use crate::channel::{Channel, SendOutcome};
use crate::connection::{ConnectionId, ConnectionState};
use crate::directory::Directory;
use crate::envelope::Envelope;
use crate::matchmaker::{Dissolution, Matchmaker};
use crate::record::{DeliveredRecord, HistorySink};

/// Population snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RoomStats {
    pub waiting: usize,
    pub paired: usize,
    pub total: usize,
}

/// What `route` did with an inbound envelope.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Forwarded to the partner and recorded.
    Delivered,

    /// Malformed, or not a client -> server application message.
    Ignored,

    /// Sender is not currently paired.
    NoPartner,

    /// Sender or partner channel is no longer live.
    PartnerGone,
}

/// Pairing/relay engine for anonymous one-to-one chat.
#[derive(Debug)]
pub struct ChatRoom<C, S> {
    directory: Directory<C>,
    matchmaker: Matchmaker,
    history: S,
}

impl<C: Channel, S: HistorySink> ChatRoom<C, S> {
    pub fn new(history: S) -> Self {
        ChatRoom {
            directory: Directory::new(),
            matchmaker: Matchmaker::new(),
            history,
        }
    }

    // -------------------------------------------------------------------------
    // Transport events
    // -------------------------------------------------------------------------

    /// Admit a freshly opened channel.
    ///
    /// Greets it, drops it into the waiting pool (pairing it straight
    /// away if someone else is waiting) and pushes the new count to
    /// everyone.
    pub fn admit(&mut self, channel: C, address: impl Into<String>) -> ConnectionId {
        let id = self.directory.admit(channel, address);

        self.send_to(id, &Envelope::ConnectedToServer);

        if let Some(pair) = self.matchmaker.enqueue(id) {
            self.directory.set_state(pair.first, ConnectionState::Paired);
            self.directory.set_state(pair.second, ConnectionState::Paired);

            self.send_to(pair.first, &Envelope::ConnectedToUser);
            self.send_to(pair.second, &Envelope::ConnectedToUser);

            info!(first = %pair.first, second = %pair.second, "paired");
        }

        self.broadcast_count();

        let stats = self.stats();
        info!(
            %id,
            address = self.directory.address(id).unwrap_or_default(),
            waiting = stats.waiting,
            paired = stats.paired,
            "connection admitted"
        );

        id
    }

    /// Relay an inbound envelope from `sender` to its partner.
    pub fn route(&mut self, sender: ConnectionId, envelope: Envelope) -> RouteOutcome {
        let message = match envelope {
            Envelope::ClientMessage(message) if message.is_client_to_server() => message,
            Envelope::Invalid(reason) => {
                warn!(%sender, %reason, "dropping malformed envelope");
                return RouteOutcome::Ignored;
            }
            other => {
                debug!(%sender, kind = other.kind(), "ignoring envelope");
                return RouteOutcome::Ignored;
            }
        };

        let Some(partner) = self.matchmaker.partner_of(sender) else {
            warn!(%sender, "message from a connection that is not paired");
            return RouteOutcome::NoPartner;
        };

        if !self.directory.contains(partner) {
            // Pairing map points at something the directory forgot.
            // Treat it as that partner having closed.
            error!(%sender, %partner, "pairing refers to an untracked connection");
            self.handle_close(partner);
            return RouteOutcome::PartnerGone;
        }

        let sender_open = self.is_open(sender);
        let partner_open = self.is_open(partner);
        if !sender_open || !partner_open {
            warn!(
                %sender,
                %partner,
                sender_open,
                partner_open,
                "message for a pairing that is closing"
            );
            return RouteOutcome::PartnerGone;
        }

        let outbound = Envelope::server_message(message.content.as_str());
        if self.send_to(partner, &outbound) == SendOutcome::Closed {
            warn!(%sender, %partner, "partner closed before delivery");
            return RouteOutcome::PartnerGone;
        }

        let from = self.directory.address(sender).unwrap_or_default();
        let to = self.directory.address(partner).unwrap_or_default();
        self.history
            .record(DeliveredRecord::stamped_now(from, to, message.content));

        debug!(%sender, %partner, "message relayed");
        RouteOutcome::Delivered
    }

    /// The transport reports that `id` has gone away.
    ///
    /// A waiting connection just leaves the pool. A paired one takes
    /// its partner down with it: the partner is told, unpaired, closed
    /// from this side and forgotten. Calling this again for the same
    /// id does nothing.
    pub fn handle_close(&mut self, id: ConnectionId) {
        let tracked = self.directory.contains(id)
            || self.matchmaker.is_waiting(id)
            || self.matchmaker.is_paired(id);
        if !tracked {
            debug!(%id, "close for an untracked connection");
            return;
        }

        if !self.matchmaker.remove_waiting(id) {
            if let Dissolution::Paired(partner) = self.matchmaker.dissolve(id) {
                self.release_partner(partner);
            }
        }

        self.directory.remove(id);
        self.broadcast_count();

        let stats = self.stats();
        info!(
            %id,
            remaining = stats.total,
            waiting = stats.waiting,
            paired = stats.paired,
            "connection closed"
        );
    }

    /// Push the current population to every tracked connection.
    /// Returns the count that was sent.
    pub fn broadcast_count(&self) -> usize {
        let count = self.directory.count();
        let envelope = Envelope::UserCount(count);

        let failed = self
            .directory
            .iter()
            .filter(|entry| entry.channel.send(&envelope) == SendOutcome::Closed)
            .count();

        if failed > 0 {
            debug!(count, failed, "user count not delivered everywhere");
        }

        count
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn count(&self) -> usize {
        self.directory.count()
    }

    pub fn stats(&self) -> RoomStats {
        RoomStats {
            waiting: self.matchmaker.waiting_len(),
            paired: self.matchmaker.paired_len(),
            total: self.directory.count(),
        }
    }

    pub fn partner_of(&self, id: ConnectionId) -> Option<ConnectionId> {
        self.matchmaker.partner_of(id)
    }

    pub fn state(&self, id: ConnectionId) -> ConnectionState {
        self.directory.state(id)
    }

    pub fn address(&self, id: ConnectionId) -> Option<&str> {
        self.directory.address(id)
    }

    pub fn directory(&self) -> &Directory<C> {
        &self.directory
    }

    pub fn matchmaker(&self) -> &Matchmaker {
        &self.matchmaker
    }

    pub fn history(&self) -> &S {
        &self.history
    }

    /// Cross-check the matchmaker against the directory.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.matchmaker.check_invariants()?;

        for id in self.matchmaker.waiting() {
            match self.directory.state(id) {
                ConnectionState::Waiting => {}
                other => return Err(format!("{id} is pooled but {}", other.as_str())),
            }
        }

        for entry in self.directory.iter() {
            let pooled = self.matchmaker.is_waiting(entry.id);
            let paired = self.matchmaker.is_paired(entry.id);
            match entry.state {
                ConnectionState::Waiting if pooled => {}
                ConnectionState::Paired if paired => {}
                state => {
                    return Err(format!(
                        "{} is {} (pooled: {pooled}, paired: {paired})",
                        entry.id,
                        state.as_str()
                    ))
                }
            }
        }

        let stats = self.stats();
        if stats.waiting + stats.paired != stats.total {
            return Err(format!(
                "{} waiting + {} paired != {} tracked",
                stats.waiting, stats.paired, stats.total
            ));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn send_to(&self, id: ConnectionId, envelope: &Envelope) -> SendOutcome {
        match self.directory.channel(id) {
            Some(channel) => {
                let outcome = channel.send(envelope);
                if outcome == SendOutcome::Closed {
                    debug!(%id, kind = envelope.kind(), "send to closed channel");
                }
                outcome
            }
            None => SendOutcome::Closed,
        }
    }

    fn is_open(&self, id: ConnectionId) -> bool {
        self.directory
            .channel(id)
            .map(Channel::is_open)
            .unwrap_or(false)
    }

    /// Tell a surviving partner its counterpart left, then close and
    /// forget it. The survivor is not put back in the pool.
    fn release_partner(&mut self, partner: ConnectionId) {
        self.matchmaker.dissolve(partner);

        if self.is_open(partner) {
            self.send_to(partner, &Envelope::DisconnectedFromServer);
            if let Some(channel) = self.directory.channel(partner) {
                channel.close();
            }
            info!(%partner, "partner notified and closed");
        } else {
            debug!(%partner, "partner already closed, dropping stale pairing");
        }

        self.directory.remove(partner);
    }
}
