// crates/chat-core/tests/room_scenarios.rs
//
// End-to-end scenarios for the pairing core, driven through in-memory
// channels and a recording history sink.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chat_core::{
    AppMessage, Channel, ChatRoom, ConnectionId, ConnectionState, DeliveredRecord, Envelope, HistorySink,
    NullSink, Role, RouteOutcome, SendOutcome,
};
use chat_protocol::json_codec;

// -----------------------------------------------------------------------------
// Fakes
// -----------------------------------------------------------------------------

#[derive(Debug)]
struct ChannelLog {
    sent: RefCell<Vec<Envelope>>,
    open: Cell<bool>,
    closed_by_system: Cell<bool>,
}

/// Channel whose log stays readable after the room has taken ownership.
#[derive(Debug, Clone)]
struct FakeChannel(Rc<ChannelLog>);

impl FakeChannel {
    fn new() -> Self {
        FakeChannel(Rc::new(ChannelLog {
            sent: RefCell::new(Vec::new()),
            open: Cell::new(true),
            closed_by_system: Cell::new(false),
        }))
    }

    fn sent(&self) -> Vec<Envelope> {
        self.0.sent.borrow().clone()
    }

    fn clear(&self) {
        self.0.sent.borrow_mut().clear();
    }

    /// Remote side goes away without the room hearing about it yet.
    fn drop_remote(&self) {
        self.0.open.set(false);
    }

    fn closed_by_system(&self) -> bool {
        self.0.closed_by_system.get()
    }

    fn last_count(&self) -> Option<usize> {
        self.sent().iter().rev().find_map(|e| match e {
            Envelope::UserCount(n) => Some(*n),
            _ => None,
        })
    }

    fn count_of(&self, wanted: &Envelope) -> usize {
        self.sent().iter().filter(|e| *e == wanted).count()
    }
}

impl Channel for FakeChannel {
    fn send(&self, envelope: &Envelope) -> SendOutcome {
        if !self.0.open.get() {
            return SendOutcome::Closed;
        }
        self.0.sent.borrow_mut().push(envelope.clone());
        SendOutcome::Sent
    }

    fn is_open(&self) -> bool {
        self.0.open.get()
    }

    fn close(&self) {
        self.0.open.set(false);
        self.0.closed_by_system.set(true);
    }
}

#[derive(Debug, Default)]
struct RecordingSink {
    records: RefCell<Vec<DeliveredRecord>>,
}

impl HistorySink for RecordingSink {
    fn record(&self, record: DeliveredRecord) {
        self.records.borrow_mut().push(record);
    }
}

type Room = ChatRoom<FakeChannel, RecordingSink>;

fn room() -> Room {
    ChatRoom::new(RecordingSink::default())
}

fn join(room: &mut Room, address: &str) -> (ConnectionId, FakeChannel) {
    let channel = FakeChannel::new();
    let id = room.admit(channel.clone(), address);
    (id, channel)
}

fn records(room: &Room) -> Vec<DeliveredRecord> {
    room.history().records.borrow().clone()
}

// -----------------------------------------------------------------------------
// Admission and pairing
// -----------------------------------------------------------------------------

#[test]
fn admission_greets_then_reports_count() {
    let mut room = room();
    let (a, ch_a) = join(&mut room, "10.0.0.1");

    assert_eq!(
        ch_a.sent(),
        vec![Envelope::ConnectedToServer, Envelope::UserCount(1)]
    );
    assert_eq!(room.state(a), ConnectionState::Waiting);
    assert_eq!(room.address(a), Some("10.0.0.1"));
}

#[test]
fn pairing_is_fifo() {
    let mut room = room();
    let (a, ch_a) = join(&mut room, "10.0.0.1");
    let (b, ch_b) = join(&mut room, "10.0.0.2");
    let (c, ch_c) = join(&mut room, "10.0.0.3");

    assert_eq!(room.partner_of(a), Some(b));
    assert_eq!(room.partner_of(b), Some(a));
    assert_eq!(room.partner_of(c), None);
    assert_eq!(room.state(c), ConnectionState::Waiting);

    assert_eq!(ch_a.count_of(&Envelope::ConnectedToUser), 1);
    assert_eq!(ch_b.count_of(&Envelope::ConnectedToUser), 1);
    assert_eq!(ch_c.count_of(&Envelope::ConnectedToUser), 0);

    // The newcomer is greeted before it is told about the match.
    assert_eq!(
        ch_b.sent(),
        vec![
            Envelope::ConnectedToServer,
            Envelope::ConnectedToUser,
            Envelope::UserCount(2),
            Envelope::UserCount(3),
        ]
    );
    assert!(room.check_invariants().is_ok());
}

#[test]
fn count_is_admissions_minus_closes() {
    let mut room = room();
    let mut joined = Vec::new();
    for n in 0..7 {
        joined.push(join(&mut room, &format!("10.0.0.{n}")));
    }

    // Close two waiting-or-paired connections that are not partners of
    // each other: #7 is waiting, #1 is paired with #2 (which then goes too).
    room.handle_close(joined[6].0);
    assert_eq!(room.broadcast_count(), 6);

    room.handle_close(joined[0].0);
    // #2 was closed by the system alongside #1.
    assert_eq!(room.broadcast_count(), 4);
    assert_eq!(joined[2].1.last_count(), Some(4));
    assert!(room.check_invariants().is_ok());
}

// -----------------------------------------------------------------------------
// Relay
// -----------------------------------------------------------------------------

#[test]
fn relay_delivers_one_server_message_and_one_record() {
    let mut room = room();
    let (a, ch_a) = join(&mut room, "10.0.0.1");
    let (b, ch_b) = join(&mut room, "10.0.0.2");
    ch_a.clear();
    ch_b.clear();

    let outcome = room.route(a, Envelope::client_message("hello"));

    assert_eq!(outcome, RouteOutcome::Delivered);
    assert_eq!(ch_b.sent(), vec![Envelope::server_message("hello")]);
    assert!(ch_a.sent().is_empty());

    let recs = records(&room);
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].sender_address, "10.0.0.1");
    assert_eq!(recs[0].receiver_address, "10.0.0.2");
    assert_eq!(recs[0].content, "hello");

    // And back the other way.
    assert_eq!(
        room.route(b, Envelope::client_message("hi")),
        RouteOutcome::Delivered
    );
    assert_eq!(ch_a.sent(), vec![Envelope::server_message("hi")]);
    assert_eq!(records(&room)[1].sender_address, "10.0.0.2");
}

#[test]
fn relayed_envelope_has_server_wire_shape() {
    let mut room = room();
    let (a, _ch_a) = join(&mut room, "10.0.0.1");
    let (_b, ch_b) = join(&mut room, "10.0.0.2");
    ch_b.clear();

    room.route(a, Envelope::client_message("ping"));

    let wire = json_codec::encode(&ch_b.sent()[0]).expect("encode");
    let value: serde_json::Value = serde_json::from_str(&wire).expect("json");
    assert_eq!(value["kind"], "serverMessage");
    assert_eq!(value["sender"], "server");
    assert_eq!(value["receiver"], "client");
    assert_eq!(value["messageContent"], "ping");
}

#[test]
fn malformed_or_mistagged_envelopes_are_dropped() {
    let mut room = room();
    let (a, ch_a) = join(&mut room, "10.0.0.1");
    let (b, ch_b) = join(&mut room, "10.0.0.2");
    ch_a.clear();
    ch_b.clear();

    let rejected = vec![
        Envelope::invalid("expected value at line 1 column 1"),
        Envelope::ClientMessage(AppMessage {
            sender: Role::Server,
            receiver: Role::Server,
            content: "spoof".into(),
        }),
        Envelope::ClientMessage(AppMessage {
            sender: Role::Client,
            receiver: Role::Client,
            content: "spoof".into(),
        }),
        Envelope::server_message("wrong kind"),
        Envelope::UserCount(99),
        Envelope::DisconnectedFromServer,
    ];

    for envelope in rejected {
        assert_eq!(room.route(a, envelope), RouteOutcome::Ignored);
    }

    assert!(ch_a.sent().is_empty());
    assert!(ch_b.sent().is_empty());
    assert!(records(&room).is_empty());
    assert_eq!(room.partner_of(a), Some(b));
    assert_eq!(room.state(a), ConnectionState::Paired);
}

#[test]
fn unpaired_sender_is_dropped_without_closing() {
    let mut room = room();
    let (a, ch_a) = join(&mut room, "10.0.0.1");
    ch_a.clear();

    assert_eq!(
        room.route(a, Envelope::client_message("anyone?")),
        RouteOutcome::NoPartner
    );
    assert!(ch_a.sent().is_empty());
    assert!(!ch_a.closed_by_system());
    assert_eq!(room.state(a), ConnectionState::Waiting);
    assert!(records(&room).is_empty());
}

#[test]
fn message_in_flight_to_a_vanished_partner_is_not_recorded() {
    let mut room = room();
    let (a, _ch_a) = join(&mut room, "10.0.0.1");
    let (b, ch_b) = join(&mut room, "10.0.0.2");

    // B's socket died but its close has not been processed yet.
    ch_b.drop_remote();

    assert_eq!(
        room.route(a, Envelope::client_message("lost")),
        RouteOutcome::PartnerGone
    );
    assert!(records(&room).is_empty());

    // The pairing is untouched until the close arrives...
    assert_eq!(room.partner_of(a), Some(b));

    // ...and once it does, nothing can be routed through it.
    room.handle_close(b);
    assert_eq!(
        room.route(a, Envelope::client_message("late")),
        RouteOutcome::NoPartner
    );
    assert!(room.check_invariants().is_ok());
}

// -----------------------------------------------------------------------------
// Disconnects
// -----------------------------------------------------------------------------

#[test]
fn closing_a_waiting_connection_notifies_nobody() {
    let mut room = room();
    let (_a, ch_a) = join(&mut room, "10.0.0.1");
    let (_b, ch_b) = join(&mut room, "10.0.0.2");
    let (c, _ch_c) = join(&mut room, "10.0.0.3");
    ch_a.clear();
    ch_b.clear();

    room.handle_close(c);

    // Only the count update, no status envelopes.
    assert_eq!(ch_a.sent(), vec![Envelope::UserCount(2)]);
    assert_eq!(ch_b.sent(), vec![Envelope::UserCount(2)]);
    assert_eq!(room.count(), 2);
    assert!(!ch_a.closed_by_system());
}

#[test]
fn closing_a_paired_connection_takes_the_partner_down() {
    let mut room = room();
    let (a, _ch_a) = join(&mut room, "10.0.0.1");
    let (b, ch_b) = join(&mut room, "10.0.0.2");
    let (c, ch_c) = join(&mut room, "10.0.0.3");
    ch_b.clear();
    ch_c.clear();

    room.handle_close(a);

    assert_eq!(ch_b.sent(), vec![Envelope::DisconnectedFromServer]);
    assert!(ch_b.closed_by_system());

    assert_eq!(room.partner_of(a), None);
    assert_eq!(room.partner_of(b), None);
    assert_eq!(room.state(b), ConnectionState::Terminated);
    assert!(!room.directory().contains(b));

    // The survivor is not recycled into the pool.
    assert!(!room.matchmaker().is_waiting(b));
    assert_eq!(room.state(c), ConnectionState::Waiting);
    assert_eq!(ch_c.sent(), vec![Envelope::UserCount(1)]);

    // The transport later reports B's close; nothing more happens.
    room.handle_close(b);
    assert_eq!(ch_c.sent(), vec![Envelope::UserCount(1)]);
    assert!(room.check_invariants().is_ok());
}

#[test]
fn partner_already_closed_is_dropped_silently() {
    let mut room = room();
    let (a, _ch_a) = join(&mut room, "10.0.0.1");
    let (b, ch_b) = join(&mut room, "10.0.0.2");
    ch_b.clear();
    ch_b.drop_remote();

    room.handle_close(a);

    assert!(ch_b.sent().is_empty());
    assert!(!ch_b.closed_by_system());
    assert_eq!(room.partner_of(b), None);
    assert_eq!(room.count(), 0);
}

#[test]
fn close_handler_is_idempotent() {
    let mut once = room();
    let mut twice = room();

    let mut observed = Vec::new();
    for room in [&mut once, &mut twice] {
        let (a, _) = join(room, "10.0.0.1");
        let (_b, ch_b) = join(room, "10.0.0.2");
        let (_c, ch_c) = join(room, "10.0.0.3");
        ch_b.clear();
        ch_c.clear();
        observed.push((a, ch_b, ch_c));
    }

    once.handle_close(observed[0].0);
    twice.handle_close(observed[1].0);
    twice.handle_close(observed[1].0);

    assert_eq!(observed[0].1.sent(), observed[1].1.sent());
    assert_eq!(observed[0].2.sent(), observed[1].2.sent());
    assert_eq!(once.stats(), twice.stats());
}

#[test]
fn close_of_unknown_id_is_a_no_op() {
    let mut room = room();
    let (_a, ch_a) = join(&mut room, "10.0.0.1");
    ch_a.clear();

    room.handle_close(ConnectionId(42));

    assert!(ch_a.sent().is_empty());
    assert_eq!(room.count(), 1);
}

#[test]
fn broadcast_survives_a_dead_channel() {
    let mut room = room();
    let (_a, ch_a) = join(&mut room, "10.0.0.1");
    let (_b, ch_b) = join(&mut room, "10.0.0.2");
    let (_c, ch_c) = join(&mut room, "10.0.0.3");
    ch_a.clear();
    ch_c.clear();
    ch_b.drop_remote();

    assert_eq!(room.broadcast_count(), 3);
    assert_eq!(ch_a.sent(), vec![Envelope::UserCount(3)]);
    assert_eq!(ch_c.sent(), vec![Envelope::UserCount(3)]);
}

// -----------------------------------------------------------------------------
// Invariants under churn
// -----------------------------------------------------------------------------

/// Tiny deterministic generator so the churn test is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn pairing_stays_a_perfect_matching_under_churn() {
    let mut room: ChatRoom<FakeChannel, NullSink> = ChatRoom::new(NullSink);
    let mut live: Vec<ConnectionId> = Vec::new();
    let mut admitted = 0usize;
    let mut rng = Lcg(7);

    for step in 0..2_000 {
        let roll = rng.next() % 10;
        if live.is_empty() || roll < 5 {
            let id = room.admit(FakeChannel::new(), format!("10.1.{}.{}", step / 256, step % 256));
            live.push(id);
            admitted += 1;
        } else if roll < 8 {
            let idx = (rng.next() as usize) % live.len();
            let id = live.swap_remove(idx);
            room.handle_close(id);
        } else {
            // Duplicate close of something that may already be gone.
            let id = ConnectionId(1 + rng.next() % admitted as u64);
            room.handle_close(id);
        }

        live.retain(|id| room.directory().contains(*id));

        if let Err(violation) = room.check_invariants() {
            panic!("step {step}: {violation}");
        }
        assert_eq!(room.count(), live.len(), "step {step}");
    }
}
