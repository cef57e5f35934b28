use serde::{Deserialize, Serialize};

/// The reservation's primary lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationState {
    Nascent,
    Ticketed,
    ActiveTicketed,
    Active,
    Closing,
    Closed,
    Failed,
}

impl ReservationState {
    /// Terminal states never mutate again once `pending` also clears to
    /// `None` (see `Reservation::is_terminal`).
    pub fn is_terminal_state(&self) -> bool {
        matches!(self, ReservationState::Closed | ReservationState::Failed)
    }
}

/// The in-flight protocol operation, if any. While `pending != None` the
/// reservation is blocked from originating a new protocol operation.
///
/// During `Priming`, only `extend_lease` is accepted and queued until
/// priming completes — the concrete set has no stable identity to retarget
/// an `extend_ticket` or `close` against until the join/prime handshake
/// finishes, so those two are instead recorded as a deferred intent and
/// re-issued once the reservation reaches `Active`/`ActiveTicketed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pending {
    None,
    Ticketing,
    ExtendingTicket,
    Redeeming,
    ExtendingLease,
    Priming,
    Closing,
    Blocked,
}

/// Progress of the concrete-resource bring-up sub-protocol. Only the engine
/// owning the concrete set advances this; the peer observes it via protocol
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinState {
    NoJoin,
    Setup,
    Probe,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationCategory {
    Client,
    Broker,
    Authority,
    Controller,
}

/// A deferred operation recorded while the reservation is `Priming`,
/// re-issued once priming completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredIntent {
    ExtendTicket,
    Close,
}
