use actix::prelude::Message;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::Result;
use crate::id::{ActorId, ReservationId, SliceId};
use crate::reservation::{JoinState, Reservation};
use crate::resource::ResourceSet;
use crate::slice::Slice;
use crate::term::Term;

/// One TickEvent per delivered cycle. Fire-and-send from the tick service's
/// `Tickable::external_tick` callback into the owning actor's mailbox —
/// the mailbox itself is the FIFO queue the serialization kernel promises.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct TickMsg {
    pub cycle: i64,
}

/// The peer-protocol reply kinds the state machine reacts to. Each variant
/// corresponds to one row of the transition table driven by a protocol
/// callback rather than a local API call or a tick.
#[derive(Debug, Clone)]
pub enum PeerReplyKind {
    TicketReply { ok: bool, resources: Option<ResourceSet>, term: Option<Term> },
    ExtendTicketReply { ok: bool, term: Option<Term> },
    RedeemReply { ok: bool },
    PrimeProgress { join_state: JoinState },
    ExtendLeaseReply { ok: bool, term: Option<Term> },
    CloseDone,
}

/// A typed message from a peer proxy, addressed to one reservation.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<()>")]
pub struct InterActorMsg {
    pub reservation_id: ReservationId,
    pub kind: PeerReplyKind,
}

/// The transport-agnostic inbound actor API (spec §6), carried as a single
/// sync management message so the engine has exactly one entry point that
/// is guaranteed to execute on the kernel's own task, in FIFO order with
/// every tick and every peer reply.
#[derive(Debug, Clone)]
pub enum ApiRequest {
    AddReservation(Reservation),
    Demand(ReservationId),
    ExtendEndTime { id: ReservationId, new_end: DateTime<Utc>, request_properties: HashMap<String, String>, config_properties: HashMap<String, String> },
    Close(ReservationId),
    GetSlices,
    GetReservations { slice: Option<SliceId> },
    ClaimResources { broker: ActorId, reservation: ReservationId },
}

#[derive(Debug, Clone)]
pub enum ApiResponse {
    AssignedId(ReservationId),
    Ack,
    Slices(Vec<Slice>),
    Reservations(Vec<Reservation>),
    Reservation(Reservation),
}

impl Message for ApiRequest {
    type Result = Result<ApiResponse>;
}
