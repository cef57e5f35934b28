use async_trait::async_trait;

use crate::error::Result;
use crate::id::{ActorId, ReservationId, SliceId};
use crate::reservation::Reservation;
use crate::slice::Slice;

/// Opaque persistence seam. Writes are per-reservation; batched writes are
/// not required. Recovery replays everything this trait can list back into
/// the owning actor's calendars via `revisit`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn put_reservation(&self, reservation: Reservation) -> Result<()>;
    async fn get_reservation(&self, id: ReservationId) -> Result<Option<Reservation>>;
    async fn list_reservations(&self, slice: Option<SliceId>) -> Result<Vec<Reservation>>;
    async fn put_slice(&self, slice: Slice) -> Result<()>;
    async fn get_slice(&self, id: SliceId) -> Result<Option<Slice>>;
    async fn put_broker(&self, broker: ActorId) -> Result<()>;
    async fn get_brokers(&self) -> Result<Vec<ActorId>>;
}
