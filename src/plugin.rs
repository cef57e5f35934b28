use async_trait::async_trait;

use crate::error::Result;
use crate::reservation::Reservation;
use crate::resource::ConcreteSet;

/// The narrow interface to concrete-resource setup/probe/close: the
/// outward-facing half of the Priming/join sub-protocol. Only the actor
/// owning a reservation's concrete set calls this; the peer side observes
/// progress purely through protocol replies.
///
/// Kept as its own seam (distinct from `persistence::Store`) because the two
/// vary independently: a broker plugin never touches concrete resources, an
/// authority plugin touches both.
#[async_trait]
pub trait Plugin: Send + Sync {
    async fn setup(&self, reservation: &Reservation) -> Result<()>;
    async fn probe(&self, reservation: &Reservation) -> Result<bool>;
    async fn close(&self, reservation: &Reservation) -> Result<()>;
    async fn redeem(&self, reservation: &Reservation) -> Result<ConcreteSet>;
}

/// A no-op plugin for controller-role actors (which never own concrete
/// resources) and for tests.
pub struct NullPlugin;

#[async_trait]
impl Plugin for NullPlugin {
    async fn setup(&self, _reservation: &Reservation) -> Result<()> {
        Ok(())
    }

    async fn probe(&self, _reservation: &Reservation) -> Result<bool> {
        Ok(true)
    }

    async fn close(&self, _reservation: &Reservation) -> Result<()> {
        Ok(())
    }

    async fn redeem(&self, reservation: &Reservation) -> Result<ConcreteSet> {
        Ok(ConcreteSet::new(serde_json::json!({ "reservation": reservation.id.to_string() })))
    }
}
