pub mod predecessor;
pub mod reservation;
pub mod state;

pub use predecessor::PredecessorState;
pub use reservation::Reservation;
pub use state::{DeferredIntent, JoinState, Pending, ReservationCategory, ReservationState};
