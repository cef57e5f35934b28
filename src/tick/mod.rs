pub mod service;
pub mod tickable;

pub use service::TickService;
pub use tickable::Tickable;
