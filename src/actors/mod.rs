pub mod authority;
pub mod broker;
pub mod controller;

pub use authority::spawn_authority;
pub use broker::{spawn_broker, spawn_broker_with_plugin};
pub use controller::spawn_controller;
