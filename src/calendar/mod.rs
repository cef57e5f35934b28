pub mod authority;
pub mod base;
pub mod broker;
pub mod client;
pub mod reservation_holdings;
pub mod reservation_list;
pub mod source;

pub use authority::AuthorityCalendar;
pub use base::BaseCalendar;
pub use broker::BrokerCalendar;
pub use client::ClientCalendar;
pub use reservation_holdings::ReservationHoldings;
pub use reservation_list::ReservationList;
pub use source::SourceCalendar;
