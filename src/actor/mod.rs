pub mod bridge;
pub mod event_processor;
pub mod messages;

pub use bridge::KernelTickHandle;
pub use event_processor::ActorKernel;
pub use messages::{ApiRequest, ApiResponse, InterActorMsg, PeerReplyKind, TickMsg};
