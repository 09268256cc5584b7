//! Interactive subscription bot: token routing, conversation flow and the
//! supervised receive loop.

pub mod conversation;
pub mod handler;
pub mod router;
pub mod supervisor;
pub mod views;

pub use conversation::{Conversation, RenderedReply, UserContext};
pub use handler::UpdateHandler;
pub use router::{decode, CallbackRouter, DecodedAction};
pub use supervisor::{BotSupervisor, SupervisorConfig};
pub use views::View;
