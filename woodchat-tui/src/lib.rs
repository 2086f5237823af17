//! Terminal chat panel for the Tesa Assistant.
//!
//! The panel state lives in [`ChatSession`]; [`TuiActor`] owns the terminal,
//! turns keys into session changes and spawns one render per bot bubble.
mod command;
mod feeders;
mod input;
pub mod reply;
pub mod session;
pub mod speech;
mod styles;
pub mod transcript;
mod tui;
mod view;

pub use feeders::spawn_tui_feeders;
pub use reply::compose_reply;
pub use session::ChatSession;
pub use speech::{CommandSpeaker, NullSpeaker, Speaker};
pub use tui::{TuiActor, TuiMsg};
