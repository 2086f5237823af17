//! Incremental, markup-preserving text reveal for chat bubbles.
//!
//! A bot [`Message`] is either plain text with a tiny markup dialect
//! (`**strong**`, newline breaks) or an opaque prebuilt fragment. Plain text
//! is translated to tags, split into text and tag tokens, and revealed one
//! character per step while every tag is re-inserted at the plain-text
//! offset it originally occupied.
//!
//! ```
//! use woodchat_render::{Message, MarkupBuffer, RenderOutcome, RenderToken, Renderer, TypingDelays};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let buffer = MarkupBuffer::new();
//!     let mut sink = buffer.sink();
//!     let renderer = Renderer::new(TypingDelays::instant());
//!     let mut spoken = None;
//!     let outcome = renderer
//!         .render(
//!             &Message::plain("Hi **there**"),
//!             &mut sink,
//!             &RenderToken::detached(),
//!             |text| spoken = Some(text),
//!         )
//!         .await;
//!
//!     assert_eq!(outcome, RenderOutcome::Completed { steps: 8 });
//!     assert_eq!(buffer.snapshot(), "Hi <strong>there</strong>");
//!     assert_eq!(spoken.as_deref(), Some("Hi there"));
//! });
//! ```
pub mod markup;
pub mod message;
pub mod placement;
pub mod renderer;
pub mod reveal;
pub mod session;
pub mod sink;

pub use message::Message;
pub use placement::{PlacedTag, TagPlacementTable};
pub use renderer::{RenderOutcome, Renderer, TypingDelays};
pub use reveal::{Reveal, Step};
pub use session::{RenderSessions, RenderToken};
pub use sink::{BufferSink, MarkupBuffer, SinkError, TextSink};
