//! FAQ matching and the wood-material catalog.
//!
//! - [`preprocess`] and [`calculate_similarity`] score a user question against
//!   a stored FAQ question.
//! - [`best_answer`] picks the answer of the best-scoring entry.
//! - [`load_faqs`] reads FAQ files from a directory, falling back to
//!   [`default_faqs`].
//! - [`catalog`] holds static material data and the HTML fragments the chat
//!   surface shows for comparisons and contact details.
//!
//! ```
//! use woodchat_faq::{best_answer, default_faqs};
//!
//! let faqs = default_faqs();
//! let (answer, confidence) = best_answer("what is mdf", &faqs);
//! assert!(answer.starts_with("Medium Density Fiberboard"));
//! assert!(confidence > 0.3);
//! ```
pub mod catalog;
mod defaults;
mod loader;
mod matcher;
mod preprocess;
mod similarity;

pub use defaults::default_faqs;
pub use loader::{FaqLoadError, load_faqs, read_faq_file};
pub use matcher::{EMPTY_QUESTION_ANSWER, NO_DATA_ANSWER, best_answer};
pub use preprocess::{STOP_WORDS, preprocess};
pub use similarity::{MATERIAL_KEYWORDS, calculate_similarity, sequence_ratio};
