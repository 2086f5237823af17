//! Actor runtime plus the two service actors behind the chat API.
//!
//! - [`store::StoreActor`] owns the SQLite pool (FAQ table and chat log).
//! - [`faq::FaqActor`] answers questions against the stored FAQs and reloads
//!   them from data files.
pub mod actor;
pub mod builder;
pub mod faq;
pub mod store;
pub mod system;

use anyhow::Result;
use tokio::sync::oneshot;
use woodchat_common::{AskResponse, ChatLogEntry, FaqEntry};

pub enum StoreMsg {
    CountFaqs {
        reply: oneshot::Sender<Result<i64>>,
    },
    /// All FAQ rows in insertion order.
    ListFaqs {
        reply: oneshot::Sender<Result<Vec<FaqEntry>>>,
    },
    /// Insert `faqs` only if the table is empty; replies with the number inserted.
    SeedIfEmpty {
        faqs: Vec<FaqEntry>,
        reply: oneshot::Sender<Result<u64>>,
    },
    /// Swap the whole table for `faqs` in one transaction.
    ReplaceFaqs {
        faqs: Vec<FaqEntry>,
        reply: oneshot::Sender<Result<u64>>,
    },
    LogChat(ChatLogEntry),
    /// Newest first.
    RecentChats {
        limit: i64,
        reply: oneshot::Sender<Result<Vec<ChatLogEntry>>>,
    },
}

pub enum FaqMsg {
    Ask {
        question: String,
        reply: oneshot::Sender<std::result::Result<AskResponse, AskError>>,
    },
    /// Reload FAQ data files and replace the stored set; replies with the new count.
    Reload {
        reply: oneshot::Sender<std::result::Result<usize, AskError>>,
    },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AskError {
    #[error("No question provided")]
    EmptyQuestion,

    #[error("storage failure: {0}")]
    Store(String),

    #[error("actor unavailable: {0}")]
    Unavailable(&'static str),
}
