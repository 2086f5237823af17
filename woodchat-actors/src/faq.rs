use crate::actor::{Actor, Addr, Context, Unreachable};
use crate::store::{self, StoreActor};
use crate::{AskError, FaqMsg, StoreMsg};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use woodchat_common::{
    AskBackend, AskResponse, BackendError, ChatLogEntry, CONTACT_FALLBACK_ANSWER,
};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Answers questions from the stored FAQ set and logs every exchange.
pub struct FaqActor {
    store: Addr<StoreActor>,
    data_dir: PathBuf,
    threshold: f64,
}

impl FaqActor {
    pub fn new(store: Addr<StoreActor>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            data_dir: data_dir.into(),
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

#[async_trait]
impl Actor for FaqActor {
    type Msg = FaqMsg;

    async fn handle(&mut self, msg: Self::Msg, _ctx: &mut Context<Self>) -> Result<()> {
        match msg {
            FaqMsg::Ask { question, reply } => {
                let store = self.store.clone();
                let threshold = self.threshold;
                tokio::spawn(async move {
                    let res = answer(&store, &question, threshold).await;
                    if reply.send(res).is_err() {
                        debug!("faq.ask.reply_dropped");
                    }
                });
            }
            FaqMsg::Reload { reply } => {
                let store = self.store.clone();
                let dir = self.data_dir.clone();
                tokio::spawn(async move {
                    let res = reload(&store, dir).await;
                    if reply.send(res).is_err() {
                        debug!("faq.reload.reply_dropped");
                    }
                });
            }
        }
        Ok(())
    }
}

async fn answer(
    store: &Addr<StoreActor>,
    question: &str,
    threshold: f64,
) -> Result<AskResponse, AskError> {
    if question.trim().is_empty() {
        return Err(AskError::EmptyQuestion);
    }

    let faqs = store::request(store, |reply| StoreMsg::ListFaqs { reply })
        .await
        .map_err(|e| AskError::Store(e.to_string()))?;
    let (best, confidence) = woodchat_faq::best_answer(question, &faqs);

    let entry = ChatLogEntry {
        user_question: question.to_string(),
        bot_answer: best.clone(),
        confidence_score: confidence,
        timestamp: Utc::now(),
    };
    if store.send(StoreMsg::LogChat(entry)).await.is_err() {
        warn!("faq.ask.log_dropped");
    }

    let confident = !best.is_empty() && confidence > threshold;
    info!(confidence, confident, faqs = faqs.len(), "faq.ask");
    Ok(AskResponse {
        answer: if confident {
            best
        } else {
            CONTACT_FALLBACK_ANSWER.to_string()
        },
        confidence,
    })
}

async fn reload(store: &Addr<StoreActor>, dir: PathBuf) -> Result<usize, AskError> {
    let faqs = tokio::task::spawn_blocking(move || woodchat_faq::load_faqs(&dir))
        .await
        .map_err(|e| AskError::Store(format!("loader task failed: {e}")))?;
    let count = faqs.len();
    store::request(store, |reply| StoreMsg::ReplaceFaqs { faqs, reply })
        .await
        .map_err(|e| AskError::Store(e.to_string()))?;
    info!(count, "faq.reload");
    Ok(count)
}

fn unreachable(e: Unreachable) -> AskError {
    match e {
        Unreachable::MailboxClosed => AskError::Unavailable("faq mailbox closed"),
        Unreachable::ReplyDropped => AskError::Unavailable("faq actor dropped the reply"),
    }
}

/// Ask the FAQ actor a question and wait for the answer.
pub async fn ask(addr: &Addr<FaqActor>, question: &str) -> Result<AskResponse, AskError> {
    addr.request(|reply| FaqMsg::Ask {
        question: question.to_string(),
        reply,
    })
    .await
    .map_err(unreachable)?
}

/// Reload FAQ files through the actor; returns the number of entries stored.
pub async fn reload_data(addr: &Addr<FaqActor>) -> Result<usize, AskError> {
    addr.request(|reply| FaqMsg::Reload { reply })
        .await
        .map_err(unreachable)?
}

#[async_trait]
impl AskBackend for Addr<FaqActor> {
    async fn ask(&self, question: &str) -> std::result::Result<AskResponse, BackendError> {
        crate::faq::ask(self, question).await.map_err(|e| match e {
            AskError::Unavailable(why) => BackendError::Unavailable(why.to_string()),
            other => BackendError::Service(other.to_string()),
        })
    }

    fn describe(&self) -> &str {
        "local faq actor"
    }
}
