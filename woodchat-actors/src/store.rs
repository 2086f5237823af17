//! SQLite-backed persistence actor for FAQ entries and the chat log.
//!
//! Every request takes a one-permit semaphore in mailbox order, so a read
//! queued after a write observes it. The SQL itself runs in spawned tasks and
//! answers through oneshot replies.
use crate::actor::{Actor, Addr, Context};
use crate::StoreMsg;
use anyhow::{anyhow, Result};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use tokio::sync::{oneshot, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info};
use woodchat_common::{ChatLogEntry, FaqEntry};

pub struct StoreActor {
    pool: SqlitePool,
    turn: Arc<Semaphore>,
}

impl StoreActor {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            turn: Arc::new(Semaphore::new(1)),
        }
    }

    async fn take_turn(&self) -> Result<OwnedSemaphorePermit> {
        Ok(self.turn.clone().acquire_owned().await?)
    }
}

#[async_trait::async_trait]
impl Actor for StoreActor {
    type Msg = StoreMsg;

    async fn handle(&mut self, msg: Self::Msg, _ctx: &mut Context<Self>) -> Result<()> {
        let pool = self.pool.clone();
        match msg {
            StoreMsg::CountFaqs { reply } => {
                let permit = self.take_turn().await?;
                tokio::spawn(async move {
                    let res = count_faqs(&pool).await;
                    drop(permit);
                    if reply.send(res).is_err() {
                        debug!("store.count_faqs.reply_dropped");
                    }
                });
            }
            StoreMsg::ListFaqs { reply } => {
                let permit = self.take_turn().await?;
                tokio::spawn(async move {
                    let res = list_faqs(&pool).await;
                    drop(permit);
                    if reply.send(res).is_err() {
                        debug!("store.list_faqs.reply_dropped");
                    }
                });
            }
            StoreMsg::SeedIfEmpty { faqs, reply } => {
                let permit = self.take_turn().await?;
                tokio::spawn(async move {
                    let res = seed_if_empty(&pool, &faqs).await;
                    drop(permit);
                    if reply.send(res).is_err() {
                        debug!("store.seed.reply_dropped");
                    }
                });
            }
            StoreMsg::ReplaceFaqs { faqs, reply } => {
                let permit = self.take_turn().await?;
                tokio::spawn(async move {
                    let res = replace_faqs(&pool, &faqs).await;
                    drop(permit);
                    if reply.send(res).is_err() {
                        debug!("store.replace_faqs.reply_dropped");
                    }
                });
            }
            StoreMsg::LogChat(entry) => {
                let permit = self.take_turn().await?;
                tokio::spawn(async move {
                    if let Err(err) = insert_chat_log(&pool, &entry).await {
                        error!(error = ?err, "store.log_chat.failed");
                    }
                    drop(permit);
                });
            }
            StoreMsg::RecentChats { limit, reply } => {
                let permit = self.take_turn().await?;
                tokio::spawn(async move {
                    let res = recent_chats(&pool, limit).await;
                    drop(permit);
                    if reply.send(res).is_err() {
                        debug!("store.recent_chats.reply_dropped");
                    }
                });
            }
        }
        Ok(())
    }

    async fn stopped(&mut self) {
        // Let the last queued write finish before the pool goes away.
        let _ = self.turn.acquire().await;
        self.pool.close().await;
        info!("store.closed");
    }
}

/// Send a request built by `build` and wait for the store's reply.
///
/// ```no_run
/// # use woodchat_actors::{actor::Addr, store::{self, StoreActor}, StoreMsg};
/// # async fn demo(store: Addr<StoreActor>) -> anyhow::Result<()> {
/// let faqs = store::request(&store, |reply| StoreMsg::ListFaqs { reply }).await?;
/// println!("{} FAQ entries", faqs.len());
/// # Ok(())
/// # }
/// ```
pub async fn request<T>(
    store: &Addr<StoreActor>,
    build: impl FnOnce(oneshot::Sender<Result<T>>) -> StoreMsg,
) -> Result<T> {
    store
        .request(build)
        .await
        .map_err(|e| anyhow!("store unreachable: {e}"))?
}

/// Create the `faq` and `chat_log` tables if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS faq (
             id       INTEGER PRIMARY KEY AUTOINCREMENT,
             question TEXT NOT NULL,
             answer   TEXT NOT NULL,
             material TEXT,
             category TEXT
           )"#,
    )
    .execute(pool)
    .await?;
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS chat_log (
             id               INTEGER PRIMARY KEY AUTOINCREMENT,
             user_question    TEXT NOT NULL,
             bot_answer       TEXT NOT NULL,
             confidence_score REAL NOT NULL,
             timestamp        TEXT NOT NULL
           )"#,
    )
    .execute(pool)
    .await?;
    info!("store.schema_ready");
    Ok(())
}

pub async fn count_faqs(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM faq")
        .fetch_one(pool)
        .await?;
    Ok(row.try_get::<i64, _>("n")?)
}

pub async fn list_faqs(pool: &SqlitePool) -> Result<Vec<FaqEntry>> {
    let rows = sqlx::query(
        r#"SELECT question, answer, material, category
           FROM faq ORDER BY id ASC"#,
    )
    .fetch_all(pool)
    .await?;
    debug!(rows = rows.len(), "store.list_faqs");

    rows.into_iter()
        .map(|r| {
            Ok(FaqEntry {
                question: r.try_get("question")?,
                answer: r.try_get("answer")?,
                material: r.try_get("material")?,
                category: r.try_get("category")?,
            })
        })
        .collect()
}

async fn insert_faqs(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    faqs: &[FaqEntry],
) -> Result<u64> {
    let mut written = 0u64;
    for faq in faqs {
        let res = sqlx::query(
            r#"INSERT INTO faq (question, answer, material, category)
               VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(faq.question.as_str())
        .bind(faq.answer.as_str())
        .bind(faq.material.as_deref())
        .bind(faq.category.as_deref())
        .execute(&mut **tx)
        .await?;
        written += res.rows_affected();
    }
    Ok(written)
}

async fn seed_if_empty(pool: &SqlitePool, faqs: &[FaqEntry]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let existing: i64 = sqlx::query("SELECT COUNT(*) AS n FROM faq")
        .fetch_one(&mut *tx)
        .await?
        .try_get("n")?;
    if existing > 0 {
        info!(existing, "store.seed.skipped");
        return Ok(0);
    }
    let written = insert_faqs(&mut tx, faqs).await?;
    tx.commit().await?;
    info!(rows = written, "store.seed");
    Ok(written)
}

async fn replace_faqs(pool: &SqlitePool, faqs: &[FaqEntry]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let removed = sqlx::query("DELETE FROM faq")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let written = insert_faqs(&mut tx, faqs).await?;
    tx.commit().await?;
    info!(removed, rows = written, "store.replace_faqs");
    Ok(written)
}

async fn insert_chat_log(pool: &SqlitePool, entry: &ChatLogEntry) -> Result<()> {
    sqlx::query(
        r#"INSERT INTO chat_log (user_question, bot_answer, confidence_score, timestamp)
           VALUES (?1, ?2, ?3, ?4)"#,
    )
    .bind(entry.user_question.as_str())
    .bind(entry.bot_answer.as_str())
    .bind(entry.confidence_score)
    .bind(entry.timestamp)
    .execute(pool)
    .await?;
    debug!(confidence = entry.confidence_score, "store.log_chat");
    Ok(())
}

async fn recent_chats(pool: &SqlitePool, limit: i64) -> Result<Vec<ChatLogEntry>> {
    let rows = sqlx::query(
        r#"SELECT user_question, bot_answer, confidence_score, timestamp
           FROM chat_log ORDER BY id DESC LIMIT ?"#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            Ok(ChatLogEntry {
                user_question: r.try_get("user_question")?,
                bot_answer: r.try_get("bot_answer")?,
                confidence_score: r.try_get("confidence_score")?,
                timestamp: r.try_get("timestamp")?,
            })
        })
        .collect()
}
