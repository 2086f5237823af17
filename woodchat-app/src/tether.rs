use crate::terminal::TerminalSink;
use anyhow::{Context as _, Result};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use woodchat_actors::{
    StoreMsg,
    actor::Addr,
    builder::Builder,
    faq::FaqActor,
    store::{self, StoreActor, init_schema},
};
use woodchat_common::AskBackend;
use woodchat_config::WoodchatConfig;
use woodchat_http::ChatApi;
use woodchat_render::{RenderToken, Renderer, TypingDelays};
use woodchat_server::AppState;
use woodchat_tui::{
    CommandSpeaker, NullSpeaker, Speaker, TuiActor, compose_reply, spawn_tui_feeders,
};

const DEFAULT_MAILBOX: usize = 1024;
const TUI_MAILBOX: usize = 256;

pub struct Tether {
    builder: Builder,
}

impl Tether {
    pub fn new() -> Self {
        Self {
            builder: Builder::new(),
        }
    }

    pub fn builder_mut(&mut self) -> &mut Builder {
        &mut self.builder
    }

    pub async fn run(self) -> Result<()> {
        self.builder.run_until_ctrl_c().await
    }

    pub async fn shutdown(self) -> Result<()> {
        self.builder.graceful_shutdown().await
    }
}

async fn open_pool(url: &str) -> Result<SqlitePool> {
    // Every in-memory connection is its own database.
    let max = if url.contains(":memory:") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max)
        .connect(url)
        .await
        .with_context(|| format!("failed to open database '{url}'"))?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Start the store and FAQ actors, seeding the FAQ table on first run.
pub async fn start_local(t: &mut Tether, cfg: &WoodchatConfig) -> Result<Addr<FaqActor>> {
    let pool = open_pool(&cfg.database.url).await?;
    let b = t.builder_mut();

    let r_store = b.reserve::<StoreActor>("store", DEFAULT_MAILBOX);
    let r_faq = b.reserve::<FaqActor>("faq", DEFAULT_MAILBOX);
    let store_addr = r_store.addr();
    let faq_addr = r_faq.addr();

    b.start_reserved(r_store, StoreActor::new(pool));

    let dir = cfg.faq.data_dir.clone();
    let faqs = tokio::task::spawn_blocking(move || woodchat_faq::load_faqs(&dir))
        .await
        .context("faq loader task failed")?;
    let seeded =
        store::request(&store_addr, |reply| StoreMsg::SeedIfEmpty { faqs, reply }).await?;
    if seeded > 0 {
        info!(count = seeded, "tether.seeded_faqs");
    }

    b.start_reserved(
        r_faq,
        FaqActor::new(store_addr, cfg.faq.data_dir.clone())
            .with_threshold(cfg.faq.confidence_threshold),
    );
    Ok(faq_addr)
}

async fn backend(
    t: &mut Tether,
    cfg: &WoodchatConfig,
    remote: Option<String>,
) -> Result<Arc<dyn AskBackend>> {
    let backend: Arc<dyn AskBackend> = match remote {
        Some(url) => Arc::new(ChatApi::new(&url)?),
        None => Arc::new(start_local(t, cfg).await?),
    };
    Ok(backend)
}

fn speaker(cfg: &WoodchatConfig) -> Arc<dyn Speaker> {
    match (&cfg.speech.command, cfg.speech.enabled) {
        (Some(program), true) => Arc::new(CommandSpeaker::new(
            program.clone(),
            cfg.speech.args.clone(),
        )),
        (None, true) => {
            warn!("speech enabled without a command; staying silent");
            Arc::new(NullSpeaker)
        }
        _ => Arc::new(NullSpeaker),
    }
}

fn renderer(cfg: &WoodchatConfig) -> Renderer {
    Renderer::new(TypingDelays::from_millis(
        cfg.typing.start_delay_ms,
        cfg.typing.base_delay_ms,
        cfg.typing.jitter_ms,
    ))
}

/// Serve the chat API until CTRL-C.
pub async fn serve(cfg: WoodchatConfig, bind: Option<String>) -> Result<()> {
    let mut tether = Tether::new();
    let faq = start_local(&mut tether, &cfg).await?;

    let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    let stop = tether.builder_mut().shutdown_handle();
    let server = tokio::spawn(woodchat_server::serve(
        listener,
        AppState::new(faq),
        async move { stop.wait().await },
    ));

    tether.run().await?;
    server.await.context("server task panicked")?
}

/// Interactive terminal chat, against the local actors or a remote API.
pub async fn chat(cfg: WoodchatConfig, remote: Option<String>) -> Result<()> {
    let mut tether = Tether::new();
    let backend = backend(&mut tether, &cfg, remote).await?;
    let speaker = speaker(&cfg);
    let renderer = renderer(&cfg);

    // TUI last: it takes over the terminal.
    let b = tether.builder_mut();
    let shutdown = b.shutdown_handle();
    let r_tui = b.reserve::<TuiActor>("tui:main", TUI_MAILBOX);
    let tui_addr = r_tui.addr();
    b.start_reserved(
        r_tui,
        TuiActor::new(backend, renderer, speaker, shutdown.clone())?,
    );
    spawn_tui_feeders(tui_addr, shutdown);

    tether.run().await
}

/// Answer one question on stdout with the typing effect.
pub async fn ask(cfg: WoodchatConfig, question: String, remote: Option<String>) -> Result<()> {
    let mut tether = Tether::new();
    let backend = backend(&mut tether, &cfg, remote).await?;

    let message = compose_reply(backend.as_ref(), &question).await;
    let mut sink = TerminalSink::new(io::stdout());
    renderer(&cfg)
        .render(&message, &mut sink, &RenderToken::detached(), |_| {})
        .await;
    sink.finish()?;

    drop(backend);
    tether.shutdown().await
}

/// Ask a running server to reload its FAQ files. Returns whether it succeeded.
pub async fn reload(cfg: WoodchatConfig, server: Option<String>) -> Result<bool> {
    let url = server.unwrap_or_else(|| cfg.server.base_url.clone());
    let api = ChatApi::new(&url)?;
    match api.reload().await {
        Ok(resp) if resp.success => {
            println!(
                "Data reloaded successfully: {}",
                resp.message.unwrap_or_default()
            );
            Ok(true)
        }
        Ok(resp) => {
            eprintln!(
                "Error reloading data: {}",
                resp.error.or(resp.details).unwrap_or_default()
            );
            Ok(false)
        }
        Err(err) => {
            eprintln!("Error reloading data: {err}");
            Ok(false)
        }
    }
}
