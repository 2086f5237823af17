//! HTTP API in front of the FAQ actor.
//!
//! | route                    | reply                                   |
//! |--------------------------|-----------------------------------------|
//! | `POST /api/ask`          | [`AskResponse`] or an [`ErrorBody`]     |
//! | `GET /admin/reload_data` | [`ReloadResponse`]                      |
//! | `GET /healthz`           | `{"status":"ok"}`                       |
use anyhow::Result;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use woodchat_actors::actor::Addr;
use woodchat_actors::faq::FaqActor;

mod routes;

pub use routes::ApiError;
#[doc(no_inline)]
pub use woodchat_common::{AskResponse, ErrorBody, ReloadResponse};

/// Shared state handed to every handler.
pub struct AppState {
    pub faq: Addr<FaqActor>,
}

impl AppState {
    pub fn new(faq: Addr<FaqActor>) -> Self {
        Self { faq }
    }
}

/// All routes with request tracing attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::ask_routes())
        .merge(routes::admin_routes())
        .merge(routes::health_routes())
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

/// Serve on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "server.listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server.stopped");
    Ok(())
}
