use crate::actor::{self, Actor, ActorHandle, Reserved};
use crate::system::{ActorSystem, ShutdownHandle};
use anyhow::Result;

/// Wires actors together: reserves mailboxes and starts every task under one
/// shutdown signal.
pub struct Builder {
    sys: ActorSystem,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            sys: ActorSystem::new(),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.sys.shutdown_handle()
    }

    /// Reserve a named mailbox so its `Addr` can be handed out before start.
    pub fn reserve<A: Actor>(&mut self, name: &str, mailbox: usize) -> Reserved<A> {
        actor::reserve::<A>(name, mailbox)
    }

    /// Start a previously reserved actor and track its task.
    pub fn start_reserved<A>(&mut self, r: Reserved<A>, actor: A) -> &mut Self
    where
        A: Actor,
    {
        let name = r.name().to_string();
        let h: ActorHandle<A> = r.start_with_shutdown(actor, self.sys.shutdown_handle());
        tracing::debug!(actor = %name, "builder.started");
        self.sys.track(name, async move { h.task.await? });
        self
    }

    pub async fn graceful_shutdown(self) -> Result<()> {
        self.sys.graceful_shutdown().await
    }

    /// Block until CTRL-C or a shutdown signal, then shut everything down.
    pub async fn run_until_ctrl_c(self) -> Result<()> {
        let shutdown = self.sys.shutdown_handle();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("builder.ctrl_c");
            }
            _ = shutdown.wait() => {}
        }
        self.graceful_shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Context;
    use tokio::sync::oneshot;

    struct Greeter;

    #[async_trait::async_trait]
    impl Actor for Greeter {
        type Msg = oneshot::Sender<&'static str>;

        async fn handle(&mut self, reply: Self::Msg, _ctx: &mut Context<Self>) -> Result<()> {
            let _ = reply.send("hello");
            Ok(())
        }
    }

    #[tokio::test]
    async fn reserved_addr_works_once_started() {
        let mut b = Builder::new();
        let r = b.reserve::<Greeter>("greeter", 4);
        let addr = r.addr();
        b.start_reserved(r, Greeter);

        let (tx, rx) = oneshot::channel();
        addr.send(tx).await.ok();
        assert_eq!(rx.await.unwrap(), "hello");

        drop(addr);
        b.graceful_shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_handle_ends_run_loop() {
        let mut b = Builder::new();
        let r = b.reserve::<Greeter>("greeter", 4);
        b.start_reserved(r, Greeter);
        let handle = b.shutdown_handle();
        let run = tokio::spawn(b.run_until_ctrl_c());
        tokio::task::yield_now().await;
        handle.signal();
        run.await.unwrap().unwrap();
    }
}
