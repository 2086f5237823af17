//! Mailbox actors on tokio tasks.
//!
//! An actor owns its state and handles one message at a time. An [`Addr`] is
//! a bounded sender; the actor's own [`Context`] only keeps a weak one, so
//! the loop ends once the last outside `Addr` is dropped.
use crate::system::ShutdownHandle;
use anyhow::Result;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

#[async_trait::async_trait]
pub trait Actor: Send + Sized + 'static {
    type Msg: Send + 'static;

    /// Handle one message. An `Err` stops the actor and becomes its task result.
    async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()>;

    /// Runs once after the loop ends, unless a handler failed.
    async fn stopped(&mut self) {}
}

pub struct Context<A: Actor> {
    addr: mpsc::WeakSender<A::Msg>,
    stop_requested: bool,
}

impl<A: Actor> Context<A> {
    /// This actor's `Addr`, while anyone else still holds one.
    pub fn addr(&self) -> Option<Addr<A>> {
        self.addr.upgrade().map(Addr)
    }

    /// Stop after the current message.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }
}

/// Why a request could not be answered.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unreachable {
    #[error("mailbox closed")]
    MailboxClosed,
    #[error("reply dropped")]
    ReplyDropped,
}

pub struct Addr<A: Actor>(mpsc::Sender<A::Msg>);

impl<A: Actor> Clone for Addr<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Actor> Addr<A> {
    /// Waits for mailbox space. Hands the message back if the actor is gone.
    pub async fn send(&self, msg: A::Msg) -> std::result::Result<(), A::Msg> {
        self.0.send(msg).await.map_err(|e| e.0)
    }

    /// Hands the message back if the mailbox is full or closed.
    pub fn try_send(&self, msg: A::Msg) -> std::result::Result<(), A::Msg> {
        self.0.try_send(msg).map_err(|e| e.into_inner())
    }

    /// Send a message carrying a reply slot and wait for the answer.
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use async_trait::async_trait;
    /// # use tokio::sync::oneshot;
    /// # use woodchat_actors::actor::{self, Actor, Context};
    /// struct Counter(u32);
    ///
    /// #[async_trait]
    /// impl Actor for Counter {
    ///     type Msg = oneshot::Sender<u32>;
    ///     async fn handle(&mut self, reply: Self::Msg, _ctx: &mut Context<Self>) -> Result<()> {
    ///         self.0 += 1;
    ///         let _ = reply.send(self.0);
    ///         Ok(())
    ///     }
    /// }
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let handle = actor::spawn_actor(Counter(0), 4);
    /// assert_eq!(handle.addr.request(|reply| reply).await, Ok(1));
    /// assert_eq!(handle.addr.request(|reply| reply).await, Ok(2));
    /// # });
    /// ```
    pub async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> A::Msg,
    ) -> std::result::Result<T, Unreachable> {
        let (tx, rx) = oneshot::channel();
        self.0
            .send(build(tx))
            .await
            .map_err(|_| Unreachable::MailboxClosed)?;
        rx.await.map_err(|_| Unreachable::ReplyDropped)
    }

    pub fn capacity(&self) -> usize {
        self.0.max_capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

pub struct ActorHandle<A: Actor> {
    pub addr: Addr<A>,
    pub task: JoinHandle<Result<()>>,
}

/// Spawn an unnamed actor with no shutdown signal; it runs until its
/// addresses are dropped, it calls [`Context::stop`] or a handler fails.
pub fn spawn_actor<A: Actor>(actor: A, capacity: usize) -> ActorHandle<A> {
    reserve::<A>("anonymous", capacity).start(actor)
}

/// A mailbox whose address can be handed out before the actor exists.
pub struct Reserved<A: Actor> {
    name: String,
    addr: Addr<A>,
    rx: mpsc::Receiver<A::Msg>,
}

pub fn reserve<A: Actor>(name: impl Into<String>, capacity: usize) -> Reserved<A> {
    let (tx, rx) = mpsc::channel::<A::Msg>(capacity);
    Reserved {
        name: name.into(),
        addr: Addr(tx),
        rx,
    }
}

impl<A: Actor> Reserved<A> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn addr(&self) -> Addr<A> {
        self.addr.clone()
    }

    pub fn start(self, actor: A) -> ActorHandle<A> {
        self.launch(actor, None)
    }

    /// Start the actor; it also stops when `shutdown` fires.
    pub fn start_with_shutdown(self, actor: A, shutdown: ShutdownHandle) -> ActorHandle<A> {
        self.launch(actor, Some(shutdown))
    }

    fn launch(self, actor: A, shutdown: Option<ShutdownHandle>) -> ActorHandle<A> {
        let Reserved { name, addr, rx } = self;
        let ctx = Context {
            addr: addr.0.downgrade(),
            stop_requested: false,
        };
        let task = tokio::spawn(drive(name, actor, ctx, rx, shutdown));
        ActorHandle { addr, task }
    }
}

#[derive(Debug, Clone, Copy)]
enum Exit {
    Drained,
    Requested,
    Shutdown,
}

impl Exit {
    fn as_str(self) -> &'static str {
        match self {
            Exit::Drained => "drained",
            Exit::Requested => "requested",
            Exit::Shutdown => "shutdown",
        }
    }
}

async fn drive<A: Actor>(
    name: String,
    mut actor: A,
    mut ctx: Context<A>,
    mut rx: mpsc::Receiver<A::Msg>,
    shutdown: Option<ShutdownHandle>,
) -> Result<()> {
    let exit = loop {
        let next = match &shutdown {
            Some(signal) => tokio::select! {
                biased;
                _ = signal.wait() => break Exit::Shutdown,
                msg = rx.recv() => msg,
            },
            None => rx.recv().await,
        };
        let Some(msg) = next else {
            break Exit::Drained;
        };
        if let Err(e) = actor.handle(msg, &mut ctx).await {
            tracing::error!(actor = %name, error = ?e, "actor.failed");
            return Err(e);
        }
        if ctx.stop_requested {
            break Exit::Requested;
        }
    };
    actor.stopped().await;
    tracing::debug!(actor = %name, reason = exit.as_str(), "actor.stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Echoes questions back in upper case; flags `stopped` on exit.
    struct Shouter {
        stopped: Arc<AtomicBool>,
    }

    enum ShoutMsg {
        Shout(String, oneshot::Sender<String>),
        Fail,
        Quit,
    }

    #[async_trait::async_trait]
    impl Actor for Shouter {
        type Msg = ShoutMsg;

        async fn handle(&mut self, msg: ShoutMsg, ctx: &mut Context<Self>) -> Result<()> {
            match msg {
                ShoutMsg::Shout(text, reply) => {
                    let _ = reply.send(text.to_uppercase());
                }
                ShoutMsg::Fail => anyhow::bail!("shouter broke"),
                ShoutMsg::Quit => ctx.stop(),
            }
            Ok(())
        }

        async fn stopped(&mut self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    fn shouter() -> (Shouter, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Shouter {
                stopped: flag.clone(),
            },
            flag,
        )
    }

    #[tokio::test]
    async fn requests_are_answered_until_addrs_drop() {
        let (actor, stopped) = shouter();
        let ActorHandle { addr, task } = spawn_actor(actor, 4);
        let answer = addr
            .request(|reply| ShoutMsg::Shout("what is mdf".into(), reply))
            .await;
        assert_eq!(answer.as_deref(), Ok("WHAT IS MDF"));

        drop(addr);
        task.await.unwrap().unwrap();
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn stop_request_ends_the_loop() {
        let (actor, stopped) = shouter();
        let ActorHandle { addr, task } = spawn_actor(actor, 4);
        addr.send(ShoutMsg::Quit).await.ok().unwrap();
        task.await.unwrap().unwrap();
        assert!(stopped.load(Ordering::SeqCst));

        let late = addr
            .request(|reply| ShoutMsg::Shout("hello".into(), reply))
            .await;
        assert_eq!(late, Err(Unreachable::MailboxClosed));
    }

    #[tokio::test]
    async fn handler_error_stops_actor_without_stopped_hook() {
        let (actor, stopped) = shouter();
        let ActorHandle { addr, task } = spawn_actor(actor, 1);
        addr.send(ShoutMsg::Fail).await.ok().unwrap();
        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "shouter broke");
        assert!(addr.is_closed());
        assert!(!stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn shutdown_signal_stops_idle_actor() {
        let (actor, stopped) = shouter();
        let signal = ShutdownHandle::new();
        let ActorHandle { addr, task } =
            reserve::<Shouter>("shouter", 4).start_with_shutdown(actor, signal.clone());
        assert_eq!(addr.capacity(), 4);
        signal.signal();
        task.await.unwrap().unwrap();
        assert!(stopped.load(Ordering::SeqCst));
    }
}
