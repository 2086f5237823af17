use crate::markup;
use crate::message::Message;
use crate::reveal::Reveal;
use crate::session::RenderToken;
use crate::sink::TextSink;
use rand::Rng;
use rand::rngs::OsRng;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, trace};

/// Typing pace of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingDelays {
    /// Pause before the first character.
    pub start: Duration,
    /// Fixed part of the pause after every character.
    pub base: Duration,
    /// Exclusive upper bound of the random part added to `base`.
    pub jitter: Duration,
}

impl Default for TypingDelays {
    fn default() -> Self {
        Self::from_millis(100, 5, 5)
    }
}

impl TypingDelays {
    /// No pauses at all. Useful for tests and non-interactive output.
    pub fn instant() -> Self {
        Self::from_millis(0, 0, 0)
    }

    pub fn from_millis(start: u64, base: u64, jitter: u64) -> Self {
        Self {
            start: Duration::from_millis(start),
            base: Duration::from_millis(base),
            jitter: Duration::from_millis(jitter),
        }
    }

    /// Pause after one revealed character: `base + uniform[0, jitter)`.
    pub fn step_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base;
        }
        let mut rng = OsRng;
        self.base + Duration::from_millis(rng.gen_range(0..jitter_ms))
    }
}

/// How a render ended. `steps` counts revealed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Completed { steps: usize },
    Cancelled { steps: usize },
    Detached { steps: usize },
}

impl RenderOutcome {
    pub fn steps(&self) -> usize {
        match *self {
            RenderOutcome::Completed { steps }
            | RenderOutcome::Cancelled { steps }
            | RenderOutcome::Detached { steps } => steps,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RenderOutcome::Completed { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    delays: TypingDelays,
}

impl Renderer {
    pub fn new(delays: TypingDelays) -> Self {
        Self { delays }
    }

    pub fn delays(&self) -> TypingDelays {
        self.delays
    }

    /// Reveal `message` into `sink`.
    ///
    /// `on_complete` receives [`Message::completion_text`] exactly once, and
    /// only when the outcome is [`RenderOutcome::Completed`].
    pub async fn render<S, F>(
        &self,
        message: &Message,
        sink: &mut S,
        token: &RenderToken,
        on_complete: F,
    ) -> RenderOutcome
    where
        S: TextSink + ?Sized,
        F: FnOnce(String),
    {
        let outcome = match message {
            Message::PrebuiltFragment { html, .. } => self.insert_fragment(html, sink, token).await,
            Message::PlainText(text) => self.reveal(text, sink, token).await,
        };

        match outcome {
            RenderOutcome::Completed { steps } => {
                debug!(
                    steps,
                    fragment = message.is_fragment(),
                    generation = token.generation(),
                    "render.complete"
                );
                on_complete(message.completion_text());
            }
            RenderOutcome::Cancelled { steps } => {
                debug!(steps, generation = token.generation(), "render.cancelled");
            }
            RenderOutcome::Detached { steps } => {
                debug!(steps, generation = token.generation(), "render.detached");
            }
        }
        outcome
    }

    async fn insert_fragment<S>(&self, html: &str, sink: &mut S, token: &RenderToken) -> RenderOutcome
    where
        S: TextSink + ?Sized,
    {
        if token.is_cancelled() {
            return RenderOutcome::Cancelled { steps: 0 };
        }
        match sink.append(html).await {
            Ok(()) => RenderOutcome::Completed { steps: 0 },
            Err(_) => RenderOutcome::Detached { steps: 0 },
        }
    }

    async fn reveal<S>(&self, text: &str, sink: &mut S, token: &RenderToken) -> RenderOutcome
    where
        S: TextSink + ?Sized,
    {
        let translated = markup::translate(text);
        let mut reveal = Reveal::from_translated(&translated);
        trace!(
            chars = reveal.len(),
            tags = reveal.table().len(),
            "render.start"
        );

        let mut steps = 0usize;
        if !pause(token, self.delays.start).await {
            return RenderOutcome::Cancelled { steps };
        }

        while let Some(step) = reveal.next_step() {
            if token.is_cancelled() {
                return RenderOutcome::Cancelled { steps };
            }
            if sink.append(&step.markup()).await.is_err() {
                return RenderOutcome::Detached { steps };
            }
            steps += 1;
            if !pause(token, self.delays.step_delay()).await {
                return RenderOutcome::Cancelled { steps };
            }
        }

        if token.is_cancelled() {
            return RenderOutcome::Cancelled { steps };
        }
        let trailing = reveal.trailing_tags();
        if !trailing.is_empty() && sink.append(&trailing.concat()).await.is_err() {
            return RenderOutcome::Detached { steps };
        }
        RenderOutcome::Completed { steps }
    }
}

/// Sleep for `delay` unless the token fires first. Returns false when cancelled.
async fn pause(token: &RenderToken, delay: Duration) -> bool {
    if token.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        return true;
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = sleep(delay) => true,
    }
}
