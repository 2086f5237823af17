//! Chat panel state, kept apart from the terminal so it can be driven in tests.
use crate::styles;
use crate::transcript::Transcript;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;
use woodchat_render::{BufferSink, RenderSessions, RenderToken};

pub const GREETING: &str = "👋 Hi there! I'm your Tesa Assistant.";
pub const CAPABILITIES: &str = "I can answer questions about wood, MDF, particle board, HDHMR, BOILO, and more. How can I help you today?";
/// Pause between the two greeting lines.
pub const GREETING_GAP: Duration = Duration::from_millis(300);

/// Everything the chat panel knows: visibility, greeting state, the
/// conversation, pending replies and the renders writing into bubbles.
///
/// `epoch` advances on every refresh so replies that were requested before
/// the conversation was cleared can be recognised and dropped.
#[derive(Debug, Default)]
pub struct ChatSession {
    panel_open: bool,
    greeting_shown: bool,
    transcript: Transcript,
    renders: RenderSessions<Uuid>,
    pending_replies: usize,
    epoch: u64,
}

/// A bot bubble ready to be rendered into.
#[derive(Debug)]
pub struct BubbleLease {
    pub id: Uuid,
    pub sink: BufferSink,
    pub token: RenderToken,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.panel_open
    }

    pub fn greeting_shown(&self) -> bool {
        self.greeting_shown
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Flip panel visibility. Returns `true` when the greeting should be shown now.
    pub fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        debug!(open = self.panel_open, "chat.panel.toggle");
        if self.panel_open && !self.greeting_shown {
            self.greeting_shown = true;
            return true;
        }
        false
    }

    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    /// Clear the conversation, stop every render and start a new epoch.
    /// The greeting is due again afterwards.
    pub fn refresh(&mut self) {
        self.renders.cancel_all();
        self.transcript.clear();
        self.pending_replies = 0;
        self.epoch += 1;
        self.greeting_shown = true;
        debug!(epoch = self.epoch, "chat.refresh");
    }

    /// Record a question and show the typing indicator until its reply lands.
    pub fn submit(&mut self, question: &str) -> u64 {
        self.transcript.push_user(question);
        self.pending_replies += 1;
        self.epoch
    }

    pub fn is_typing(&self) -> bool {
        self.pending_replies > 0
    }

    /// A reply for `epoch` arrived; hide one typing indicator.
    /// Returns `false` when the reply belongs to a cleared conversation.
    pub fn reply_arrived(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "chat.reply.stale");
            return false;
        }
        self.pending_replies = self.pending_replies.saturating_sub(1);
        true
    }

    /// Open a new bot bubble and a render session on it.
    pub fn open_bubble(&mut self) -> BubbleLease {
        let (id, sink) = self.transcript.push_bot();
        let token = self.renders.begin(id);
        BubbleLease { id, sink, token }
    }

    pub fn render_finished(&mut self, id: Uuid, token: &RenderToken) {
        self.renders.finish(&id, token);
    }

    pub fn active_renders(&self) -> usize {
        self.renders.active()
    }

    pub fn notice(&mut self, text: impl Into<String>) {
        self.transcript.push_notice(text, styles::notice());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.transcript.push_notice(text, styles::error());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use woodchat_render::{Message, RenderOutcome, Renderer, TypingDelays};

    #[test]
    fn greeting_only_on_first_open() {
        let mut s = ChatSession::new();
        assert!(!s.is_open());
        assert!(s.toggle_panel());
        assert!(!s.toggle_panel());
        assert!(!s.is_open());
        assert!(!s.toggle_panel());
        s.close_panel();
        assert!(!s.is_open());
    }

    #[test]
    fn stale_replies_are_ignored_after_refresh() {
        let mut s = ChatSession::new();
        s.toggle_panel();
        let epoch = s.submit("What is MDF?");
        assert!(s.is_typing());
        s.refresh();
        assert!(!s.is_typing());
        assert!(s.transcript().is_empty());
        assert!(!s.reply_arrived(epoch));

        let epoch = s.submit("What is HDHMR?");
        assert!(s.reply_arrived(epoch));
        assert!(!s.is_typing());
    }

    #[tokio::test]
    async fn refresh_cancels_in_flight_renders() {
        let mut s = ChatSession::new();
        let BubbleLease {
            id,
            mut sink,
            token,
        } = s.open_bubble();
        assert_eq!(s.active_renders(), 1);
        s.refresh();
        assert_eq!(s.active_renders(), 0);

        let renderer = Renderer::new(TypingDelays::instant());
        let mut fired = false;
        let outcome = renderer
            .render(&Message::plain("gone"), &mut sink, &token, |_| fired = true)
            .await;
        assert_eq!(outcome, RenderOutcome::Cancelled { steps: 0 });
        assert!(!fired);
        assert!(s.transcript().bot_markup(id).is_none());
    }

    #[tokio::test]
    async fn bubbles_render_independently() {
        let mut s = ChatSession::new();
        let mut first = s.open_bubble();
        let mut second = s.open_bubble();
        let renderer = Renderer::new(TypingDelays::instant());
        let (mdf, hdhmr) = (Message::plain("**MDF**"), Message::plain("HDHMR"));

        let (a, b) = tokio::join!(
            renderer.render(&mdf, &mut first.sink, &first.token, |_| {}),
            renderer.render(&hdhmr, &mut second.sink, &second.token, |_| {}),
        );
        assert!(a.is_completed() && b.is_completed());
        s.render_finished(first.id, &first.token);
        s.render_finished(second.id, &second.token);
        assert_eq!(s.active_renders(), 0);
        assert_eq!(
            s.transcript().bot_markup(first.id).as_deref(),
            Some("<strong>MDF</strong>")
        );
        assert_eq!(s.transcript().bot_markup(second.id).as_deref(), Some("HDHMR"));
    }
}
