//! Turning a user question into the bot message that answers it.
use std::time::Duration;
use tracing::{debug, warn};
use woodchat_common::{AskBackend, AskResponse, BackendError, is_contact_fallback};
use woodchat_faq::catalog;
use woodchat_render::Message;

/// Local catalog answers appear after this pause, like a short think.
pub const LOCAL_REPLY_DELAY: Duration = Duration::from_millis(500);

pub const TRANSPORT_FAILURE_REPLY: &str = "Sorry, I couldn't process your request. Please try again.";

/// Answer `question`: wood-material questions naming catalog materials are
/// answered locally after [`LOCAL_REPLY_DELAY`]; everything else goes to
/// `backend`.
pub async fn compose_reply(backend: &dyn AskBackend, question: &str) -> Message {
    if catalog::is_wood_query(question) {
        tokio::time::sleep(LOCAL_REPLY_DELAY).await;
        if let Some(html) = catalog::comparison_response(question) {
            debug!("reply.local_catalog");
            return Message::fragment(html);
        }
    }
    debug!(backend = backend.describe(), "reply.backend");
    message_for(backend.ask(question).await)
}

/// Pick how a backend result is shown.
pub fn message_for(result: Result<AskResponse, BackendError>) -> Message {
    match result {
        Err(BackendError::Service(error)) => {
            Message::plain(format!("Sorry, I encountered an error: {error}"))
        }
        Err(BackendError::Unavailable(why)) => {
            warn!(%why, "reply.backend_unavailable");
            Message::plain(TRANSPORT_FAILURE_REPLY)
        }
        Ok(resp) if is_contact_fallback(&resp.answer) => {
            Message::narrated_fragment(catalog::contact_fragment(), catalog::CONTACT_NARRATION)
        }
        Ok(resp) if catalog::mentions_comparison(&resp.answer) => Message::narrated_fragment(
            catalog::answer_comparison_fragment(&resp.answer),
            resp.answer,
        ),
        Ok(resp) => Message::plain(resp.answer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_quote_the_server() {
        let msg = message_for(Err(BackendError::Service("No question provided".into())));
        assert_eq!(
            msg,
            Message::plain("Sorry, I encountered an error: No question provided")
        );
    }

    #[test]
    fn transport_failures_ask_to_retry() {
        let msg = message_for(Err(BackendError::Unavailable("refused".into())));
        assert_eq!(msg, Message::plain(TRANSPORT_FAILURE_REPLY));
    }

    #[test]
    fn plain_answers_stay_plain() {
        let msg = message_for(Ok(AskResponse {
            answer: "**MDF** is smooth".into(),
            confidence: 0.8,
        }));
        assert_eq!(msg, Message::plain("**MDF** is smooth"));
    }
}
