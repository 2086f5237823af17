use crate::markup;

/// What a producer hands to the renderer.
///
/// The producer decides whether a payload is revealed incrementally or
/// inserted as a block; the renderer never sniffs the content to find out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Text with optional `**strong**` spans and newline breaks.
    PlainText(String),
    /// Ready-made markup inserted atomically.
    PrebuiltFragment {
        html: String,
        /// Text handed to the completion callback instead of the fragment's own text.
        narration: Option<String>,
    },
}

impl Message {
    pub fn plain(text: impl Into<String>) -> Self {
        Message::PlainText(text.into())
    }

    pub fn fragment(html: impl Into<String>) -> Self {
        Message::PrebuiltFragment {
            html: html.into(),
            narration: None,
        }
    }

    pub fn narrated_fragment(html: impl Into<String>, narration: impl Into<String>) -> Self {
        Message::PrebuiltFragment {
            html: html.into(),
            narration: Some(narration.into()),
        }
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self, Message::PrebuiltFragment { .. })
    }

    /// Text passed to the completion callback once this message is fully shown.
    ///
    /// ```
    /// use woodchat_render::Message;
    ///
    /// assert_eq!(Message::plain("**MDF** is\nsmooth").completion_text(), "MDF is\nsmooth");
    /// assert_eq!(
    ///     Message::fragment("<div><p>Hello</p>  <p>world</p></div>").completion_text(),
    ///     "Hello world"
    /// );
    /// ```
    pub fn completion_text(&self) -> String {
        match self {
            Message::PlainText(text) => markup::strip_emphasis_markers(text),
            Message::PrebuiltFragment {
                narration: Some(narration),
                ..
            } => narration.clone(),
            Message::PrebuiltFragment {
                html,
                narration: None,
            } => markup::readable_text(html),
        }
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::PlainText(text)
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::PlainText(text.to_string())
    }
}
