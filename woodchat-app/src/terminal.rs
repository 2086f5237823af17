use async_trait::async_trait;
use crossterm::{
    queue,
    style::{Attribute, Print, SetAttribute},
};
use std::io::Write;
use woodchat_render::{
    SinkError, TextSink,
    markup::{TagKind, Token, classify, decode_entities, tokenize},
};

/// Prints rendered markup to a plain terminal as it arrives.
///
/// `<strong>` maps to bold, breaks and block ends to newlines, list items to
/// bullets. Other tags are dropped.
pub struct TerminalSink<W: Write + Send> {
    out: W,
    strong: usize,
    at_line_start: bool,
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            strong: 0,
            at_line_start: true,
        }
    }

    /// End the current line if anything was printed on it.
    pub fn finish(&mut self) -> std::io::Result<()> {
        if self.strong > 0 {
            queue!(self.out, SetAttribute(Attribute::NormalIntensity))?;
            self.strong = 0;
        }
        if !self.at_line_start {
            queue!(self.out, Print("\n"))?;
            self.at_line_start = true;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn newline(&mut self) -> std::io::Result<()> {
        queue!(self.out, Print("\n"))?;
        self.at_line_start = true;
        Ok(())
    }

    fn write_markup(&mut self, markup: &str) -> std::io::Result<()> {
        for token in tokenize(markup) {
            match token {
                Token::Text(raw) => {
                    let text = decode_entities(raw);
                    let text = if self.at_line_start {
                        text.trim_start()
                    } else {
                        text.as_str()
                    };
                    if text.is_empty() {
                        continue;
                    }
                    queue!(self.out, Print(text))?;
                    self.at_line_start = false;
                }
                Token::Tag(tag) => match classify(tag) {
                    TagKind::StrongOpen => {
                        self.strong += 1;
                        queue!(self.out, SetAttribute(Attribute::Bold))?;
                    }
                    TagKind::StrongClose => {
                        self.strong = self.strong.saturating_sub(1);
                        if self.strong == 0 {
                            queue!(self.out, SetAttribute(Attribute::NormalIntensity))?;
                        }
                    }
                    TagKind::LineBreak => self.newline()?,
                    TagKind::BlockEnd if !self.at_line_start => self.newline()?,
                    TagKind::ListItem => {
                        if !self.at_line_start {
                            self.newline()?;
                        }
                        queue!(self.out, Print("• "))?;
                        self.at_line_start = false;
                    }
                    _ => {}
                },
            }
        }
        self.out.flush()
    }
}

#[async_trait]
impl<W: Write + Send> TextSink for TerminalSink<W> {
    async fn append(&mut self, markup: &str) -> Result<(), SinkError> {
        self.write_markup(markup).map_err(|_| SinkError::Detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use woodchat_render::{Message, RenderToken, Renderer, TypingDelays};

    async fn printed(message: Message) -> String {
        let mut sink = TerminalSink::new(Vec::new());
        Renderer::new(TypingDelays::instant())
            .render(&message, &mut sink, &RenderToken::detached(), |_| {})
            .await;
        sink.finish().unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn strong_and_breaks_become_terminal_codes() {
        let out = printed(Message::plain("Hi **there**\nbye")).await;
        assert_eq!(out, "Hi \u{1b}[1mthere\u{1b}[22m\nbye\n");
    }

    #[tokio::test]
    async fn fragments_print_as_bulleted_text() {
        let out = printed(Message::fragment(
            "<div><h4>Woods</h4><ul><li>MDF &amp; HDF</li><li>Plywood</li></ul></div>",
        ))
        .await;
        assert_eq!(out, "Woods\n• MDF & HDF\n• Plywood\n");
    }
}
