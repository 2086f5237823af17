use crate::styles;
use ratatui::style::Style;
use uuid::Uuid;
use woodchat_render::markup::{TagKind, Token, classify, decode_entities, tokenize};
use woodchat_render::{BufferSink, MarkupBuffer};

/// A stretch of text drawn in one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub style: Style,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptLine {
    pub runs: Vec<Run>,
}

impl TranscriptLine {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        let mut line = Self::default();
        line.push(&text.into(), style);
        line
    }

    pub fn push(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.runs.push(Run {
                text: text.to_string(),
                style,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn indented(self, indent: &str, style: Style) -> Self {
        let mut line = TranscriptLine::new(indent, style);
        for run in self.runs {
            line.push(&run.text, run.style);
        }
        line
    }
}

/// One item in the conversation.
#[derive(Debug, Clone)]
pub enum Entry {
    User(String),
    /// Bot bubble; its markup grows while a render writes into it.
    Bot { id: Uuid, buffer: MarkupBuffer },
    Notice { text: String, style: Style },
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.entries.push(Entry::User(text.into()));
    }

    /// Append an empty bot bubble and return its id plus a sink writing into it.
    pub fn push_bot(&mut self) -> (Uuid, BufferSink) {
        let id = Uuid::new_v4();
        let buffer = MarkupBuffer::new();
        let sink = buffer.sink();
        self.entries.push(Entry::Bot { id, buffer });
        (id, sink)
    }

    pub fn push_notice(&mut self, text: impl Into<String>, style: Style) {
        self.entries.push(Entry::Notice {
            text: text.into(),
            style,
        });
    }

    /// Drop every entry. Sinks still pointing at removed bubbles detach.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current markup of the bubble `id`.
    pub fn bot_markup(&self, id: Uuid) -> Option<String> {
        self.entries.iter().find_map(|e| match e {
            Entry::Bot { id: bid, buffer } if *bid == id => Some(buffer.snapshot()),
            _ => None,
        })
    }

    /// Display lines for the whole conversation.
    pub fn lines(&self) -> Vec<TranscriptLine> {
        let mut out = Vec::new();
        for entry in &self.entries {
            match entry {
                Entry::User(text) => {
                    out.push(TranscriptLine::new("→ [You]", styles::you_label()));
                    for line in text.lines() {
                        out.push(TranscriptLine::new(format!("  {line}"), styles::you_text()));
                    }
                    out.push(TranscriptLine::default());
                }
                Entry::Bot { buffer, .. } => {
                    out.push(TranscriptLine::new("← [Tesa]", styles::tesa_label()));
                    out.extend(
                        markup_lines(&buffer.snapshot(), styles::tesa_text(), styles::tesa_strong())
                            .into_iter()
                            .map(|l| l.indented("  ", styles::tesa_text())),
                    );
                    out.push(TranscriptLine::default());
                }
                Entry::Notice { text, style } => {
                    out.push(TranscriptLine::new(text.clone(), *style));
                }
            }
        }
        out
    }
}

/// Lay out rendered chat markup as styled lines.
///
/// `<strong>` switches to `strong`, `<br>` and block ends break lines, `<li>`
/// starts a bulleted line, other tags are dropped and entities decoded.
pub fn markup_lines(markup: &str, normal: Style, strong: Style) -> Vec<TranscriptLine> {
    let mut lines = Vec::new();
    let mut current = TranscriptLine::default();
    let mut depth = 0usize;

    for token in tokenize(markup) {
        match token {
            Token::Text(raw) => {
                let text = collapse_whitespace(&decode_entities(raw));
                let text = if current.is_empty() {
                    text.trim_start()
                } else {
                    text.as_str()
                };
                current.push(text, if depth > 0 { strong } else { normal });
            }
            Token::Tag(tag) => match classify(tag) {
                TagKind::StrongOpen => depth += 1,
                TagKind::StrongClose => depth = depth.saturating_sub(1),
                TagKind::LineBreak => lines.push(std::mem::take(&mut current)),
                TagKind::BlockEnd => {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                }
                TagKind::ListItem => {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                    current.push("• ", normal);
                }
                TagKind::Other => {}
            },
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Modifier};

    fn normal() -> Style {
        Style::default().fg(Color::Green)
    }

    fn strong() -> Style {
        normal().add_modifier(Modifier::BOLD)
    }

    #[test]
    fn strong_spans_become_bold_runs() {
        let lines = markup_lines("Hi <strong>there</strong>!", normal(), strong());
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].runs,
            vec![
                Run {
                    text: "Hi ".into(),
                    style: normal()
                },
                Run {
                    text: "there".into(),
                    style: strong()
                },
                Run {
                    text: "!".into(),
                    style: normal()
                },
            ]
        );
    }

    #[test]
    fn breaks_and_blocks_split_lines() {
        let lines = markup_lines("a<br>b<br><br>c", normal(), strong());
        let texts: Vec<_> = lines.iter().map(|l| l.text()).collect();
        assert_eq!(texts, ["a", "b", "", "c"]);

        let lines = markup_lines(
            "<div><h4>Wood Comparison</h4></div><div><p>One</p><p>Two</p></div>",
            normal(),
            strong(),
        );
        let texts: Vec<_> = lines.iter().map(|l| l.text()).collect();
        assert_eq!(texts, ["Wood Comparison", "One", "Two"]);
    }

    #[test]
    fn list_items_get_bullets_and_entities_decode() {
        let lines = markup_lines(
            "<ul><li>Smooth &amp; stable</li><li>1&nbsp;mm &lt; 2 mm</li></ul>",
            normal(),
            strong(),
        );
        let texts: Vec<_> = lines.iter().map(|l| l.text()).collect();
        assert_eq!(texts, ["• Smooth & stable", "• 1 mm < 2 mm"]);
    }

    #[test]
    fn partial_reveal_is_displayable() {
        let lines = markup_lines("<strong>Ply", normal(), strong());
        assert_eq!(lines[0].runs[0].style, strong());
        assert_eq!(lines[0].text(), "Ply");
    }

    #[test]
    fn clearing_detaches_bubble_sinks() {
        let mut t = Transcript::default();
        t.push_user("hello");
        let (id, sink) = t.push_bot();
        assert!(sink.is_attached());
        assert_eq!(t.bot_markup(id).as_deref(), Some(""));
        t.clear();
        assert!(!sink.is_attached());
        assert!(t.bot_markup(id).is_none());
    }

    #[test]
    fn conversation_lines_have_headers() {
        let mut t = Transcript::default();
        t.push_user("What is MDF?");
        let texts: Vec<_> = t.lines().iter().map(|l| l.text()).collect();
        assert_eq!(texts, ["→ [You]", "  What is MDF?", ""]);
    }
}
