use crate::markup::{self, Token};
use crate::placement::TagPlacementTable;

/// Output of one reveal step: the tags due at `cursor`, then one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Cursor value before the step.
    pub cursor: usize,
    pub tags: Vec<String>,
    pub ch: char,
}

impl Step {
    /// Tags followed by the character, ready to append to a sink.
    pub fn markup(&self) -> String {
        let mut out: String = self.tags.concat();
        out.push(self.ch);
        out
    }
}

/// Reveal cursor over the plain-text projection of a message.
///
/// The cursor moves forward by exactly one char per [`Reveal::next_step`] and
/// never passes the plain-text length. Tags left at the final offset are
/// drained by [`Reveal::trailing_tags`].
///
/// ```
/// use woodchat_render::Reveal;
///
/// let mut reveal = Reveal::from_translated("a<br>b");
/// let mut out = String::new();
/// while let Some(step) = reveal.next_step() {
///     out.push_str(&step.markup());
/// }
/// out.push_str(&reveal.trailing_tags().concat());
/// assert_eq!(out, "a<br>b");
/// assert_eq!(reveal.cursor(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Reveal {
    plain: Vec<char>,
    table: TagPlacementTable,
    cursor: usize,
    next_tag: usize,
}

impl Reveal {
    /// Build from a message that has already been through [`markup::translate`].
    pub fn from_translated(translated: &str) -> Self {
        let tokens = markup::tokenize(translated);
        Self::from_tokens(&tokens)
    }

    pub fn from_tokens(tokens: &[Token<'_>]) -> Self {
        Self {
            plain: markup::plain_text(tokens).chars().collect(),
            table: TagPlacementTable::from_tokens(tokens),
            cursor: 0,
            next_tag: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Plain-text length in chars; also the number of reveal steps.
    pub fn len(&self) -> usize {
        self.plain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plain.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.plain.len()
    }

    pub fn table(&self) -> &TagPlacementTable {
        &self.table
    }

    pub fn plain_text(&self) -> String {
        self.plain.iter().collect()
    }

    pub fn next_step(&mut self) -> Option<Step> {
        let ch = *self.plain.get(self.cursor)?;
        let tags = self.take_tags_at(self.cursor);
        let step = Step {
            cursor: self.cursor,
            tags,
            ch,
        };
        self.cursor += 1;
        Some(step)
    }

    /// Tags recorded at the end of the text. Empty until the cursor is exhausted.
    pub fn trailing_tags(&mut self) -> Vec<String> {
        if !self.is_exhausted() {
            return Vec::new();
        }
        self.take_tags_at(self.cursor)
    }

    fn take_tags_at(&mut self, offset: usize) -> Vec<String> {
        let mut tags = Vec::new();
        while let Some(placed) = self.table.get(self.next_tag) {
            if placed.offset != offset {
                break;
            }
            tags.push(placed.tag.clone());
            self.next_tag += 1;
        }
        tags
    }
}
