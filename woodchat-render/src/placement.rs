use crate::markup::Token;

/// A tag and the plain-text offset (in chars) it must be re-inserted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedTag {
    pub tag: String,
    pub offset: usize,
}

/// Every tag of a translated message, keyed by plain-text offset.
///
/// Entries are kept in source order, which is also non-decreasing offset
/// order, so tags sharing an offset come back in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPlacementTable {
    entries: Vec<PlacedTag>,
}

impl TagPlacementTable {
    /// Build the table in a single pass over `tokens`.
    ///
    /// ```
    /// use woodchat_render::markup::{tokenize, translate};
    /// use woodchat_render::TagPlacementTable;
    ///
    /// let translated = translate("Hi **there**");
    /// let table = TagPlacementTable::from_tokens(&tokenize(&translated));
    /// let placed: Vec<_> = table.iter().map(|p| (p.tag.as_str(), p.offset)).collect();
    /// assert_eq!(placed, vec![("<strong>", 3), ("</strong>", 8)]);
    /// ```
    pub fn from_tokens(tokens: &[Token<'_>]) -> Self {
        let mut offset = 0usize;
        let mut entries = Vec::new();
        for token in tokens {
            match token {
                Token::Text(text) => offset += text.chars().count(),
                Token::Tag(tag) => entries.push(PlacedTag {
                    tag: (*tag).to_string(),
                    offset,
                }),
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedTag> {
        self.entries.iter()
    }

    /// Tags recorded at exactly `offset`, in recorded order.
    pub fn tags_at(&self, offset: usize) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |p| p.offset == offset)
            .map(|p| p.tag.as_str())
    }

    pub(crate) fn get(&self, index: usize) -> Option<&PlacedTag> {
        self.entries.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{tokenize, translate};

    fn table(message: &str) -> TagPlacementTable {
        TagPlacementTable::from_tokens(&tokenize(&translate(message)))
    }

    #[test]
    fn records_line_break_offset() {
        let t = table("Line1\nLine2");
        assert_eq!(t.len(), 1);
        assert_eq!(t.tags_at(5).collect::<Vec<_>>(), vec!["<br>"]);
    }

    #[test]
    fn same_offset_tags_keep_source_order() {
        let t = table("**a**\n**b**");
        assert_eq!(
            t.tags_at(1).collect::<Vec<_>>(),
            vec!["</strong>", "<br>", "<strong>"]
        );
        assert_eq!(t.tags_at(0).collect::<Vec<_>>(), vec!["<strong>"]);
        assert_eq!(t.tags_at(2).collect::<Vec<_>>(), vec!["</strong>"]);
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let t = table("₹₹ **x**");
        assert_eq!(t.tags_at(3).collect::<Vec<_>>(), vec!["<strong>"]);
        assert_eq!(t.tags_at(4).collect::<Vec<_>>(), vec!["</strong>"]);
    }

    #[test]
    fn plain_message_has_no_tags() {
        assert!(table("just words").is_empty());
    }
}
