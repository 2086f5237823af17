//! Markup translation and tokenizing.
//!
//! The chat dialect is deliberately tiny: `**x**` becomes `<strong>x</strong>`
//! and every newline becomes `<br>`. Anything the translator does not
//! recognise is passed through as literal text.

/// One lexical unit of translated markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Tag(&'a str),
}

/// Display role of a tag, used by sinks that interpret markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    StrongOpen,
    StrongClose,
    LineBreak,
    /// Closing tag of a block element (`</p>`, `</div>`, `</li>`, `</h4>`, ...).
    BlockEnd,
    ListItem,
    Other,
}

const EMPHASIS_MARKER: &str = "**";

/// Translate emphasis markers and newlines into tags.
///
/// Markers pair lazily and never across a line break; an unpaired marker is
/// kept as literal asterisks.
///
/// ```
/// use woodchat_render::markup::translate;
///
/// assert_eq!(translate("Hi **there**"), "Hi <strong>there</strong>");
/// assert_eq!(translate("Line1\nLine2"), "Line1<br>Line2");
/// assert_eq!(translate("5 ** 2"), "5 ** 2");
/// ```
pub fn translate(message: &str) -> String {
    let mut out = String::with_capacity(message.len() + 16);
    let mut i = 0;

    while i < message.len() {
        let rest = &message[i..];
        if let Some(body) = rest.strip_prefix(EMPHASIS_MARKER)
            && let Some(close) = closing_marker(body)
        {
            out.push_str("<strong>");
            out.push_str(&body[..close]);
            out.push_str("</strong>");
            i += EMPHASIS_MARKER.len() * 2 + close;
            continue;
        }
        match rest.chars().next() {
            Some(ch) => {
                out.push(ch);
                i += ch.len_utf8();
            }
            None => break,
        }
    }

    out.replace('\n', "<br>")
}

fn closing_marker(body: &str) -> Option<usize> {
    let line_end = body.find(is_line_terminator).unwrap_or(body.len());
    body[..line_end].find(EMPHASIS_MARKER)
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Split translated markup into text runs and tags.
///
/// A tag runs from `<` through the next `>`. A `<` without a later `>` is
/// plain text.
///
/// ```
/// use woodchat_render::markup::{tokenize, Token};
///
/// assert_eq!(
///     tokenize("a<br>b < c"),
///     vec![Token::Text("a"), Token::Tag("<br>"), Token::Text("b < c")]
/// );
/// ```
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            tokens.push(Token::Text(rest));
            break;
        };
        let Some(gt) = rest[lt..].find('>') else {
            tokens.push(Token::Text(rest));
            break;
        };
        if lt > 0 {
            tokens.push(Token::Text(&rest[..lt]));
        }
        let end = lt + gt + 1;
        tokens.push(Token::Tag(&rest[lt..end]));
        rest = &rest[end..];
    }

    tokens
}

/// Concatenate the text runs of `tokens`, dropping every tag.
pub fn plain_text(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Text(s) => Some(*s),
            Token::Tag(_) => None,
        })
        .collect()
}

/// Remove every `**`, paired or not.
pub fn strip_emphasis_markers(message: &str) -> String {
    message.replace(EMPHASIS_MARKER, "")
}

/// Classify a tag by its display role.
///
/// ```
/// use woodchat_render::markup::{classify, TagKind};
///
/// assert_eq!(classify("<strong>"), TagKind::StrongOpen);
/// assert_eq!(classify("</STRONG>"), TagKind::StrongClose);
/// assert_eq!(classify("<br/>"), TagKind::LineBreak);
/// assert_eq!(classify("</div>"), TagKind::BlockEnd);
/// assert_eq!(classify("<li>"), TagKind::ListItem);
/// assert_eq!(classify("<div class=\"spec-item\">"), TagKind::Other);
/// ```
pub fn classify(tag: &str) -> TagKind {
    let inner = tag.trim_start_matches('<').trim_end_matches('>').trim();
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, inner),
    };
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    match (name.as_str(), closing) {
        ("strong" | "b", false) => TagKind::StrongOpen,
        ("strong" | "b", true) => TagKind::StrongClose,
        ("br", _) => TagKind::LineBreak,
        ("li", false) => TagKind::ListItem,
        ("p" | "div" | "li" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6", true) => {
            TagKind::BlockEnd
        }
        _ => TagKind::Other,
    }
}

/// Decode the handful of entities the chat fragments use.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Human-readable text of a markup fragment: tags dropped, block boundaries
/// turned into spaces, entities decoded, whitespace collapsed.
pub fn readable_text(html: &str) -> String {
    let mut raw = String::with_capacity(html.len());
    for token in tokenize(html) {
        match token {
            Token::Text(s) => raw.push_str(&decode_entities(s)),
            Token::Tag(tag) => {
                if !matches!(
                    classify(tag),
                    TagKind::StrongOpen | TagKind::StrongClose | TagKind::Other
                ) {
                    raw.push(' ');
                }
            }
        }
    }
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_markers_lazily() {
        assert_eq!(
            translate("**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
        assert_eq!(translate("***a**"), "<strong>*a</strong>");
    }

    #[test]
    fn empty_span_produces_adjacent_tags() {
        assert_eq!(translate("x****"), "x<strong></strong>");
    }

    #[test]
    fn unpaired_marker_is_literal() {
        assert_eq!(translate("**open only"), "**open only");
        assert_eq!(translate("a **b** c **d"), "a <strong>b</strong> c **d");
    }

    #[test]
    fn markers_do_not_pair_across_lines() {
        assert_eq!(translate("**a\nb**"), "**a<br>b**");
    }

    #[test]
    fn handles_multibyte_text() {
        assert_eq!(
            translate("₹30-40 **per sq ft** ★"),
            "₹30-40 <strong>per sq ft</strong> ★"
        );
    }

    #[test]
    fn tokenizes_adjacent_tags() {
        assert_eq!(
            tokenize("<strong></strong>x"),
            vec![
                Token::Tag("<strong>"),
                Token::Tag("</strong>"),
                Token::Text("x")
            ]
        );
    }

    #[test]
    fn unterminated_tag_is_text() {
        let tokens = tokenize("a <b");
        assert_eq!(tokens, vec![Token::Text("a <b")]);
        assert_eq!(plain_text(&tokens), "a <b");
    }

    #[test]
    fn plain_text_drops_tags() {
        let translated = translate("Hi **there**\nfriend");
        assert_eq!(plain_text(&tokenize(&translated)), "Hi therefriend");
    }

    #[test]
    fn strips_all_markers() {
        assert_eq!(strip_emphasis_markers("**a** b **"), "a b ");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(decode_entities("a&nbsp;&amp;&nbsp;b"), "a & b");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn readable_text_separates_blocks() {
        let html = "<ul><li>One</li><li>Two</li></ul><div><strong>Price:</strong> ₹30</div>";
        assert_eq!(readable_text(html), "One Two Price: ₹30");
    }
}
