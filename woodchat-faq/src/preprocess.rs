/// Words dropped before comparing questions.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "is", "are", "was", "were", "be", "been", "being", "in",
    "on", "at", "to", "for", "with", "about", "against", "between", "into", "through", "during",
    "before", "after", "above", "below", "from", "up", "down", "of", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Normalise a question for comparison.
///
/// Lowercases, turns every char that is neither a word char nor whitespace
/// into a space, collapses whitespace and drops [`STOP_WORDS`]. A question
/// made only of stop words is returned normalised but unfiltered.
///
/// ```
/// use woodchat_faq::preprocess;
///
/// assert_eq!(preprocess("What is MDF?"), "what mdf");
/// assert_eq!(preprocess("  How   is it, then? "), "it");
/// assert_eq!(preprocess("Is it?"), "it");
/// assert_eq!(preprocess("and the"), "and the");
/// ```
pub fn preprocess(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if is_word_char(c) || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let words: Vec<&str> = lowered.split_whitespace().collect();
    let filtered: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| !STOP_WORDS.contains(w))
        .collect();

    if filtered.is_empty() {
        words.join(" ")
    } else {
        filtered.join(" ")
    }
}
