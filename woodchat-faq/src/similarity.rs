use crate::preprocess::preprocess;
use std::collections::{HashMap, HashSet};

/// Domain words that earn a small bonus when both questions mention them.
pub const MATERIAL_KEYWORDS: &[&str] = &[
    "mdf",
    "hdhmr",
    "wood",
    "particle",
    "board",
    "boilo",
    "plywood",
    "timber",
    "material",
    "furniture",
    "cabinet",
    "door",
    "panel",
    "wardrobe",
    "kitchen",
    "moisture",
    "resistance",
    "density",
    "termite",
    "borer",
    "action",
    "tesa",
];

const SEQUENCE_WEIGHT: f64 = 0.3;
const JACCARD_WEIGHT: f64 = 0.5;
const OVERLAP_WEIGHT: f64 = 0.2;
const LENGTH_RATIO_FLOOR: f64 = 0.5;
const LENGTH_PENALTY: f64 = 0.8;
const KEYWORD_STEP: f64 = 0.05;
const KEYWORD_CAP: f64 = 0.15;

/// Score in `[0, 1]` of how alike a user question and an FAQ question are.
///
/// Both inputs go through [`preprocess`] first; if either ends up empty the
/// score is 0.
///
/// ```
/// use woodchat_faq::calculate_similarity;
///
/// let close = calculate_similarity("what is mdf", "What is MDF?");
/// let far = calculate_similarity("what is mdf", "What are the advantages of particle board?");
/// assert!(close > 0.9);
/// assert!(far < close);
/// ```
pub fn calculate_similarity(user: &str, faq: &str) -> f64 {
    let user = preprocess(user);
    let faq = preprocess(faq);
    if user.is_empty() || faq.is_empty() {
        return 0.0;
    }

    let sequence = sequence_ratio(&user, &faq);

    let user_words: HashSet<&str> = user.split_whitespace().collect();
    let faq_words: HashSet<&str> = faq.split_whitespace().collect();

    let shared = user_words.intersection(&faq_words).count() as f64;
    let union = user_words.union(&faq_words).count() as f64;
    let shorter = user_words.len().min(faq_words.len()) as f64;
    let longer = user_words.len().max(faq_words.len()) as f64;

    let jaccard = shared / union;
    let overlap = shared / shorter;

    let mut score = sequence * SEQUENCE_WEIGHT + jaccard * JACCARD_WEIGHT + overlap * OVERLAP_WEIGHT;

    if shorter / longer < LENGTH_RATIO_FLOOR {
        score *= LENGTH_PENALTY;
    }

    let keyword_hits = MATERIAL_KEYWORDS
        .iter()
        .filter(|k| user_words.contains(*k) && faq_words.contains(*k))
        .count();
    if keyword_hits > 0 {
        let boost = (KEYWORD_STEP * keyword_hits as f64).min(KEYWORD_CAP);
        score = (score + boost).min(1.0);
    }

    score
}

/// Gestalt pattern-matching ratio `2M / T` over the chars of `a` and `b`.
///
/// `M` is the total size of the matching blocks found by recursively taking
/// the longest common block and matching the pieces on either side. When `b`
/// has 200 or more chars, chars occurring in more than 1% of it (plus one)
/// cannot start a block, though blocks still extend over them.
///
/// ```
/// use woodchat_faq::sequence_ratio;
///
/// assert_eq!(sequence_ratio("abcd", "bcde"), 0.75);
/// assert_eq!(sequence_ratio("", ""), 1.0);
/// assert_eq!(sequence_ratio("abc", ""), 0.0);
/// ```
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = SequenceMatcher::new(&a, &b).matched_chars();
    2.0 * matched as f64 / total as f64
}

const AUTOJUNK_MIN_LEN: usize = 200;

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each non-popular char of `b`, ascending.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }
        Self { a, b, b2j }
    }

    fn matched_chars(&self) -> usize {
        let mut matched = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        matched
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given ranges,
    /// earliest in `a` then in `b` on ties.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0usize);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let prev = if j > 0 {
                        j2len.get(&(j - 1)).copied().unwrap_or(0)
                    } else {
                        0
                    };
                    let k = prev + 1;
                    next.insert(j, k);
                    if k > best_k {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_k = k;
                    }
                }
            }
            j2len = next;
        }

        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_k += 1;
        }
        while best_i + best_k < ahi
            && best_j + best_k < bhi
            && self.a[best_i + best_k] == self.b[best_j + best_k]
        {
            best_k += 1;
        }

        (best_i, best_j, best_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn ratio_matches_known_values() {
        // Reference values of the classic gestalt algorithm.
        assert!(approx(sequence_ratio("abcd", "bcde"), 0.75));
        assert!(approx(sequence_ratio("qabxcd", "abycdf"), 2.0 * 4.0 / 12.0));
        assert!(approx(sequence_ratio("what mdf", "what mdf"), 1.0));
        assert!(approx(sequence_ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn popular_chars_do_not_seed_blocks_in_long_inputs() {
        // 'a' is popular in the long input, so only the 'y' block is found.
        let long = format!("y{}", "a".repeat(250));
        assert!(approx(sequence_ratio("aaay", &long), 2.0 / 255.0));
        // Below the threshold the run of 'a' wins.
        let short = format!("y{}", "a".repeat(150));
        assert!(approx(sequence_ratio("aaay", &short), 6.0 / 155.0));
    }

    #[test]
    fn blank_inputs_score_zero() {
        assert_eq!(calculate_similarity("", "what is mdf"), 0.0);
        assert_eq!(calculate_similarity("???", "what is mdf"), 0.0);
    }

    #[test]
    fn identical_questions_score_one() {
        assert!(approx(calculate_similarity("What is MDF?", "what is mdf"), 1.0));
    }

    #[test]
    fn length_mismatch_is_penalised() {
        // one shared word of one vs. four: ratio 0.25 < 0.5
        let score = calculate_similarity("price", "price list kitchen shutters");
        let seq = sequence_ratio("price", "price list kitchen shutters");
        let expected = (seq * 0.3 + 0.25 * 0.5 + 1.0 * 0.2) * 0.8;
        assert!(approx(score, expected));
    }

    #[test]
    fn shared_keywords_boost_is_capped() {
        let q = "mdf hdhmr boilo plywood";
        let score = calculate_similarity(q, q);
        assert!(approx(score, 1.0));

        let a = "mdf hdhmr boilo plywood cost";
        let b = "mdf hdhmr boilo plywood weight";
        let seq = sequence_ratio(a, b);
        let base = seq * 0.3 + (4.0 / 6.0) * 0.5 + (4.0 / 5.0) * 0.2;
        assert!(approx(calculate_similarity(a, b), (base + 0.15).min(1.0)));
    }
}
