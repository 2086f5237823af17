use crate::similarity::calculate_similarity;
use tracing::{debug, warn};
use woodchat_common::FaqEntry;

pub const NO_DATA_ANSWER: &str = "I don't have any information in my database yet.";
pub const EMPTY_QUESTION_ANSWER: &str = "Please ask a question.";

/// Answer of the FAQ entry most similar to `question`, with its score.
///
/// Ties go to the earliest entry. The caller decides whether the score is
/// high enough to show the answer.
pub fn best_answer(question: &str, faqs: &[FaqEntry]) -> (String, f64) {
    if faqs.is_empty() {
        warn!("faq.match.no_data");
        return (NO_DATA_ANSWER.to_string(), 0.0);
    }
    if question.is_empty() {
        return (EMPTY_QUESTION_ANSWER.to_string(), 0.0);
    }

    let mut best: Option<(usize, f64)> = None;
    for (idx, faq) in faqs.iter().enumerate() {
        let score = calculate_similarity(question, &faq.question);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((idx, score));
        }
    }

    match best {
        Some((idx, score)) => {
            let faq = &faqs[idx];
            debug!(score, matched = %faq.question, "faq.match.best");
            (faq.answer.clone(), score)
        }
        None => (NO_DATA_ANSWER.to_string(), 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_faqs;

    #[test]
    fn empty_faq_set_has_no_data_answer() {
        assert_eq!(best_answer("what is mdf", &[]), (NO_DATA_ANSWER.to_string(), 0.0));
    }

    #[test]
    fn empty_question_is_rejected() {
        let (answer, score) = best_answer("", &default_faqs());
        assert_eq!(answer, EMPTY_QUESTION_ANSWER);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn picks_the_closest_entry() {
        let faqs = default_faqs();
        let (answer, score) = best_answer("advantages of particle board", &faqs);
        assert_eq!(answer, faqs[1].answer);
        assert!(score > 0.9);

        let (answer, _) = best_answer("Tell me about Action TESA HDHMR", &faqs);
        assert_eq!(answer, faqs[2].answer);
    }

    #[test]
    fn ties_go_to_the_first_entry() {
        let faqs = vec![
            FaqEntry::new("zzz", "first"),
            FaqEntry::new("zzz", "second"),
        ];
        assert_eq!(best_answer("qqq", &faqs).0, "first");
        assert_eq!(best_answer("zzz", &faqs).0, "first");
    }

    #[test]
    fn unrelated_question_scores_low() {
        let (_, score) = best_answer("opening hours on sunday", &default_faqs());
        assert!(score < 0.3, "score was {score}");
    }
}
