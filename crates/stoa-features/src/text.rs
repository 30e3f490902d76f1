//! Text normalization and sentiment scoring.
//!
//! Two normalization paths live here. [`normalize_text`] is the shared
//! lowercase/strip-punctuation form used for property-type matching and
//! amenity lookup; the luxury flag and the category mapping both read the
//! same normalized string, so a listing cannot flip one without the other.
//! [`clean_for_sentiment`] is the heavier pass applied to free text before
//! polarity scoring: markup removal, contraction expansion, punctuation
//! removal keeping sentence terminators, lowercasing.
//!
//! Sentiment scoring itself is a pluggable collaborator behind
//! [`SentimentModel`]; [`LexiconSentiment`] is the built-in implementation.

use std::fmt;

/// Lowercase, drop everything but letters/digits/underscore/whitespace, and
/// collapse runs of whitespace.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else if c.is_alphanumeric() || c == '_' {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
        // Punctuation is dropped without leaving a separator, so
        // "play/travel" collapses to "playtravel".
    }
    out
}

/// Remove markup tags, keeping the text between them.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Common English contractions, matched case-insensitively token by token.
const CONTRACTIONS: &[(&str, &str)] = &[
    ("aren't", "are not"),
    ("can't", "cannot"),
    ("couldn't", "could not"),
    ("didn't", "did not"),
    ("doesn't", "does not"),
    ("don't", "do not"),
    ("hasn't", "has not"),
    ("haven't", "have not"),
    ("isn't", "is not"),
    ("it's", "it is"),
    ("i'm", "i am"),
    ("i've", "i have"),
    ("shouldn't", "should not"),
    ("that's", "that is"),
    ("there's", "there is"),
    ("they're", "they are"),
    ("wasn't", "was not"),
    ("we're", "we are"),
    ("we've", "we have"),
    ("weren't", "were not"),
    ("won't", "will not"),
    ("wouldn't", "would not"),
    ("you're", "you are"),
    ("you've", "you have"),
];

/// Expand contractions token-wise. Curly apostrophes are treated as plain
/// ones before lookup.
pub fn expand_contractions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, token) in text.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let key = token.replace('\u{2019}', "'").to_lowercase();
        match CONTRACTIONS.iter().find(|(from, _)| *from == key) {
            Some((_, to)) => out.push_str(to),
            None => out.push_str(token),
        }
    }
    out
}

/// Full cleaning pass applied before sentiment scoring: strip markup,
/// expand contractions, drop punctuation except `!`, `?` and `-`, then
/// lowercase.
pub fn clean_for_sentiment(text: &str) -> String {
    let text = strip_markup(text);
    let text = expand_contractions(&text);
    let kept: String = text
        .chars()
        .filter(|c| {
            c.is_alphanumeric() || *c == '_' || c.is_whitespace() || matches!(c, '!' | '?' | '-')
        })
        .collect();
    kept.to_lowercase()
}

/// Polarity scoring capability. Implementations must return a value in
/// `[-1, 1]`; callers pass already-cleaned text.
pub trait SentimentModel: Send + Sync {
    /// Score the polarity of `text` in the closed range `[-1, 1]`.
    fn score(&self, text: &str) -> f64;
}

impl fmt::Debug for dyn SentimentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SentimentModel")
    }
}

/// Word polarities for the built-in scorer. Values follow the usual
/// polarity-lexicon convention of strong words near +-1 and hedged words
/// near +-0.3.
const LEXICON: &[(&str, f64)] = &[
    ("amazing", 0.8),
    ("awesome", 0.9),
    ("awful", -0.9),
    ("bad", -0.7),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("bright", 0.5),
    ("broken", -0.6),
    ("charming", 0.7),
    ("clean", 0.6),
    ("comfortable", 0.65),
    ("convenient", 0.5),
    ("cozy", 0.6),
    ("dark", -0.3),
    ("dirty", -0.8),
    ("disappointing", -0.7),
    ("excellent", 0.9),
    ("fantastic", 0.9),
    ("good", 0.7),
    ("great", 0.8),
    ("horrible", -1.0),
    ("ideal", 0.75),
    ("lovely", 0.75),
    ("modern", 0.4),
    ("new", 0.3),
    ("nice", 0.6),
    ("noisy", -0.6),
    ("old", -0.2),
    ("perfect", 1.0),
    ("poor", -0.6),
    ("quiet", 0.4),
    ("small", -0.2),
    ("spacious", 0.6),
    ("stunning", 0.9),
    ("sunny", 0.5),
    ("terrible", -1.0),
    ("ugly", -0.8),
    ("uncomfortable", -0.65),
    ("wonderful", 0.9),
    ("worst", -1.0),
];

/// Built-in polarity lexicon scorer: the mean polarity of recognized words,
/// with a preceding `not` flipping the sign of the next recognized word.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

impl SentimentModel for LexiconSentiment {
    fn score(&self, text: &str) -> f64 {
        let mut sum = 0.0;
        let mut hits = 0usize;
        let mut negated = false;
        for token in text.split_whitespace() {
            let token = token.trim_matches(|c: char| matches!(c, '!' | '?' | '-'));
            if token == "not" || token == "no" {
                negated = true;
                continue;
            }
            if let Some((_, polarity)) = LEXICON.iter().find(|(word, _)| *word == token) {
                sum += if negated { -polarity } else { *polarity };
                hits += 1;
            }
            negated = false;
        }
        if hits == 0 {
            return 0.0;
        }
        (sum / hits as f64).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Entire loft in downtown!", "entire loft in downtown")]
    #[case("Pack \u{2019}n play/Travel crib", "pack n playtravel crib")]
    #[case("Free dryer \u{2013} In unit", "free dryer in unit")]
    #[case("  spaced   out  ", "spaced out")]
    fn test_normalize_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_text(input), expected);
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("Great flat<br/>with a <b>view</b>"),
            "Great flatwith a view"
        );
    }

    #[test]
    fn test_expand_contractions() {
        assert_eq!(
            expand_contractions("You won\u{2019}t regret it, don't wait"),
            "You will not regret it, do not wait"
        );
    }

    #[test]
    fn test_clean_for_sentiment_keeps_terminators() {
        let cleaned = clean_for_sentiment("<p>It's great!</p> Really?");
        assert_eq!(cleaned, "it is great! really?");
    }

    #[test]
    fn test_lexicon_positive_and_negative() {
        let scorer = LexiconSentiment;
        assert!(scorer.score("great sunny flat") > 0.0);
        assert!(scorer.score("dirty noisy place") < 0.0);
    }

    #[test]
    fn test_lexicon_negation_flips() {
        let scorer = LexiconSentiment;
        assert!(scorer.score("not great") < 0.0);
    }

    #[test]
    fn test_lexicon_unknown_text_is_neutral() {
        let scorer = LexiconSentiment;
        assert_relative_eq!(scorer.score("three bedrooms near metro"), 0.0);
    }

    #[test]
    fn test_lexicon_bounded() {
        let scorer = LexiconSentiment;
        let score = scorer.score("best perfect wonderful stunning");
        assert!((-1.0..=1.0).contains(&score));
    }
}
