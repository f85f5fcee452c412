//! Offline keyword-stem classifier.
//!
//! Each emotion owns a list of stems (English + Korean). A token hits an
//! emotion when it starts with one of its stems. Short ASCII stems (< 4 chars)
//! and stems written as `=word` in the lexicon must match the whole token, so
//! "mad" does not fire on "made" and "=miss" does not fire on "mission".
//! A negator within the 3 preceding tokens cancels the hit.
//!
//! Confidence is the winning emotion's share of all hits. No hits at all
//! yields `Neutral` with [`NO_SIGNAL_CONFIDENCE`].

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::{validate_text, ClassificationResult, EmotionClassifier};
use crate::emotion::Emotion;
use crate::error::ClassifyError;

/// Confidence reported when no lexicon stem matched.
pub const NO_SIGNAL_CONFIDENCE: f64 = 0.5;

struct Stem {
    text: String,
    whole_word: bool,
}

impl Stem {
    fn parse(raw: &str) -> Self {
        let raw = raw.to_lowercase();
        match raw.strip_prefix('=') {
            Some(word) => Self {
                text: word.to_string(),
                whole_word: true,
            },
            None => Self {
                whole_word: raw.is_ascii() && raw.len() < 4,
                text: raw,
            },
        }
    }

    fn matches(&self, token: &str) -> bool {
        if self.whole_word {
            token == self.text
        } else {
            token.starts_with(self.text.as_str())
        }
    }
}

static LEXICON: Lazy<Vec<(Emotion, Vec<Stem>)>> = Lazy::new(|| {
    let raw = include_str!("../../emotion_lexicon.json");
    let parsed: HashMap<String, Vec<String>> =
        serde_json::from_str(raw).expect("valid emotion lexicon");
    let mut out: Vec<(Emotion, Vec<Stem>)> = parsed
        .into_iter()
        .map(|(k, stems)| {
            let e = k.parse::<Emotion>().expect("lexicon keys are emotion labels");
            (e, stems.iter().map(|s| Stem::parse(s)).collect())
        })
        .collect();
    out.sort_by_key(|(e, _)| *e);
    out
});

#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Hit counts per emotion, indexed by `Emotion::index()`.
    pub fn hits(&self, text: &str) -> [u32; Emotion::COUNT] {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut hits = [0u32; Emotion::COUNT];

        for i in 0..tokens.len() {
            let tok = tokens[i].as_str();
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            if negated {
                continue;
            }
            for (emotion, stems) in LEXICON.iter() {
                if stems.iter().any(|s| s.matches(tok)) {
                    hits[emotion.index()] += 1;
                }
            }
        }
        hits
    }

    /// Synchronous core of [`EmotionClassifier::classify`].
    pub fn classify_text(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        let text = validate_text(text)?;
        let hits = self.hits(text);
        let total: u32 = hits.iter().sum();
        if total == 0 {
            return Ok(ClassificationResult::new(Emotion::Neutral, NO_SIGNAL_CONFIDENCE));
        }

        // strict `>` keeps the earliest emotion on ties
        let mut best = Emotion::ALL[0];
        for e in Emotion::ALL {
            if hits[e.index()] > hits[best.index()] {
                best = e;
            }
        }
        let share = f64::from(hits[best.index()]) / f64::from(total);
        Ok(ClassificationResult::new(best, share))
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        self.classify_text(text)
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Alphanumeric tokens, lower-case. Apostrophes stay inside tokens so
/// "isn't" survives as one negator.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "don't"
            | "didn't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
            | "안"
            | "못"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_covers_every_emotion() {
        assert_eq!(LEXICON.len(), Emotion::COUNT);
        for (i, (e, stems)) in LEXICON.iter().enumerate() {
            assert_eq!(e.index(), i);
            assert!(!stems.is_empty(), "{e} has no stems");
        }
    }

    #[test]
    fn picks_dominant_emotion() {
        let c = LexiconClassifier::new();
        let r = c.classify_text("So happy today, great walk and I laughed a lot").unwrap();
        assert_eq!(r.emotion, Emotion::Joy);
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn korean_stems_match_with_suffixes() {
        let c = LexiconClassifier::new();
        assert_eq!(c.classify_text("오늘은 정말 행복한 하루였다!").unwrap().emotion, Emotion::Joy);
        assert_eq!(c.classify_text("너무 슬퍼...").unwrap().emotion, Emotion::Sadness);
        assert_eq!(c.classify_text("화가 난다!").unwrap().emotion, Emotion::Anger);
        assert_eq!(c.classify_text("무서워...").unwrap().emotion, Emotion::Fear);
        assert_eq!(c.classify_text("놀랍다!").unwrap().emotion, Emotion::Surprise);
        assert_eq!(c.classify_text("역겹다.").unwrap().emotion, Emotion::Disgust);
        assert_eq!(c.classify_text("그냥 그래.").unwrap().emotion, Emotion::Neutral);
    }

    #[test]
    fn short_stems_need_whole_token() {
        let c = LexiconClassifier::new();
        let hits = c.hits("I made dinner");
        assert_eq!(hits[Emotion::Anger.index()], 0);
        let hits = c.hits("I was mad");
        assert_eq!(hits[Emotion::Anger.index()], 1);
    }

    #[test]
    fn marked_stems_need_whole_token() {
        let c = LexiconClassifier::new();
        for text in [
            "what happened at the mission briefing",
            "teardown of the old download server",
            "the film is grossing well",
        ] {
            let hits = c.hits(text);
            assert_eq!(hits.iter().sum::<u32>(), 0, "{text}: {hits:?}");
        }
        let hits = c.hits("I miss her and feel down, close to tears");
        assert_eq!(hits[Emotion::Sadness.index()], 3);
        assert_eq!(c.hits("that was gross")[Emotion::Disgust.index()], 1);
    }

    #[test]
    fn negation_cancels_hit() {
        let c = LexiconClassifier::new();
        let hits = c.hits("I am not happy");
        assert_eq!(hits[Emotion::Joy.index()], 0);
    }

    #[test]
    fn mixed_text_reports_share() {
        let c = LexiconClassifier::new();
        let r = c.classify_text("happy and glad but a bit worried").unwrap();
        assert_eq!(r.emotion, Emotion::Joy);
        assert!((r.confidence - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn tie_goes_to_declaration_order() {
        let c = LexiconClassifier::new();
        // one sadness hit, one fear hit
        let r = c.classify_text("lonely and anxious").unwrap();
        assert_eq!(r.emotion, Emotion::Sadness);
        assert!((r.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn no_signal_is_neutral() {
        let c = LexiconClassifier::new();
        let r = c.classify_text("went to the store").unwrap();
        assert_eq!(r.emotion, Emotion::Neutral);
        assert_eq!(r.confidence, NO_SIGNAL_CONFIDENCE);
    }

    #[test]
    fn blank_text_is_an_error() {
        let c = LexiconClassifier::new();
        assert!(matches!(c.classify_text("   "), Err(ClassifyError::EmptyText)));
    }
}
