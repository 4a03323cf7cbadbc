pub mod lexicon;
pub mod scorer;

pub use lexicon::Lexicon;
pub use scorer::LexiconScorer;

use serde::Serialize;

/// Proportions of negative, neutral and positive content plus the normalized compound score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    /// Always within `[-1, 1]`.
    pub compound: f64,
}

pub trait SentimentScorer {
    fn polarity(&self, text: &str) -> PolarityScores;

    fn compound(&self, text: &str) -> f64 {
        self.polarity(text).compound
    }
}

impl<S: SentimentScorer + ?Sized> SentimentScorer for &S {
    fn polarity(&self, text: &str) -> PolarityScores {
        (**self).polarity(text)
    }
}
