use crate::lexicon::Lexicon;
use crate::{PolarityScores, SentimentScorer};
use std::path::Path;
use tracing::{debug, info};
use wsb_core::CoreError;

/// Multiplier applied to a valence preceded by a negator.
pub const NEGATION_SCALAR: f64 = -0.74;
/// Extra intensity for an ALL-CAPS sentiment word in mixed-case text.
pub const CAPS_INCREMENT: f64 = 0.733;
/// Normalization constant for the compound score.
pub const NORMALIZATION_ALPHA: f64 = 15.0;

const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const LOOKBACK: usize = 3;
// Booster influence fades with distance from the sentiment word.
const BOOSTER_DECAY: [f64; LOOKBACK] = [1.0, 0.95, 0.9];

/// Rule-based scorer over a valence [`Lexicon`].
#[derive(Debug, Clone, Default)]
pub struct LexiconScorer {
    lexicon: Lexicon,
}

struct Token<'a> {
    raw: &'a str,
    lower: String,
}

impl Token<'_> {
    fn is_shouted(&self) -> bool {
        self.raw.chars().filter(|c| c.is_alphabetic()).count() > 1
            && self
                .raw
                .chars()
                .filter(|c| c.is_alphabetic())
                .all(|c| c.is_uppercase())
    }
}

impl LexiconScorer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Built-in lexicon extended with the entries of a tab-separated file.
    pub fn with_lexicon_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut lexicon = Lexicon::new();
        let added = lexicon.extend_from_tsv(&contents)?;
        info!("Loaded {} lexicon entries from {}", added, path.display());
        Ok(Self::new(lexicon))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    fn tokenize(text: &str) -> Vec<Token<'_>> {
        text.split_whitespace()
            .map(|word| word.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\''))
            .map(|word| word.trim_matches('\''))
            .filter(|word| !word.is_empty())
            .map(|raw| Token {
                raw,
                lower: raw.to_lowercase(),
            })
            .collect()
    }

    fn token_valence(&self, tokens: &[Token<'_>], index: usize, caps_differential: bool) -> f64 {
        let token = &tokens[index];
        if self.lexicon.booster(&token.lower).is_some() {
            return 0.0;
        }
        let Some(mut valence) = self.lexicon.valence(&token.lower) else {
            return 0.0;
        };

        if caps_differential && token.is_shouted() {
            valence += CAPS_INCREMENT.copysign(valence);
        }

        let start = index.saturating_sub(LOOKBACK);
        let mut negated = false;
        for (distance, previous) in tokens[start..index].iter().rev().enumerate() {
            if let Some(boost) = self.lexicon.booster(&previous.lower) {
                let mut scalar = boost;
                if caps_differential && previous.is_shouted() {
                    scalar += CAPS_INCREMENT.copysign(boost);
                }
                let scalar = scalar * BOOSTER_DECAY[distance];
                valence += if valence < 0.0 { -scalar } else { scalar };
            }
            if self.lexicon.is_negation(&previous.lower) {
                negated = true;
            }
        }
        if negated {
            valence *= NEGATION_SCALAR;
        }
        valence
    }
}

fn exclamation_emphasis(text: &str) -> f64 {
    text.matches('!').count().min(MAX_EXCLAMATIONS) as f64 * EXCLAMATION_INCREMENT
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

impl SentimentScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> PolarityScores {
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return PolarityScores::default();
        }

        let shouted = tokens.iter().filter(|t| t.is_shouted()).count();
        let caps_differential = shouted > 0 && shouted < tokens.len();

        let valences: Vec<f64> = (0..tokens.len())
            .map(|i| self.token_valence(&tokens, i, caps_differential))
            .collect();

        let mut sum: f64 = valences.iter().sum();
        if sum == 0.0 {
            return PolarityScores {
                neu: 1.0,
                ..PolarityScores::default()
            };
        }

        let emphasis = exclamation_emphasis(text);
        sum += emphasis.copysign(sum);

        let mut positive = 0.0;
        let mut negative = 0.0;
        let mut neutral = 0.0;
        for valence in &valences {
            if *valence > 0.0 {
                positive += valence + 1.0;
            } else if *valence < 0.0 {
                negative += valence - 1.0;
            } else {
                neutral += 1.0;
            }
        }
        if positive > negative.abs() {
            positive += emphasis;
        } else if positive < negative.abs() {
            negative -= emphasis;
        }

        let total = positive + negative.abs() + neutral;
        let scores = PolarityScores {
            neg: negative.abs() / total,
            neu: neutral / total,
            pos: positive / total,
            compound: normalize(sum),
        };
        debug!("Scored {} tokens, raw sum {:.3}", tokens.len(), sum);
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound(text: &str) -> f64 {
        LexiconScorer::default().polarity(text).compound
    }

    #[test]
    fn test_empty_and_whitespace_score_zero() {
        assert_eq!(LexiconScorer::default().polarity(""), PolarityScores::default());
        assert_eq!(compound("   \n\t "), 0.0);
        assert_eq!(compound("!!! ..."), 0.0);
    }

    #[test]
    fn test_neutral_text_scores_zero() {
        let scores = LexiconScorer::default().polarity("The market opens at nine");
        assert_eq!(scores.compound, 0.0);
        assert_eq!(scores.neu, 1.0);
    }

    #[test]
    fn test_sign_follows_lexicon() {
        assert!(compound("GME to the moon, tendies incoming") > 0.0);
        assert!(compound("bagholder again, total crash") < 0.0);
    }

    #[test]
    fn test_negation_flips_sign() {
        assert!(compound("this is good") > 0.0);
        assert!(compound("this is not good") < 0.0);
        assert!(compound("don't panic") > 0.0);
    }

    #[test]
    fn test_negation_outside_window_is_ignored() {
        // "not" sits four tokens before "good".
        assert!(compound("not that it was ever good") > 0.0);
    }

    #[test]
    fn test_boosters_and_dampeners() {
        let plain = compound("good");
        assert!(compound("very good") > plain);
        assert!(compound("slightly good") < plain);
        assert!(compound("very bad") < compound("bad"));
    }

    #[test]
    fn test_caps_emphasis_needs_mixed_case() {
        assert!(compound("GOOD earnings today") > compound("good earnings today"));
        assert_eq!(compound("GOOD"), compound("good"));
    }

    #[test]
    fn test_exclamations_amplify_capped() {
        assert!(compound("good!!") > compound("good"));
        assert_eq!(compound("good!!!!"), compound("good!!!!!!!!"));
        assert!(compound("bad!!") < compound("bad"));
    }

    #[test]
    fn test_compound_stays_in_bounds() {
        let euphoric = "AMAZING GREAT BEST moon rocket tendies gains !!!! ".repeat(50);
        let despair = "worst crash dump bankrupt dead loss !!!! ".repeat(50);
        let high = compound(&format!("{} ok", euphoric));
        let low = compound(&despair);
        assert!(high > 0.99 && high <= 1.0);
        assert!(low < -0.99 && low >= -1.0);
    }

    #[test]
    fn test_proportions_sum_to_one() {
        let scores = LexiconScorer::default().polarity("good news but bad timing for calls");
        let total = scores.neg + scores.neu + scores.pos;
        assert!((total - 1.0).abs() < 1e-9);
        assert!(scores.pos > 0.0 && scores.neg > 0.0);
    }

    #[test]
    fn test_custom_lexicon_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slang.tsv");
        std::fs::write(&path, "stonks\t2.5\n").unwrap();

        let scorer = LexiconScorer::with_lexicon_file(&path).unwrap();
        assert!(scorer.polarity("stonks").compound > 0.0);
        assert_eq!(LexiconScorer::default().polarity("stonks").compound, 0.0);
    }

    #[test]
    fn test_bad_lexicon_file_is_sentiment_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.tsv");
        std::fs::write(&path, "stonks\tmany\n").unwrap();

        let err = LexiconScorer::with_lexicon_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::Sentiment(_)));
        let missing = LexiconScorer::with_lexicon_file(dir.path().join("nope.tsv")).unwrap_err();
        assert!(matches!(missing, CoreError::Io(_)));
    }
}
