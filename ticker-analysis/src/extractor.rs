use regex::Regex;
use std::collections::HashSet;
use wsb_core::{CoreError, ExtractorSettings};

const VOCABULARY_PATTERN: &str = r"\b[a-zA-Z]{1,5}\b";
const STRICT_PATTERN: &str = r"\b[A-Z]{1,5}\b";

/// Finds ticker symbols in free text.
///
/// In vocabulary mode every 1-5 letter word is uppercased and kept only when it
/// is a known ticker. In strict mode only words already written in capitals
/// match, and the known list narrows them further when it is non-empty.
#[derive(Debug, Clone)]
pub struct TickerExtractor {
    pattern: Regex,
    case_insensitive: bool,
    known: HashSet<String>,
    exclude: HashSet<String>,
}

impl TickerExtractor {
    pub fn new(settings: &ExtractorSettings) -> Result<Self, CoreError> {
        Self::from_parts(
            settings.case_insensitive,
            settings.known_tickers.iter().map(String::as_str),
            settings.exclude.iter().map(String::as_str),
        )
    }

    pub fn from_parts<'a>(
        case_insensitive: bool,
        known: impl IntoIterator<Item = &'a str>,
        exclude: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, CoreError> {
        let source = if case_insensitive {
            VOCABULARY_PATTERN
        } else {
            STRICT_PATTERN
        };
        let pattern = Regex::new(source).map_err(|e| CoreError::Internal {
            message: format!("invalid ticker pattern: {}", e),
        })?;

        Ok(Self {
            pattern,
            case_insensitive,
            known: known.into_iter().map(str::to_uppercase).collect(),
            exclude: exclude.into_iter().map(str::to_uppercase).collect(),
        })
    }

    /// Tickers in first-seen order. Repeats are kept.
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| {
                if self.case_insensitive {
                    m.as_str().to_uppercase()
                } else {
                    m.as_str().to_string()
                }
            })
            .filter(|token| self.admits(token))
            .filter(|token| !self.exclude.contains(token))
            .collect()
    }

    /// Vocabulary mode keeps only known tickers; strict mode treats an empty list as no filter.
    fn admits(&self, token: &str) -> bool {
        if self.case_insensitive {
            self.known.contains(token)
        } else {
            self.known.is_empty() || self.known.contains(token)
        }
    }

    pub fn is_vocabulary_mode(&self) -> bool {
        self.case_insensitive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary(known: &[&str], exclude: &[&str]) -> TickerExtractor {
        TickerExtractor::from_parts(true, known.iter().copied(), exclude.iter().copied()).unwrap()
    }

    fn strict(known: &[&str], exclude: &[&str]) -> TickerExtractor {
        TickerExtractor::from_parts(false, known.iter().copied(), exclude.iter().copied()).unwrap()
    }

    #[test]
    fn test_vocabulary_mode_with_denylist() {
        let extractor = vocabulary(&["GME", "AMC"], &["USA"]);
        assert_eq!(extractor.extract("GME to the moon, not USA"), vec!["GME"]);
    }

    #[test]
    fn test_vocabulary_mode_uppercases_tokens() {
        let extractor = vocabulary(&["GME", "AMC", "NVDA"], &[]);
        assert_eq!(
            extractor.extract("gme and Amc, then more gme. nvda?"),
            vec!["GME", "AMC", "GME", "NVDA"]
        );
    }

    #[test]
    fn test_vocabulary_mode_results_are_known() {
        let known = ["GME", "AMC", "BBBY", "RKT", "NVDA"];
        let extractor = vocabulary(&known, &[]);
        let text = "I bought TSLA, AAPL, gme, rkt and some SPY puts because YOLO";
        let found = extractor.extract(text);
        assert_eq!(found, vec!["GME", "RKT"]);
        assert!(found.iter().all(|t| known.contains(&t.as_str())));
    }

    #[test]
    fn test_vocabulary_mode_without_known_tickers_finds_nothing() {
        let extractor = vocabulary(&[], &[]);
        assert!(extractor.extract("buy the dip now").is_empty());
        assert!(extractor.extract("GME AMC").is_empty());
    }

    #[test]
    fn test_only_excluded_word_yields_nothing() {
        assert!(strict(&[], &["YOLO"]).extract("YOLO").is_empty());
        assert!(vocabulary(&["GME"], &["YOLO"]).extract("yolo yolo").is_empty());
    }

    #[test]
    fn test_strict_mode_requires_capitals() {
        let extractor = strict(&[], &["THE"]);
        assert_eq!(
            extractor.extract("THE gme squeeze is on, buy GME and AMC"),
            vec!["GME", "AMC"]
        );
    }

    #[test]
    fn test_strict_mode_with_known_list() {
        let extractor = strict(&["GME"], &[]);
        assert_eq!(extractor.extract("GME DD from a CEO"), vec!["GME"]);
    }

    #[test]
    fn test_word_boundaries_and_length() {
        let extractor = strict(&[], &[]);
        assert_eq!(extractor.extract("$GME GOOGLE GME1 A"), vec!["GME", "A"]);
    }

    #[test]
    fn test_new_from_settings() {
        let extractor = TickerExtractor::new(&ExtractorSettings::default()).unwrap();
        assert!(!extractor.is_vocabulary_mode());
        assert_eq!(extractor.extract("YOLO on GME in the USA"), vec!["GME"]);

        let extractor = TickerExtractor::new(&ExtractorSettings::vocabulary()).unwrap();
        assert!(extractor.is_vocabulary_mode());
        assert_eq!(extractor.extract("bbby and rkt"), vec!["BBBY", "RKT"]);
    }
}
