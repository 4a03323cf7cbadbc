//! Valence lexicon on the -4..=4 scale, with negators and degree modifiers.

use std::collections::{HashMap, HashSet};
use wsb_core::SentimentError;

/// Scalar added (or subtracted) by a booster word ahead of a sentiment word.
pub const BOOSTER_INCREMENT: f64 = 0.293;

const GENERAL_WORDS: &[(&str, f64)] = &[
    ("good", 1.9),
    ("great", 3.1),
    ("awesome", 3.1),
    ("amazing", 2.8),
    ("excellent", 2.7),
    ("love", 3.2),
    ("like", 1.5),
    ("happy", 2.7),
    ("nice", 1.8),
    ("best", 3.2),
    ("better", 1.9),
    ("win", 2.8),
    ("winning", 2.4),
    ("won", 2.7),
    ("strong", 2.3),
    ("safe", 1.9),
    ("hope", 1.9),
    ("lucky", 1.8),
    ("easy", 1.9),
    ("free", 2.3),
    ("thanks", 1.9),
    ("lol", 1.8),
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.1),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("hate", -2.7),
    ("sad", -2.1),
    ("angry", -2.3),
    ("scared", -1.9),
    ("fear", -2.2),
    ("panic", -2.3),
    ("worry", -1.9),
    ("pain", -2.3),
    ("dead", -3.3),
    ("die", -2.9),
    ("lose", -1.7),
    ("losing", -1.6),
    ("lost", -1.3),
    ("fail", -2.3),
    ("failed", -2.3),
    ("wrong", -2.1),
    ("stupid", -2.4),
    ("broke", -1.8),
    ("ugly", -2.3),
    ("sucks", -1.5),
    ("problem", -1.7),
    ("crisis", -3.1),
    ("warning", -1.4),
    ("risk", -1.1),
    ("scam", -2.9),
    ("fraud", -2.8),
    ("manipulation", -1.9),
];

const TRADING_WORDS: &[(&str, f64)] = &[
    ("moon", 2.5),
    ("mooning", 2.7),
    ("rocket", 2.2),
    ("tendies", 2.3),
    ("bullish", 2.6),
    ("bull", 1.6),
    ("calls", 1.2),
    ("squeeze", 1.8),
    ("rally", 2.1),
    ("soar", 2.4),
    ("surge", 2.1),
    ("rip", 0.8),
    ("gain", 2.0),
    ("gains", 2.2),
    ("profit", 2.1),
    ("profits", 2.1),
    ("green", 1.4),
    ("hodl", 1.6),
    ("hold", 0.6),
    ("buy", 1.0),
    ("buying", 1.0),
    ("undervalued", 1.6),
    ("breakout", 1.9),
    ("upgrade", 1.8),
    ("beat", 1.6),
    ("bearish", -2.6),
    ("bear", -1.6),
    ("puts", -1.2),
    ("short", -0.9),
    ("shorts", -0.9),
    ("crash", -2.7),
    ("crashing", -2.8),
    ("dump", -2.1),
    ("dumping", -2.2),
    ("tank", -2.0),
    ("tanking", -2.3),
    ("plunge", -2.4),
    ("drop", -1.4),
    ("red", -1.2),
    ("loss", -2.1),
    ("losses", -2.2),
    ("bagholder", -2.0),
    ("bagholding", -2.0),
    ("rug", -2.3),
    ("overvalued", -1.6),
    ("sell", -1.0),
    ("selling", -1.0),
    ("downgrade", -1.8),
    ("bankrupt", -3.0),
    ("bankruptcy", -3.0),
    ("delisted", -2.6),
    ("miss", -1.4),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "nobody", "nothing", "nowhere", "cannot",
    "cant", "can't", "dont", "don't", "doesnt", "doesn't", "didnt", "didn't", "isnt", "isn't",
    "arent", "aren't", "wasnt", "wasn't", "werent", "weren't", "wont", "won't", "wouldnt",
    "wouldn't", "shouldnt", "shouldn't", "couldnt", "couldn't", "aint", "ain't", "without",
    "hardly", "rarely",
];

const BOOSTERS: &[(&str, f64)] = &[
    ("very", BOOSTER_INCREMENT),
    ("extremely", BOOSTER_INCREMENT),
    ("really", BOOSTER_INCREMENT),
    ("so", BOOSTER_INCREMENT),
    ("super", BOOSTER_INCREMENT),
    ("totally", BOOSTER_INCREMENT),
    ("absolutely", BOOSTER_INCREMENT),
    ("incredibly", BOOSTER_INCREMENT),
    ("hugely", BOOSTER_INCREMENT),
    ("massively", BOOSTER_INCREMENT),
    ("fucking", BOOSTER_INCREMENT),
    ("most", BOOSTER_INCREMENT),
    ("slightly", -BOOSTER_INCREMENT),
    ("somewhat", -BOOSTER_INCREMENT),
    ("barely", -BOOSTER_INCREMENT),
    ("kinda", -BOOSTER_INCREMENT),
    ("marginally", -BOOSTER_INCREMENT),
    ("little", -BOOSTER_INCREMENT),
];

#[derive(Debug, Clone)]
pub struct Lexicon {
    valences: HashMap<String, f64>,
    negations: HashSet<String>,
    boosters: HashMap<String, f64>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexicon {
    /// General-purpose words plus trading slang.
    pub fn new() -> Self {
        let valences = GENERAL_WORDS
            .iter()
            .chain(TRADING_WORDS.iter())
            .map(|(word, valence)| (word.to_string(), *valence))
            .collect();

        Self {
            valences,
            negations: NEGATIONS.iter().map(|w| w.to_string()).collect(),
            boosters: BOOSTERS.iter().map(|(w, b)| (w.to_string(), *b)).collect(),
        }
    }

    /// Parses `word<TAB>valence[<TAB>...]` lines; blank lines and `#` comments are skipped.
    pub fn parse_entries(contents: &str) -> Result<Vec<(String, f64)>, SentimentError> {
        let mut entries = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut fields = trimmed.split('\t');
            let word = fields.next().map(str::trim).unwrap_or_default();
            let valence = fields
                .next()
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| (-4.0..=4.0).contains(v));
            match valence {
                Some(valence) if !word.is_empty() => {
                    entries.push((word.to_lowercase(), valence));
                }
                _ => {
                    return Err(SentimentError::InvalidLexiconEntry {
                        line: index + 1,
                        entry: line.to_string(),
                    })
                }
            }
        }
        Ok(entries)
    }

    /// Adds or overrides entries from a tab-separated lexicon file's contents.
    pub fn extend_from_tsv(&mut self, contents: &str) -> Result<usize, SentimentError> {
        let entries = Self::parse_entries(contents)?;
        let count = entries.len();
        self.valences.extend(entries);
        Ok(count)
    }

    pub fn add_word(&mut self, word: &str, valence: f64) {
        self.valences.insert(word.to_lowercase(), valence);
    }

    pub fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word)
    }

    pub fn booster(&self, word: &str) -> Option<f64> {
        self.boosters.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }
}
