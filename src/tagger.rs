//! Grammatical category assignment for single words
//!
//! The store consults the tagger exactly once per distinct word, the first
//! time that word is observed; the returned label is permanent. Category is
//! therefore a per-word attribute, not a per-occurrence one - a deliberate
//! simplification of context-sensitive part-of-speech tagging.

/// Sentinel label returned when a word cannot be classified
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

/// Single-word category tagger boundary.
///
/// Implementations must be total: any input yields some label, with
/// [`UNKNOWN_CATEGORY`] as the internal-failure sentinel. Tagging must
/// never fail outward to the caller.
pub trait CategoryTagger: Send + Sync {
    /// Assign a category label to one normalized word
    fn tag(&self, word: &str) -> String;
}

/// Best-effort single-word tagger: closed-class word lists plus suffix
/// heuristics, producing Penn-style tags (NN, VB, JJ, ...).
///
/// Deliberately context-free; the default for any uncertain open-class
/// word is NN.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTagger;

const DETERMINERS: [&str; 8] = ["a", "an", "the", "this", "that", "these", "those", "every"];
const PRONOUNS: [&str; 12] = [
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];
const PREPOSITIONS: [&str; 12] = [
    "in", "on", "at", "of", "for", "with", "by", "from", "into", "over", "under", "about",
];
const CONJUNCTIONS: [&str; 6] = ["and", "or", "but", "nor", "so", "yet"];
const MODALS: [&str; 9] = [
    "can", "could", "will", "would", "shall", "should", "may", "might", "must",
];

impl HeuristicTagger {
    pub fn new() -> Self {
        Self
    }
}

impl CategoryTagger for HeuristicTagger {
    fn tag(&self, word: &str) -> String {
        if word.is_empty() || !word.bytes().all(|b| b.is_ascii_lowercase()) {
            return UNKNOWN_CATEGORY.to_string();
        }

        if DETERMINERS.contains(&word) {
            return "DT".to_string();
        }
        if PRONOUNS.contains(&word) {
            return "PRP".to_string();
        }
        if word == "to" {
            return "TO".to_string();
        }
        if PREPOSITIONS.contains(&word) {
            return "IN".to_string();
        }
        if CONJUNCTIONS.contains(&word) {
            return "CC".to_string();
        }
        if MODALS.contains(&word) {
            return "MD".to_string();
        }

        // Suffix rules only apply where a stem remains
        let n = word.len();
        if n > 4 && word.ends_with("ing") {
            return "VBG".to_string();
        }
        if n > 3 && word.ends_with("ed") {
            return "VBD".to_string();
        }
        if n > 3 && word.ends_with("ly") {
            return "RB".to_string();
        }
        if n > 4 && (word.ends_with("tion") || word.ends_with("ness") || word.ends_with("ment")) {
            return "NN".to_string();
        }
        if n > 4
            && (word.ends_with("ous")
                || word.ends_with("ful")
                || word.ends_with("able")
                || word.ends_with("ible")
                || word.ends_with("ive"))
        {
            return "JJ".to_string();
        }
        if n > 3 && word.ends_with('s') && !word.ends_with("ss") {
            return "NNS".to_string();
        }

        "NN".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_class_words() {
        let tagger = HeuristicTagger::new();
        assert_eq!(tagger.tag("the"), "DT");
        assert_eq!(tagger.tag("they"), "PRP");
        assert_eq!(tagger.tag("to"), "TO");
        assert_eq!(tagger.tag("with"), "IN");
        assert_eq!(tagger.tag("and"), "CC");
        assert_eq!(tagger.tag("should"), "MD");
    }

    #[test]
    fn test_suffix_rules() {
        let tagger = HeuristicTagger::new();
        assert_eq!(tagger.tag("running"), "VBG");
        assert_eq!(tagger.tag("walked"), "VBD");
        assert_eq!(tagger.tag("quickly"), "RB");
        assert_eq!(tagger.tag("happiness"), "NN");
        assert_eq!(tagger.tag("famous"), "JJ");
        assert_eq!(tagger.tag("cats"), "NNS");
    }

    #[test]
    fn test_open_class_default_is_noun() {
        let tagger = HeuristicTagger::new();
        assert_eq!(tagger.tag("cat"), "NN");
        assert_eq!(tagger.tag("word"), "NN");
    }

    #[test]
    fn test_sentinel_for_unclassifiable_input() {
        let tagger = HeuristicTagger::new();
        assert_eq!(tagger.tag(""), UNKNOWN_CATEGORY);
        assert_eq!(tagger.tag("Cat"), UNKNOWN_CATEGORY);
        assert_eq!(tagger.tag("c3po"), UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_short_words_skip_suffix_rules() {
        let tagger = HeuristicTagger::new();
        // Too short for the -s / -ed rules to leave a stem
        assert_eq!(tagger.tag("is"), "NN");
        assert_eq!(tagger.tag("red"), "NN");
    }
}
