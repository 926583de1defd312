//! Word token extraction from decoded text

/// Extract normalized word tokens from text.
///
/// A token is a maximal run of ASCII alphabetic characters, case-folded to
/// lowercase. Digits, punctuation, underscores, and non-ASCII letters are
/// never part of a token and split runs. Tokens are returned in order of
/// appearance; no length filtering or stop-word removal is applied.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|run| !run.is_empty())
        .map(|run| run.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_digits_and_underscores_split_runs() {
        let tokens = tokenize("Hello, world! It's HELLO-world_123.");
        assert_eq!(tokens, ["hello", "world", "it", "s", "hello", "world"]);
    }

    #[test]
    fn test_empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t  ").is_empty());
        assert!(tokenize("12345 !?. _").is_empty());
    }

    #[test]
    fn test_single_letter_tokens_are_kept() {
        assert_eq!(tokenize("I have a cat"), ["i", "have", "a", "cat"]);
    }

    #[test]
    fn test_non_ascii_letters_split_runs() {
        assert_eq!(tokenize("naïve café"), ["na", "ve", "caf"]);
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(tokenize("CAT Cat cat"), ["cat", "cat", "cat"]);
    }
}
