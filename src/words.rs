use std::path::Path;
use tracing::info;

use crate::error::{Result, BleepError};

/// Load a word list, one word per line. Blank lines and `#` comments are skipped.
pub fn load_word_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        BleepError::SourceUnavailable(format!("cannot read word list {}: {}", path.display(), e))
    })?;

    let words: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    info!("Loaded {} words from {}", words.len(), path.display());
    Ok(words)
}

/// Split a comma-separated word list
pub fn parse_word_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_parse_word_list_trims_and_drops_empties() {
        assert_eq!(parse_word_list(" damn, hell,,Crap "), vec!["damn", "hell", "Crap"]);
        assert!(parse_word_list("").is_empty());
    }

    #[test]
    fn test_load_word_list_skips_comments_and_keeps_duplicates() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("words.txt");
        file.write_str("# profanity\ndamn\n\n  hell \ndamn\n").unwrap();

        let words = load_word_list(file.path()).unwrap();
        assert_eq!(words, vec!["damn", "hell", "damn"]);
    }

    #[test]
    fn test_missing_word_list_is_source_unavailable() {
        let result = load_word_list("/no/such/words.txt");
        assert!(matches!(result, Err(BleepError::SourceUnavailable(_))));
    }
}
