use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::subtitle::{format_timestamp, load_srt, SubtitleLine};

/// A word found in a subtitle line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub word: String,
    pub start_time: String,
    pub stop_time: String,
    pub context: String,
}

/// Match every word against every line, case-insensitively.
///
/// Output order is line order first, then word order. A line containing
/// several words yields one match per word, and nothing is deduplicated.
pub fn find_matches(lines: &[SubtitleLine], words: &[String]) -> Vec<Match> {
    let lowered_words: Vec<(&String, String)> = words
        .iter()
        .filter(|word| !word.is_empty())
        .map(|word| (word, word.to_lowercase()))
        .collect();

    let mut matches = Vec::new();
    for line in lines {
        let text = line.text.to_lowercase();
        for (word, lowered) in &lowered_words {
            if text.contains(lowered.as_str()) {
                debug!("Found '{}' in subtitle {}", word, line.index);
                matches.push(Match {
                    word: (*word).clone(),
                    start_time: format_timestamp(line.start),
                    stop_time: format_timestamp(line.end),
                    context: line.text.clone(),
                });
            }
        }
    }
    matches
}

/// Load a subtitle file and match the word list against it
pub fn scan_file<P: AsRef<Path>>(path: P, words: &[String]) -> Result<Vec<Match>> {
    let lines = load_srt(path)?;
    let matches = find_matches(&lines, words);
    info!("Found {} matches for {} words", matches.len(), words.len());
    Ok(matches)
}
