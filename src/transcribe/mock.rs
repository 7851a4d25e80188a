use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use super::common::{format_seconds, SpeechRecord, SpeechStats, TranscriptionRequest, MOCK_CONFIDENCE};
use super::TranscriberTrait;

/// Length of each fabricated interval in seconds
const WORD_DURATION: f64 = 2.0;
/// Gap between consecutive intervals in seconds
const WORD_GAP: f64 = 1.0;
/// Pretend processing cost per word in seconds
const SECONDS_PER_WORD: f64 = 2.5;

/// Development stand-in for a speech-to-text service.
///
/// It never looks at audio: every word gets a 2 second interval followed by a
/// 1 second gap, in input order. Do not treat its output as ground truth.
pub struct MockTranscriber;

impl MockTranscriber {
    pub fn new() -> Self {
        info!("Initializing speech service in mock mode");
        Self
    }

    pub fn simulate(&self, movie_name: &str, words: &[String]) -> Vec<SpeechRecord> {
        info!("Mock processing audio for movie: {}", movie_name);
        words
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let start = i as f64 * (WORD_DURATION + WORD_GAP);
                SpeechRecord {
                    word: word.clone(),
                    start_time: format_seconds(start),
                    stop_time: format_seconds(start + WORD_DURATION),
                }
            })
            .collect()
    }

    pub fn stats(&self, words: &[String]) -> SpeechStats {
        let count = words.len();
        SpeechStats {
            total_words_processed: count,
            words_detected: count,
            confidence_scores: vec![MOCK_CONFIDENCE; count],
            average_confidence: if count == 0 { 0.0 } else { MOCK_CONFIDENCE },
            processing_duration: format!("{:.2}s", count as f64 * SECONDS_PER_WORD),
        }
    }
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriberTrait for MockTranscriber {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Vec<SpeechRecord>> {
        Ok(self.simulate(&request.movie_name, &request.words))
    }

    fn statistics(&self, words: &[String]) -> SpeechStats {
        self.stats(words)
    }

    fn is_mock(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_simulate_spaces_words_three_seconds_apart() {
        let records = MockTranscriber::new().simulate("X", &words(&["a", "b", "c"]));
        let timings: Vec<(&str, &str, &str)> = records
            .iter()
            .map(|r| (r.word.as_str(), r.start_time.as_str(), r.stop_time.as_str()))
            .collect();

        assert_eq!(timings, vec![
            ("a", "0.0", "2.0"),
            ("b", "3.0", "5.0"),
            ("c", "6.0", "8.0"),
        ]);
    }

    #[test]
    fn test_intervals_strictly_increase_without_overlap() {
        let list: Vec<String> = (0..40).map(|i| format!("w{}", i)).collect();
        let records = MockTranscriber::new().simulate("X", &list);
        for pair in records.windows(2) {
            let prev_stop: f64 = pair[0].stop_time.parse().unwrap();
            let next_start: f64 = pair[1].start_time.parse().unwrap();
            assert!(prev_stop < next_start);
        }
    }

    #[test]
    fn test_stats_are_derived_from_word_count() {
        let stats = MockTranscriber::new().stats(&words(&["a", "b", "c"]));
        assert_eq!(stats.total_words_processed, 3);
        assert_eq!(stats.words_detected, 3);
        assert_eq!(stats.confidence_scores, vec![0.95, 0.95, 0.95]);
        assert_eq!(stats.average_confidence, 0.95);
        assert_eq!(stats.processing_duration, "7.50s");
    }

    #[test]
    fn test_stats_for_no_words() {
        let stats = MockTranscriber::new().stats(&[]);
        assert_eq!(stats.processing_duration, "0.00s");
        assert!(stats.confidence_scores.is_empty());
    }

    #[test]
    fn test_transcribe_ignores_audio() {
        let transcriber = MockTranscriber::new();
        let request = TranscriptionRequest {
            movie_name: "X".to_string(),
            audio_path: Some("/sounds/none.mp3".into()),
            words: words(&["a"]),
        };
        let records = tokio_test::block_on(transcriber.transcribe(&request)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stop_time, "2.0");
    }
}
