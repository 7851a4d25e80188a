use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Constant confidence attached to every mock record
pub const MOCK_CONFIDENCE: f32 = 0.95;

/// One word with (synthetic) timing in decimal seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRecord {
    pub word: String,
    pub start_time: String,
    pub stop_time: String,
}

/// A stored record as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechResult {
    pub word: String,
    pub start_time: String,
    pub stop_time: String,
    pub confidence: f32,
}

impl From<SpeechRecord> for SpeechResult {
    fn from(record: SpeechRecord) -> Self {
        Self {
            word: record.word,
            start_time: record.start_time,
            stop_time: record.stop_time,
            confidence: MOCK_CONFIDENCE,
        }
    }
}

/// Input to a transcriber
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub movie_name: String,
    /// Clip to analyse; ignored by the mock
    pub audio_path: Option<PathBuf>,
    pub words: Vec<String>,
}

/// Illustrative processing statistics, not measured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechStats {
    pub total_words_processed: usize,
    pub words_detected: usize,
    pub confidence_scores: Vec<f32>,
    pub average_confidence: f32,
    pub processing_duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingReport {
    pub success: bool,
    pub movie_name: String,
    pub statistics: SpeechStats,
    pub message: String,
}

/// Outcome of one file in a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItemResult {
    Processed(ProcessingReport),
    Failed {
        success: bool,
        audio_file: String,
        error: String,
    },
}

impl BatchItemResult {
    pub fn failed(audio_file: &str, error: String) -> Self {
        BatchItemResult::Failed {
            success: false,
            audio_file: audio_file.to_string(),
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            BatchItemResult::Processed(report) => report.success,
            BatchItemResult::Failed { .. } => false,
        }
    }
}

/// Render seconds the way stored records carry them ("3.0")
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.1}", seconds)
}
