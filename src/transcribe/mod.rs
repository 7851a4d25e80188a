// Transcription architecture
//
// Speech confirmation runs through the TranscriberTrait so callers do not care
// which implementation answers:
// - Mock: deterministic stand-in that fabricates evenly spaced timestamps
// - Service: wraps a transcriber with storage, statistics and batch handling
//
// To add a real speech-to-text service:
// 1. Implement TranscriberTrait for it
// 2. Add it to TranscriberImplementation
// 3. Update the factory to create it

pub mod common;
pub mod mock;
pub mod service;

use async_trait::async_trait;

pub use common::*;
pub use mock::MockTranscriber;
pub use service::SpeechService;

use crate::error::Result;

/// Main trait for transcription operations
#[async_trait]
pub trait TranscriberTrait: Send + Sync {
    /// Produce timed records for the requested words
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Vec<SpeechRecord>>;

    /// Processing statistics for a word list
    fn statistics(&self, words: &[String]) -> SpeechStats;

    /// Whether results are fabricated
    fn is_mock(&self) -> bool {
        false
    }
}

/// Transcriber implementation type
#[derive(Debug, Clone)]
pub enum TranscriberImplementation {
    Mock,
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create a transcriber based on implementation type
    pub fn create_transcriber(implementation: TranscriberImplementation) -> Box<dyn TranscriberTrait> {
        match implementation {
            TranscriberImplementation::Mock => Box::new(MockTranscriber::new()),
        }
    }

    /// Create with default implementation
    pub fn create_default() -> Box<dyn TranscriberTrait> {
        Self::create_transcriber(TranscriberImplementation::Mock)
    }
}
