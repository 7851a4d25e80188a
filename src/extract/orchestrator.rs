use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::ExtractionConfig;
use crate::error::{Result, BleepError};
use crate::matcher::Match;
use crate::media::MediaProcessorTrait;
use super::{allocator_for, AudioSegment, SegmentExtractor};

/// A match whose clip could not be extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub word: String,
    pub start_time: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    /// Successful clips in input order
    pub segments: Vec<AudioSegment>,
    pub failures: Vec<ExtractionFailure>,
}

/// Fans extraction out over one task per match and gathers the survivors
pub struct ExtractionOrchestrator {
    extractor: Arc<SegmentExtractor>,
}

impl ExtractionOrchestrator {
    pub fn new(media: Arc<dyn MediaProcessorTrait>, config: ExtractionConfig) -> Self {
        Self {
            extractor: Arc::new(SegmentExtractor::new(media, config)),
        }
    }

    pub async fn extract_all(
        &self,
        video_path: &Path,
        matches: &[Match],
        movie_name: &str,
    ) -> Result<Vec<AudioSegment>> {
        Ok(self
            .extract_all_with_failures(video_path, matches, movie_name)
            .await?
            .segments)
    }

    /// Extract every match concurrently.
    ///
    /// Only a missing video fails the call. Per-match failures are logged and
    /// reported in the outcome, and never cancel the other tasks.
    pub async fn extract_all_with_failures(
        &self,
        video_path: &Path,
        matches: &[Match],
        movie_name: &str,
    ) -> Result<ExtractionOutcome> {
        if !video_path.is_file() {
            return Err(BleepError::SourceUnavailable(format!(
                "video not found: {}",
                video_path.display()
            )));
        }
        if matches.is_empty() {
            return Ok(ExtractionOutcome::default());
        }

        let config = self.extractor.config();
        tokio::fs::create_dir_all(&config.output_dir).await?;
        info!(
            "Extracting {} audio segments from {} into {}",
            matches.len(),
            video_path.display(),
            config.output_dir.display()
        );

        let allocator = Arc::new(Mutex::new(allocator_for(config)));
        let progress = progress_bar(matches.len() as u64, config.show_progress);

        let mut tasks = JoinSet::new();
        for (index, detection) in matches.iter().cloned().enumerate() {
            let extractor = Arc::clone(&self.extractor);
            let allocator = Arc::clone(&allocator);
            let video_path = video_path.to_path_buf();
            let movie_name = movie_name.to_string();

            tasks.spawn(async move {
                let result = extractor
                    .extract_one(&video_path, &detection, &movie_name, &allocator)
                    .await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<AudioSegment>>> = (0..matches.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            progress.inc(1);
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!("Extraction task did not finish: {}", e),
            }
        }
        progress.finish_and_clear();

        let mut outcome = ExtractionOutcome::default();
        for (detection, slot) in matches.iter().zip(slots) {
            let failure = match slot {
                Some(Ok(segment)) => {
                    outcome.segments.push(segment);
                    continue;
                }
                Some(Err(BleepError::ExtractionFailed { reason })) => reason,
                Some(Err(other)) => other.to_string(),
                None => "extraction task did not finish".to_string(),
            };

            warn!(
                "Error extracting audio segment for '{}' at {}: {}",
                detection.word, detection.start_time, failure
            );
            outcome.failures.push(ExtractionFailure {
                word: detection.word.clone(),
                start_time: detection.start_time.clone(),
                reason: failure,
            });
        }

        info!(
            "Extracted {} of {} audio segments",
            outcome.segments.len(),
            matches.len()
        );
        Ok(outcome)
    }
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
