use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::config::{DurationMode, ExtractionConfig};
use crate::error::{Result, BleepError};
use crate::matcher::Match;
use crate::media::{MediaProcessorTrait, SegmentRequest};
use crate::subtitle::parse_timestamp;
use super::IdAllocator;

/// A match together with the audio clip cut for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSegment {
    #[serde(flatten)]
    pub detection: Match,
    pub audio_path: PathBuf,
}

/// Cuts one audio clip per match through the media processor
pub struct SegmentExtractor {
    media: Arc<dyn MediaProcessorTrait>,
    config: ExtractionConfig,
}

impl SegmentExtractor {
    pub fn new(media: Arc<dyn MediaProcessorTrait>, config: ExtractionConfig) -> Self {
        Self { media, config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// `<output_dir>/<movie>-<id>.<ext>`
    pub fn output_path(&self, movie_name: &str, id: u32) -> PathBuf {
        self.config.output_dir.join(format!(
            "{}-{}.{}",
            file_stem_for(movie_name),
            id,
            self.config.file_extension
        ))
    }

    /// Value handed to ffmpeg's `-t` for this match
    pub fn clip_duration(&self, detection: &Match) -> Result<String> {
        match self.config.duration_mode {
            // Absolute stop time passed through as the length
            DurationMode::StopTime => Ok(detection.stop_time.clone()),
            DurationMode::Span => {
                let start = parse_timestamp(&detection.start_time)
                    .map_err(|e| BleepError::extraction(e.to_string()))?;
                let stop = parse_timestamp(&detection.stop_time)
                    .map_err(|e| BleepError::extraction(e.to_string()))?;
                let span = stop.checked_sub(start).ok_or_else(|| {
                    BleepError::extraction(format!(
                        "stop time {} precedes start time {}",
                        detection.stop_time, detection.start_time
                    ))
                })?;
                Ok(format!("{:.3}", span.as_secs_f64()))
            }
        }
    }

    /// Extract the clip for one match.
    ///
    /// The allocated id is consumed even when extraction fails.
    pub async fn extract_one(
        &self,
        video_path: &Path,
        detection: &Match,
        movie_name: &str,
        allocator: &Mutex<Box<dyn IdAllocator>>,
    ) -> Result<AudioSegment> {
        let duration = self.clip_duration(detection)?;

        let id = {
            let mut allocator = allocator
                .lock()
                .map_err(|_| BleepError::extraction("file id allocator is poisoned"))?;
            allocator.allocate()?
        };

        let request = SegmentRequest {
            video_path: video_path.to_path_buf(),
            start: detection.start_time.clone(),
            duration,
            output_path: self.output_path(movie_name, id),
        };

        self.media.extract_segment(&request).await?;

        let produced = tokio::fs::metadata(&request.output_path)
            .await
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);
        if !produced {
            return Err(BleepError::extraction(format!(
                "no audio written to {}",
                request.output_path.display()
            )));
        }

        debug!("Extracted '{}' at {}", detection.word, detection.start_time);
        info!("Audio segment written: {}", request.output_path.display());

        Ok(AudioSegment {
            detection: detection.clone(),
            audio_path: request.output_path,
        })
    }
}

/// File-name-safe form of a movie name
pub fn file_stem_for(movie_name: &str) -> String {
    let stem: String = movie_name
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    if stem.is_empty() { "movie".to_string() } else { stem }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::extract::{RandomIdAllocator, SequentialIdAllocator};
    use crate::media::MockMediaProcessorTrait;

    fn detection(start: &str, stop: &str) -> Match {
        Match {
            word: "hell".to_string(),
            start_time: start.to_string(),
            stop_time: stop.to_string(),
            context: "what the hell".to_string(),
        }
    }

    fn extraction_config(dir: &Path, mode: DurationMode) -> ExtractionConfig {
        let mut config = Config::default().extraction;
        config.output_dir = dir.to_path_buf();
        config.duration_mode = mode;
        config
    }

    fn sequential() -> Mutex<Box<dyn IdAllocator>> {
        Mutex::new(Box::new(SequentialIdAllocator::new(1..=1000)))
    }

    #[test]
    fn test_stop_time_mode_passes_stop_time_as_duration() {
        let extractor = SegmentExtractor::new(
            Arc::new(MockMediaProcessorTrait::new()),
            extraction_config(Path::new("/sounds"), DurationMode::StopTime),
        );
        let duration = extractor.clip_duration(&detection("00:01:00.000", "00:01:02.500")).unwrap();
        assert_eq!(duration, "00:01:02.500");
    }

    #[test]
    fn test_span_mode_passes_stop_minus_start() {
        let extractor = SegmentExtractor::new(
            Arc::new(MockMediaProcessorTrait::new()),
            extraction_config(Path::new("/sounds"), DurationMode::Span),
        );
        let duration = extractor.clip_duration(&detection("00:01:00.000", "00:01:02.500")).unwrap();
        assert_eq!(duration, "2.500");

        let inverted = extractor.clip_duration(&detection("00:01:02.500", "00:01:00.000"));
        assert!(matches!(inverted, Err(BleepError::ExtractionFailed { .. })));
    }

    #[test]
    fn test_output_path_uses_movie_name_and_id() {
        let extractor = SegmentExtractor::new(
            Arc::new(MockMediaProcessorTrait::new()),
            extraction_config(Path::new("/sounds"), DurationMode::StopTime),
        );
        assert_eq!(extractor.output_path("Heat", 42), PathBuf::from("/sounds/Heat-42.mp3"));
        assert_eq!(extractor.output_path("a/b", 1), PathBuf::from("/sounds/a_b-1.mp3"));
        assert_eq!(extractor.output_path("  ", 1), PathBuf::from("/sounds/movie-1.mp3"));
    }

    #[tokio::test]
    async fn test_extract_one_builds_request_and_returns_segment() {
        let dir = tempfile::tempdir().unwrap();
        let mut media = MockMediaProcessorTrait::new();
        media
            .expect_extract_segment()
            .withf(|req| {
                req.start == "00:00:05.250"
                    && req.duration == "00:00:07.000"
                    && req.video_path == PathBuf::from("/movies/heat.mp4")
            })
            .times(1)
            .returning(|req| {
                std::fs::write(&req.output_path, b"ID3")?;
                Ok(())
            });

        let extractor = SegmentExtractor::new(
            Arc::new(media),
            extraction_config(dir.path(), DurationMode::StopTime),
        );
        let allocator = sequential();

        let segment = extractor
            .extract_one(
                Path::new("/movies/heat.mp4"),
                &detection("00:00:05.250", "00:00:07.000"),
                "heat",
                &allocator,
            )
            .await
            .unwrap();

        assert_eq!(segment.audio_path, dir.path().join("heat-1.mp3"));
        assert_eq!(segment.detection.word, "hell");
        assert!(segment.audio_path.exists());
    }

    #[tokio::test]
    async fn test_failure_carries_reason_and_wastes_the_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut media = MockMediaProcessorTrait::new();
        media
            .expect_extract_segment()
            .returning(|_| Err(BleepError::extraction("Invalid data found when processing input")));

        let extractor = SegmentExtractor::new(
            Arc::new(media),
            extraction_config(dir.path(), DurationMode::StopTime),
        );
        let allocator: Mutex<Box<dyn IdAllocator>> =
            Mutex::new(Box::new(RandomIdAllocator::seeded(1..=1000, 100, 9)));

        let result = extractor
            .extract_one(
                Path::new("/movies/heat.mp4"),
                &detection("00:00:01.000", "00:00:02.000"),
                "heat",
                &allocator,
            )
            .await;

        match result {
            Err(BleepError::ExtractionFailed { reason }) => {
                assert!(reason.contains("Invalid data found"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(allocator.lock().unwrap().allocated(), 1);
    }

    #[tokio::test]
    async fn test_success_without_output_file_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_segment().returning(|_| Ok(()));

        let extractor = SegmentExtractor::new(
            Arc::new(media),
            extraction_config(dir.path(), DurationMode::StopTime),
        );

        let result = extractor
            .extract_one(
                Path::new("/movies/heat.mp4"),
                &detection("00:00:01.000", "00:00:02.000"),
                "heat",
                &sequential(),
            )
            .await;
        assert!(matches!(result, Err(BleepError::ExtractionFailed { .. })));
    }
}
