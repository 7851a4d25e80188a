use async_trait::async_trait;
use std::process::Command;
use std::time::Duration;
use tracing::{info, debug};

use crate::config::MediaConfig;
use crate::error::{Result, BleepError};
use super::{MediaProcessorTrait, MediaCommandBuilder, SegmentRequest};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
    timeout: Option<Duration>,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig, timeout: Option<Duration>) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
            timeout,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    /// Cut one audio clip out of a video
    async fn extract_segment(&self, request: &SegmentRequest) -> Result<()> {
        debug!(
            "Extracting {} (+{}) from {} to {}",
            request.start,
            request.duration,
            request.video_path.display(),
            request.output_path.display()
        );

        let command = self
            .command_builder
            .extract_segment(
                request,
                &self.config.audio_codec,
                &self.config.audio_bitrate,
                &self.config.extra_options,
            )
            .with_timeout(self.timeout);

        command.execute().await.map_err(|e| match e {
            BleepError::Media(reason) => BleepError::ExtractionFailed { reason },
            other => other,
        })?;

        Ok(())
    }

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| BleepError::Media(format!("Media processor not found: {}", e)))?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(BleepError::Media("Media processor version check failed".to_string()))
        }
    }

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let stdout = self.command_builder.version_check().execute().await?;
        // The first line carries the version
        let first_line = stdout.lines().next().unwrap_or("Unknown version");
        Ok(first_line.to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config_with_binary(binary: &str) -> MediaConfig {
        MediaConfig {
            binary_path: binary.to_string(),
            audio_codec: "libmp3lame".to_string(),
            audio_bitrate: "320k".to_string(),
            extra_options: vec![],
        }
    }

    fn request() -> SegmentRequest {
        SegmentRequest {
            video_path: PathBuf::from("/movies/heat.mp4"),
            start: "00:00:01.000".to_string(),
            duration: "00:00:02.000".to_string(),
            output_path: PathBuf::from("/tmp/heat-1.mp3"),
        }
    }

    #[tokio::test]
    async fn test_failed_process_becomes_extraction_failed() {
        let processor = MediaProcessorImpl::new(config_with_binary("false"), None);
        let result = processor.extract_segment(&request()).await;
        assert!(matches!(result, Err(BleepError::ExtractionFailed { .. })));
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let processor = MediaProcessorImpl::new(config_with_binary("/no/such/ffmpeg"), None);
        assert!(matches!(processor.check_availability(), Err(BleepError::Media(_))));
    }
}
