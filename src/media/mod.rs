// Media processing architecture
//
// This module provides an abstraction over the external ffmpeg process:
// - Processor: Main implementation running ffmpeg
// - Commands: Command builders and abstractions

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Cut one audio clip out of a video.
    ///
    /// Fails with `ExtractionFailed` carrying the process diagnostics.
    async fn extract_segment(&self, request: &SegmentRequest) -> Result<()>;

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()>;

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig, timeout: Option<Duration>) -> Arc<dyn MediaProcessorTrait> {
        Arc::new(processor::MediaProcessorImpl::new(config, timeout))
    }
}
