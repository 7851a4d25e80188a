use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, BleepError};

// Default values for fields added after the first config format
fn default_timeout_secs() -> u64 {
    300
}

fn default_max_allocation_attempts() -> u32 {
    10_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub media: MediaConfig,
    pub extraction: ExtractionConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Audio encoder used for extracted clips
    pub audio_codec: String,
    /// Audio bitrate passed to the encoder
    pub audio_bitrate: String,
    /// Additional options appended before the output path
    /// Common options: ["-ar", "44100", "-ac", "2"]
    pub extra_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Directory receiving extracted audio clips and detection reports
    pub output_dir: PathBuf,
    /// File extension of extracted clips
    pub file_extension: String,
    /// How file ids are handed out within a batch
    pub naming: NamingStrategy,
    /// Smallest id the allocator may return
    pub id_range_min: u32,
    /// Largest id the allocator may return
    pub id_range_max: u32,
    /// Random draws allowed per allocation before giving up
    #[serde(default = "default_max_allocation_attempts")]
    pub max_allocation_attempts: u32,
    /// How the clip duration is derived from a match
    pub duration_mode: DurationMode,
    /// Per-clip ffmpeg timeout in seconds, 0 waits forever
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Show a progress bar while clips are extracted
    #[serde(default)]
    pub show_progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingStrategy {
    /// Random: Draw ids from the configured range, retrying on collision
    Random,
    /// Sequential: Hand out ids in increasing order starting at the range minimum
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationMode {
    /// StopTime: Pass the match's absolute stop time as the clip duration
    StopTime,
    /// Span: Use stop time minus start time as the clip duration
    Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding speech records per movie
    pub speech_results_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                audio_codec: "libmp3lame".to_string(),
                audio_bitrate: "320k".to_string(),
                extra_options: vec![],
            },
            extraction: ExtractionConfig {
                output_dir: PathBuf::from("sounds"),
                file_extension: "mp3".to_string(),
                naming: NamingStrategy::Random,
                id_range_min: 1,
                id_range_max: 1000,
                max_allocation_attempts: default_max_allocation_attempts(),
                duration_mode: DurationMode::StopTime,
                timeout_secs: default_timeout_secs(),
                show_progress: false,
            },
            storage: StorageConfig {
                speech_results_path: PathBuf::from(".bleep/speech_results.json"),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BleepError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| BleepError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| BleepError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BleepError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| BleepError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let extraction = &self.extraction;
        if extraction.id_range_min > extraction.id_range_max {
            return Err(BleepError::Config(format!(
                "id_range_min ({}) must not exceed id_range_max ({})",
                extraction.id_range_min, extraction.id_range_max
            )));
        }
        if extraction.max_allocation_attempts == 0 {
            return Err(BleepError::Config(
                "max_allocation_attempts must be at least 1".to_string(),
            ));
        }
        if extraction.file_extension.trim().is_empty() {
            return Err(BleepError::Config("file_extension must not be empty".to_string()));
        }
        Ok(())
    }
}
