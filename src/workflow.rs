use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, BleepError};
use crate::extract::{file_stem_for, AudioSegment, ExtractionFailure, ExtractionOrchestrator};
use crate::matcher::{scan_file, Match};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::store::SpeechStore;
use crate::transcribe::{BatchItemResult, SpeechService, TranscriberFactory};

const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mkv", "avi", "mov", "webm", "m4v"];

/// Inputs for one movie
#[derive(Debug, Clone)]
pub struct MovieJob {
    pub movie_name: String,
    pub video_path: PathBuf,
    pub subtitle_path: PathBuf,
    pub words: Vec<String>,
}

/// Everything one detection run produced for a movie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    pub run_id: Uuid,
    pub movie_name: String,
    pub generated_at: DateTime<Utc>,
    pub video_path: PathBuf,
    pub subtitle_path: PathBuf,
    pub words: Vec<String>,
    pub matches: Vec<Match>,
    pub segments: Vec<AudioSegment>,
    pub failures: Vec<ExtractionFailure>,
    pub speech: Vec<BatchItemResult>,
}

pub struct Workflow {
    config: Config,
    media: Arc<dyn MediaProcessorTrait>,
    orchestrator: ExtractionOrchestrator,
    speech: SpeechService,
}

impl Workflow {
    pub fn new(config: Config, store: Arc<dyn SpeechStore>) -> Result<Self> {
        let timeout = match config.extraction.timeout_secs {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        };
        let media = MediaProcessorFactory::create_processor(config.media.clone(), timeout);

        // Check dependencies
        media.check_availability()?;

        Ok(Self::with_media(config, media, store))
    }

    /// Build a workflow around an existing media processor
    pub fn with_media(
        config: Config,
        media: Arc<dyn MediaProcessorTrait>,
        store: Arc<dyn SpeechStore>,
    ) -> Self {
        let orchestrator = ExtractionOrchestrator::new(Arc::clone(&media), config.extraction.clone());
        let speech = SpeechService::new(TranscriberFactory::create_default(), store);

        Self {
            config,
            media,
            orchestrator,
            speech,
        }
    }

    pub async fn media_version(&self) -> Result<String> {
        self.media.get_version_info().await
    }

    /// Match the word list against a subtitle file off the async runtime
    pub async fn scan_subtitles(&self, subtitle_path: &Path, words: &[String]) -> Result<Vec<Match>> {
        let subtitle_path = subtitle_path.to_path_buf();
        let words = words.to_vec();

        tokio::task::spawn_blocking(move || scan_file(&subtitle_path, &words))
            .await
            .map_err(|e| BleepError::Io(std::io::Error::other(e)))?
    }

    /// Scan, extract, confirm, and write the report for one movie
    pub async fn process_movie(&self, job: &MovieJob) -> Result<DetectionReport> {
        info!("Processing movie: {}", job.movie_name);

        if !job.video_path.is_file() {
            return Err(BleepError::SourceUnavailable(format!(
                "video not found: {}",
                job.video_path.display()
            )));
        }

        // Step 1: Find words in the subtitles
        let matches = self.scan_subtitles(&job.subtitle_path, &job.words).await?;

        // Step 2: Cut one clip per match
        let outcome = self
            .orchestrator
            .extract_all_with_failures(&job.video_path, &matches, &job.movie_name)
            .await?;

        // Step 3: Confirm each clip through the speech service
        let mut speech = Vec::with_capacity(outcome.segments.len());
        for segment in &outcome.segments {
            let audio_file = segment.audio_path.display().to_string();
            let words = std::slice::from_ref(&segment.detection.word);
            match self
                .speech
                .process_audio(&job.movie_name, Some(&segment.audio_path), words)
                .await
            {
                Ok(report) => speech.push(BatchItemResult::Processed(report)),
                Err(e) => {
                    warn!("Speech confirmation failed for {}: {}", audio_file, e);
                    speech.push(BatchItemResult::failed(&audio_file, e.to_string()));
                }
            }
        }

        let report = DetectionReport {
            run_id: Uuid::new_v4(),
            movie_name: job.movie_name.clone(),
            generated_at: Utc::now(),
            video_path: job.video_path.clone(),
            subtitle_path: job.subtitle_path.clone(),
            words: job.words.clone(),
            matches,
            segments: outcome.segments,
            failures: outcome.failures,
            speech,
        };

        let report_path = self.write_report(&report).await?;
        info!(
            "Movie {} done: {} matches, {} segments, report at {}",
            report.movie_name,
            report.matches.len(),
            report.segments.len(),
            report_path.display()
        );
        Ok(report)
    }

    /// Process every video in a directory that has a subtitle file next to it
    pub async fn process_directory<P: AsRef<Path>>(
        &self,
        input_dir: P,
        words: &[String],
    ) -> Result<Vec<DetectionReport>> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(BleepError::Config("Input path is not a directory".to_string()));
        }

        let jobs = find_movie_jobs(input_dir, words);
        info!("Found {} movies with subtitles to process", jobs.len());

        let mut reports = Vec::with_capacity(jobs.len());
        for job in jobs {
            match self.process_movie(&job).await {
                Ok(report) => {
                    info!("Successfully processed: {}", job.video_path.display());
                    reports.push(report);
                }
                Err(e) => warn!("Failed to process {}: {}", job.video_path.display(), e),
            }
        }

        Ok(reports)
    }

    async fn write_report(&self, report: &DetectionReport) -> Result<PathBuf> {
        let output_dir = &self.config.extraction.output_dir;
        fs::create_dir_all(output_dir).await?;

        let path = output_dir.join(format!("{}-report.json", file_stem_for(&report.movie_name)));
        fs::write(&path, serde_json::to_string_pretty(report)?).await?;
        Ok(path)
    }
}

/// Pair each video file with the `.srt` of the same stem.
///
/// Movie names are unique within the batch: videos in subdirectories are
/// prefixed with their relative directory, and remaining clashes get a
/// numeric suffix.
fn find_movie_jobs(input_dir: &Path, words: &[String]) -> Vec<MovieJob> {
    let mut jobs = Vec::new();
    let mut taken = HashSet::new();

    for entry in WalkDir::new(input_dir).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let is_video = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !is_video {
            continue;
        }

        let subtitle_path = path.with_extension("srt");
        if !subtitle_path.is_file() {
            warn!("Skipping {}: no subtitle file found", path.display());
            continue;
        }

        let movie_name = unique_name(batch_movie_name(input_dir, path), &mut taken);

        jobs.push(MovieJob {
            movie_name,
            video_path: path.to_path_buf(),
            subtitle_path,
            words: words.to_vec(),
        });
    }

    jobs
}

fn batch_movie_name(input_dir: &Path, video_path: &Path) -> String {
    let stem = video_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "movie".to_string());

    let parents: Vec<String> = video_path
        .parent()
        .and_then(|parent| parent.strip_prefix(input_dir).ok())
        .map(|relative| {
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();

    if parents.is_empty() {
        stem
    } else {
        format!("{}_{}", parents.join("_"), stem)
    }
}

fn unique_name(base: String, taken: &mut HashSet<String>) -> String {
    let base = file_stem_for(&base);
    let mut name = base.clone();
    let mut suffix = 2;
    while !taken.insert(name.clone()) {
        name = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    name
}
