use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::{BleepError, Result};
use crate::words::{load_word_list, parse_word_list};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the word list comes from
#[derive(clap::Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct WordSource {
    /// Words to look for (comma-separated)
    #[arg(short, long)]
    pub words: Option<String>,

    /// File with one word per line
    #[arg(long)]
    pub words_file: Option<PathBuf>,
}

impl WordSource {
    pub fn resolve(&self) -> Result<Vec<String>> {
        let words = match (&self.words, &self.words_file) {
            (Some(list), _) => parse_word_list(list),
            (None, Some(path)) => load_word_list(path)?,
            (None, None) => Vec::new(),
        };

        if words.is_empty() {
            return Err(BleepError::Config("Word list is empty".to_string()));
        }
        Ok(words)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find words in a subtitle file and print the matches
    Scan {
        /// Subtitle file (SRT)
        #[arg(short, long)]
        subtitles: PathBuf,

        #[command(flatten)]
        words: WordSource,
    },

    /// Detect words in one movie and cut an audio clip per match
    Detect {
        /// Input video file
        #[arg(long)]
        video: PathBuf,

        /// Subtitle file (SRT)
        #[arg(short, long)]
        subtitles: PathBuf,

        /// Name used for clip files and stored results (defaults to the video file stem)
        #[arg(short, long)]
        movie_name: Option<String>,

        /// Output directory for audio clips and the report
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// How clip length is derived: stop-time or span
        #[arg(long)]
        duration_mode: Option<String>,

        #[command(flatten)]
        words: WordSource,
    },

    /// Process every video in a directory that has a matching .srt file
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for audio clips and reports
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        words: WordSource,
    },

    /// Run the mock speech service over a word list and store the records
    Simulate {
        /// Movie the records belong to
        #[arg(short, long)]
        movie_name: String,

        #[command(flatten)]
        words: WordSource,
    },

    /// Print stored speech results for a movie
    Results {
        /// Movie to look up
        #[arg(short, long)]
        movie_name: String,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}
