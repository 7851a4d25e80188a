//! Bleep - Subtitle word detection and audio clip extraction
//!
//! Scans SRT subtitles for a list of words, cuts an audio clip for every match
//! out of the movie with ffmpeg, and runs the clips through a speech
//! confirmation stage whose results are kept per movie.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod media;
pub mod store;
pub mod subtitle;
pub mod transcribe;
pub mod words;
pub mod workflow;
