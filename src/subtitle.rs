use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, BleepError};

static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})[,.](\d{1,3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{1,3})")
        .expect("timing regex is valid")
});

// A blank row may still carry spaces or tabs
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n[ \t]*\n").expect("block separator regex is valid")
});

static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})(?:[,.](\d{1,3}))?$").expect("timestamp regex is valid")
});

/// One timed entry of a subtitle track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleLine {
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

/// Load an SRT file into ordered subtitle lines
pub fn load_srt<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleLine>> {
    let path = path.as_ref();
    info!("Reading subtitles: {}", path.display());

    let bytes = std::fs::read(path).map_err(|e| {
        BleepError::SourceUnavailable(format!("cannot read subtitle file {}: {}", path.display(), e))
    })?;

    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    let content = String::from_utf8_lossy(bytes);

    let lines = parse_srt(&content).map_err(|e| match e {
        BleepError::SourceUnavailable(msg) => {
            BleepError::SourceUnavailable(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })?;

    info!("Loaded {} subtitle lines", lines.len());
    Ok(lines)
}

/// Parse SRT content. Blocks without a timing line are skipped.
pub fn parse_srt(content: &str) -> Result<Vec<SubtitleLine>> {
    let normalized = content.replace("\r\n", "\n");
    let mut lines = Vec::new();
    let mut skipped = 0usize;

    for block in BLOCK_SEPARATOR.split(&normalized) {
        let mut rows = block.lines().map(str::trim).filter(|row| !row.is_empty()).peekable();

        let Some(first) = rows.peek().copied() else {
            continue;
        };

        let mut index = lines.len() + 1;
        if let Ok(number) = first.parse::<usize>() {
            index = number;
            rows.next();
        }

        let timing = rows.next().and_then(|row| TIMING_REGEX.captures(row));
        let Some(caps) = timing else {
            skipped += 1;
            warn!("Skipping subtitle block without timing line: {:?}", first);
            continue;
        };

        let start = duration_from_captures(&caps, 1);
        let end = duration_from_captures(&caps, 5);
        let text = rows.collect::<Vec<_>>().join("\n");

        debug!("Subtitle {} {:?} -> {:?}", index, start, end);
        lines.push(SubtitleLine { index, start, end, text });
    }

    if lines.is_empty() && skipped > 0 {
        return Err(BleepError::SourceUnavailable(
            "no valid subtitle entries found".to_string(),
        ));
    }

    Ok(lines)
}

fn duration_from_captures(caps: &regex::Captures, start_idx: usize) -> Duration {
    let number = |idx: usize| -> u64 {
        caps.get(idx).map_or(0, |m| m.as_str().parse().unwrap_or(0))
    };
    let millis = caps
        .get(start_idx + 3)
        .map_or(0, |m| fraction_to_millis(m.as_str()));

    Duration::from_millis(
        (number(start_idx) * 3600 + number(start_idx + 1) * 60 + number(start_idx + 2)) * 1000 + millis,
    )
}

// "5" means 500ms, "25" means 250ms
fn fraction_to_millis(fraction: &str) -> u64 {
    let value: u64 = fraction.parse().unwrap_or(0);
    match fraction.len() {
        1 => value * 100,
        2 => value * 10,
        _ => value,
    }
}

/// Parse `HH:MM:SS,mmm` or `HH:MM:SS.mmm` into a duration
pub fn parse_timestamp(timestamp: &str) -> Result<Duration> {
    let caps = TIMESTAMP_REGEX
        .captures(timestamp.trim())
        .ok_or_else(|| BleepError::SourceUnavailable(format!("invalid timestamp: {}", timestamp)))?;

    Ok(duration_from_captures(&caps, 1))
}

/// Format a duration to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(time: Duration) -> String {
    let total_milliseconds = time.as_millis() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Format a duration with a point as fractional separator (HH:MM:SS.mmm)
pub fn format_timestamp(time: Duration) -> String {
    format_srt_time(time).replace(',', ".")
}
