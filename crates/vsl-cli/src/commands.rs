//! CLI command implementations

use crate::output::{self, OutputFormat};
use anyhow::{anyhow, bail, Context};
use m3u8_rs::{MasterPlaylist, Playlist};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;
use tracing::debug;
use url::Url;
use vsl_core::format::{format_time, parse_clock};
use vsl_core::progress::{
    source_hash, storage_key, ProgressRecord, RESUME_MAX_FRACTION, RESUME_MIN_POSITION,
};
use vsl_core::quality::{resolve, QualityLevel, QualityPreference, QualitySelection};
use vsl_core::PlayerConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyReport {
    video_src: String,
    hash: String,
    key: String,
}

/// Print the storage key for a source
pub fn key(src: &str, persistence_key: Option<String>, format: &str) -> anyhow::Result<()> {
    let mut config = PlayerConfig::new(src);
    config.persistence_key = persistence_key;

    let report = KeyReport {
        video_src: src.to_string(),
        hash: source_hash(src),
        key: storage_key(&config),
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&report)?),
        OutputFormat::Table => println!("{}", output::table(&[report.as_row()])),
        OutputFormat::Text => println!("{}", report.key),
    }
    Ok(())
}

#[derive(Tabled)]
struct KeyRow {
    #[tabled(rename = "Source")]
    src: String,
    #[tabled(rename = "Hash")]
    hash: String,
    #[tabled(rename = "Key")]
    key: String,
}

impl KeyReport {
    fn as_row(&self) -> KeyRow {
        KeyRow {
            src: self.video_src.clone(),
            hash: self.hash.clone(),
            key: self.key.clone(),
        }
    }
}

/// Rendition ladder in the order the streaming engine exposes it: ascending bandwidth,
/// I-frame-only streams excluded
pub fn ladder(master: &MasterPlaylist) -> Vec<QualityLevel> {
    let mut variants: Vec<_> = master.variants.iter().filter(|v| !v.is_i_frame).collect();
    variants.sort_by_key(|v| v.bandwidth);

    variants
        .into_iter()
        .enumerate()
        .map(|(index, v)| {
            let (width, height) = v
                .resolution
                .map(|r| (r.width as u32, r.height as u32))
                .unwrap_or((0, 0));
            QualityLevel::new(index, height, width, v.bandwidth)
        })
        .collect()
}

/// Parse playlist text into a ladder. Media playlists have no ladder.
pub fn parse_ladder(content: &str) -> anyhow::Result<Vec<QualityLevel>> {
    match m3u8_rs::parse_playlist_res(content.as_bytes()) {
        Ok(Playlist::MasterPlaylist(master)) => Ok(ladder(&master)),
        Ok(Playlist::MediaPlaylist(_)) => {
            bail!("media playlist has a single rendition; quality selection stays on auto")
        }
        Err(e) => Err(anyhow!("failed to parse HLS playlist: {:?}", e)),
    }
}

async fn load_playlist(manifest: &str) -> anyhow::Result<String> {
    match Url::parse(manifest) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            debug!(url = %url, "fetching playlist");
            let response = reqwest::get(url.clone()).await?.error_for_status()?;
            Ok(response.text().await?)
        }
        _ => tokio::fs::read_to_string(manifest)
            .await
            .with_context(|| format!("reading {}", manifest)),
    }
}

#[derive(Serialize, Tabled)]
struct LevelRow {
    #[tabled(rename = "")]
    #[serde(skip)]
    marker: &'static str,
    #[tabled(rename = "Index")]
    index: usize,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
    #[tabled(rename = "Bitrate")]
    bitrate: u64,
    #[tabled(skip)]
    selected: bool,
}

fn level_rows(levels: &[QualityLevel], selection: Option<QualitySelection>) -> Vec<LevelRow> {
    levels
        .iter()
        .map(|level| {
            let selected = selection == Some(QualitySelection::Fixed(level.index));
            LevelRow {
                marker: if selected { "*" } else { "" },
                index: level.index,
                label: level.label(),
                resolution: format!("{}x{}", level.width, level.height),
                bitrate: level.bitrate,
                selected,
            }
        })
        .collect()
}

fn describe(selection: Option<QualitySelection>) -> String {
    match selection {
        Some(QualitySelection::Auto) => "auto (adaptive)".to_string(),
        Some(QualitySelection::Fixed(index)) => format!("level {}", index),
        None => "nothing (no levels)".to_string(),
    }
}

/// Show a master playlist's ladder and what `quality` resolves to
pub async fn levels(manifest: &str, quality: &str, format: &str) -> anyhow::Result<()> {
    let preference: QualityPreference = quality.parse()?;
    let content = load_playlist(manifest).await?;
    let levels = parse_ladder(&content)?;
    let selection = resolve(&levels, preference);
    let rows = level_rows(&levels, selection);

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "manifest": manifest,
                "quality": preference.to_string(),
                "engineLevel": selection.map(|s| s.engine_level()),
                "levels": rows,
            });
            println!("{}", output::to_json(&report)?);
        }
        OutputFormat::Table => {
            println!("{}", output::table(&rows));
            println!("{} -> {}", preference, describe(selection));
        }
        OutputFormat::Text => {
            println!("Levels in {}:", manifest);
            for row in &rows {
                println!(
                    "  {}{}. {} ({}) {}bps",
                    if row.selected { "*" } else { " " },
                    row.index,
                    row.label,
                    row.resolution,
                    row.bitrate
                );
            }
            println!("\n{} -> {}", preference, describe(selection));
        }
    }

    Ok(())
}

/// What `check` inspects
pub enum CheckInput {
    Position { position: String, duration: String },
    Record(PathBuf),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport {
    position: f64,
    duration: Option<f64>,
    resumable: bool,
    reason: &'static str,
    saved_at: Option<String>,
}

/// Why a position is or is not offered for resume
pub fn resume_reason(record: &ProgressRecord) -> &'static str {
    if record.is_resumable() {
        "inside the resume window"
    } else if !record.duration.is_finite() {
        "duration unknown"
    } else if record.current_time <= RESUME_MIN_POSITION {
        "too close to the start"
    } else {
        "too close to the end"
    }
}

fn clock_arg(value: &str, name: &str) -> anyhow::Result<f64> {
    parse_clock(value).ok_or_else(|| anyhow!("invalid {} {:?}, expected seconds or M:SS", name, value))
}

/// Decide whether a position (or saved record) would get the resume overlay
pub fn check(input: CheckInput, format: &str) -> anyhow::Result<()> {
    let record = match input {
        CheckInput::Position { position, duration } => {
            ProgressRecord::new("", clock_arg(&position, "position")?, clock_arg(&duration, "duration")?)
        }
        CheckInput::Record(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
    };

    let report = CheckReport {
        position: record.current_time,
        duration: record.duration.is_finite().then_some(record.duration),
        resumable: record.is_resumable(),
        reason: resume_reason(&record),
        saved_at: record.saved_at().map(|t| t.to_rfc3339()),
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&report)?),
        OutputFormat::Table | OutputFormat::Text => {
            println!(
                "Position {} of {}",
                format_time(report.position),
                format_time(record.duration)
            );
            println!(
                "  Window: > {}s and < {:.0}% of duration",
                RESUME_MIN_POSITION,
                RESUME_MAX_FRACTION * 100.0
            );
            println!(
                "  Resume: {} ({})",
                if report.resumable { "yes" } else { "no" },
                report.reason
            );
            if let Some(saved_at) = &report.saved_at {
                println!("  Saved: {}", saved_at);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-STREAM-INF:BANDWIDTH=2800000,RESOLUTION=1280x720
720p.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360
360p.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=5000000,RESOLUTION=1920x1080
1080p.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=1400000,RESOLUTION=842x480
480p.m3u8
#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=90000,RESOLUTION=640x360,URI=\"iframe.m3u8\"
";

    #[test]
    fn test_ladder_sorted_by_bandwidth() {
        let levels = parse_ladder(MASTER).unwrap();

        let heights: Vec<u32> = levels.iter().map(|l| l.height).collect();
        assert_eq!(heights, vec![360, 480, 720, 1080]);
        let indices: Vec<usize> = levels.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(levels[2].width, 1280);
        assert_eq!(levels[2].bitrate, 2_800_000);
    }

    #[test]
    fn test_ladder_resolution() {
        let levels = parse_ladder(MASTER).unwrap();

        assert_eq!(resolve(&levels, "720p".parse().unwrap()), Some(QualitySelection::Fixed(2)));
        assert_eq!(resolve(&levels, "medium".parse().unwrap()), Some(QualitySelection::Fixed(2)));
        assert_eq!(resolve(&levels, "high".parse().unwrap()), Some(QualitySelection::Fixed(3)));
        assert_eq!(resolve(&levels, "auto".parse().unwrap()), Some(QualitySelection::Auto));

        let rows = level_rows(&levels, resolve(&levels, "low".parse().unwrap()));
        assert!(rows[0].selected);
        assert_eq!(rows[0].marker, "*");
        assert!(rows[1..].iter().all(|r| !r.selected));
    }

    #[test]
    fn test_media_playlist_rejected() {
        let media = "#EXTM3U
#EXT-X-TARGETDURATION:6
#EXTINF:6.0,
seg0.ts
#EXT-X-ENDLIST
";
        assert!(parse_ladder(media).is_err());
    }

    #[test]
    fn test_resume_reasons() {
        assert_eq!(resume_reason(&ProgressRecord::new("v", 30.0, 100.0)), "inside the resume window");
        assert_eq!(resume_reason(&ProgressRecord::new("v", 3.0, 100.0)), "too close to the start");
        assert_eq!(resume_reason(&ProgressRecord::new("v", 95.0, 100.0)), "too close to the end");
        assert_eq!(resume_reason(&ProgressRecord::new("v", 30.0, f64::NAN)), "duration unknown");
    }

    #[test]
    fn test_clock_arguments() {
        assert_eq!(clock_arg("1:05", "position").unwrap(), 65.0);
        assert_eq!(clock_arg("42.5", "position").unwrap(), 42.5);
        assert!(clock_arg("1:75", "position").is_err());
    }
}
