//! Progress persistence - watch-position records in host key-value storage
//!
//! Records are JSON objects stored under one key per video:
//!
//! ```text
//! vsl_progress_<base36 hash of source URL>  ->  {"videoSrc", "currentTime", "duration", "timestamp"}
//! ```
//!
//! Storage failures never escape this module; they are logged and treated
//! as "no saved progress".

use crate::{config::PlayerConfig, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

/// Prefix for derived storage keys
pub const STORAGE_NAMESPACE: &str = "vsl_progress_";

/// A saved position must be past this many seconds to be offered for resume
pub const RESUME_MIN_POSITION: f64 = 3.0;

/// A saved position must be before this fraction of the duration to be offered for resume
pub const RESUME_MAX_FRACTION: f64 = 0.95;

/// Cadence of the periodic save while playing
pub const SAVE_INTERVAL: Duration = Duration::from_secs(1);

/// Saved watch position for one video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Source the position belongs to
    pub video_src: String,
    /// Last position in seconds
    pub current_time: f64,
    /// Total duration in seconds; `null` on the wire while unknown
    #[serde(deserialize_with = "nullable_seconds")]
    pub duration: f64,
    /// Save time, milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl ProgressRecord {
    /// Create a record stamped with the current time
    pub fn new(video_src: impl Into<String>, current_time: f64, duration: f64) -> Self {
        Self {
            video_src: video_src.into(),
            current_time,
            duration,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Whether this position is worth offering for resume
    pub fn is_resumable(&self) -> bool {
        self.current_time > RESUME_MIN_POSITION
            && self.current_time < self.duration * RESUME_MAX_FRACTION
    }

    /// Save time as a date, if the stamp is in range
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

fn nullable_seconds<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// 32-bit rolling hash (`h * 31 + c` over UTF-16 code units) rendered in base 36
pub fn source_hash(video_src: &str) -> String {
    let hash = video_src
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32));
    to_base36(i64::from(hash).unsigned_abs())
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(char::from(DIGITS[(value % 36) as usize]));
        value /= 36;
    }
    digits.iter().rev().collect()
}

/// Storage key for a config: the explicit override, else the namespaced source hash
pub fn storage_key(config: &PlayerConfig) -> String {
    match config.persistence_key_override() {
        Some(key) => key.to_string(),
        None => format!("{}{}", STORAGE_NAMESPACE, source_hash(&config.video_src)),
    }
}

/// Host key-value storage for progress records
pub trait ProgressStorage {
    /// Read the record under `key`; `Ok(None)` when absent
    fn read(&self, key: &str) -> Result<Option<ProgressRecord>>;

    /// Overwrite the record under `key`
    fn write(&self, key: &str, record: &ProgressRecord) -> Result<()>;

    /// Remove `key`
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory storage holding raw JSON strings.
///
/// Clones share the same entries, so a test can keep a handle while the
/// player owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value, bypassing serialization
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
    }

    /// Raw value under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Make subsequent writes fail like a full quota
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl ProgressStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<ProgressRecord>> {
        match self.entries.borrow().get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, record: &ProgressRecord) -> Result<()> {
        if self.fail_writes.get() {
            return Err(Error::StorageWrite("quota exceeded".into()));
        }
        let raw = serde_json::to_string(record)?;
        self.entries.borrow_mut().insert(key.to_string(), raw);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Progress persistence for one player instance
pub struct ProgressStore<S> {
    storage: S,
    key: String,
    enabled: bool,
}

impl<S: ProgressStorage> ProgressStore<S> {
    pub fn new(storage: S, key: impl Into<String>, enabled: bool) -> Self {
        Self {
            storage,
            key: key.into(),
            enabled,
        }
    }

    /// Build the store for a player config
    pub fn for_config(storage: S, config: &PlayerConfig) -> Self {
        Self::new(storage, storage_key(config), config.save_progress)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Write the current position. Returns whether a record was written.
    pub fn save(&self, video_src: &str, position: f64, duration: f64) -> bool {
        if !self.enabled {
            return false;
        }

        let record = ProgressRecord::new(video_src, position, duration);
        match self.storage.write(&self.key, &record) {
            Ok(()) => {
                debug!(
                    key = %self.key,
                    position = position.floor(),
                    duration = duration.floor(),
                    "Progress saved"
                );
                true
            }
            Err(e) => {
                warn!(key = %self.key, code = e.error_code(), error = %e, "Failed to save progress");
                false
            }
        }
    }

    /// Read the stored record; `None` when absent or unreadable
    pub fn load(&self) -> Option<ProgressRecord> {
        match self.storage.read(&self.key) {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %self.key, code = e.error_code(), error = %e, "Failed to read saved progress");
                None
            }
        }
    }

    /// Stored record, only if it passes the resume threshold
    pub fn load_resumable(&self) -> Option<ProgressRecord> {
        let record = self.load()?;
        debug!(
            key = %self.key,
            position = record.current_time,
            duration = record.duration,
            "Checking saved progress"
        );
        record.is_resumable().then_some(record)
    }

    /// Drop the stored record
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(&self.key) {
            warn!(key = %self.key, code = e.error_code(), error = %e, "Failed to clear progress");
        }
    }
}

/// Bookkeeping for the periodic save timer.
///
/// The rendering adapter owns the actual interval and mirrors this state,
/// which keeps at most one timer alive per instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveTimer {
    running: bool,
}

impl SaveTimer {
    /// Start the timer. Returns false if it was already running.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.running, true)
    }

    /// Stop the timer. Returns whether it was running.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_hash_known_values() {
        // "a" = 97 = "2p" in base 36
        assert_eq!(source_hash("a"), "2p");
        // "ab" = 97 * 31 + 98 = 3105 = "2e9"
        assert_eq!(source_hash("ab"), "2e9");
        assert_eq!(source_hash(""), "0");
    }

    #[test]
    fn test_base36_digits() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        // |i32::MIN|
        assert_eq!(to_base36(1 << 31), "zik0zk");
    }

    #[test]
    fn test_source_hash_is_deterministic() {
        let src = "https://cdn.example.com/videos/offer/master.m3u8";
        assert_eq!(source_hash(src), source_hash(src));
        assert_ne!(source_hash(src), source_hash("https://cdn.example.com/other.m3u8"));
    }

    #[test]
    fn test_source_hash_wraps_to_32_bits() {
        // Long inputs overflow i32 many times over; the result stays within |i32::MIN|
        let src = "https://example.com/".repeat(50);
        let hash = u64::from_str_radix(&source_hash(&src), 36).unwrap();
        assert!(hash <= 2_147_483_648);
    }

    #[test]
    fn test_storage_key() {
        let config = PlayerConfig::new("a");
        assert_eq!(storage_key(&config), "vsl_progress_2p");

        let config = PlayerConfig {
            persistence_key: Some("landing-v2".into()),
            ..PlayerConfig::new("a")
        };
        assert_eq!(storage_key(&config), "landing-v2");
    }

    #[test]
    fn test_resume_threshold() {
        assert!(ProgressRecord::new("v", 3.5, 100.0).is_resumable());
        assert!(ProgressRecord::new("v", 94.9, 100.0).is_resumable());
        assert!(!ProgressRecord::new("v", 3.0, 100.0).is_resumable());
        assert!(!ProgressRecord::new("v", 95.0, 100.0).is_resumable());
        assert!(!ProgressRecord::new("v", 10.0, f64::NAN).is_resumable());
    }

    #[test]
    fn test_record_wire_format() {
        let record = ProgressRecord {
            video_src: "v.mp4".into(),
            current_time: 12.5,
            duration: 60.0,
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"videoSrc":"v.mp4","currentTime":12.5,"duration":60.0,"timestamp":1700000000000}"#
        );
        assert!(record.saved_at().is_some());
    }

    #[test]
    fn test_save_load_clear() {
        let storage = MemoryStorage::new();
        let store = ProgressStore::new(storage.clone(), "k", true);

        assert!(store.save("v.mp4", 42.0, 120.0));
        let record = store.load().unwrap();
        assert_eq!(record.current_time, 42.0);
        assert_eq!(record.duration, 120.0);
        assert!(store.load_resumable().is_some());

        store.clear();
        assert!(store.load().is_none());
        assert!(!storage.contains("k"));
    }

    #[test]
    fn test_disabled_store_never_writes() {
        let storage = MemoryStorage::new();
        let store = ProgressStore::new(storage.clone(), "k", false);
        assert!(!store.save("v.mp4", 42.0, 120.0));
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_corrupt_record_is_treated_as_missing() {
        let storage = MemoryStorage::new();
        storage.insert_raw("k", "{not json");
        let store = ProgressStore::new(storage, "k", true);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_unknown_duration_is_not_resumable() {
        let storage = MemoryStorage::new();
        let store = ProgressStore::new(storage.clone(), "k", true);
        assert!(store.save("v.mp4", 42.0, f64::NAN));
        assert!(storage.raw("k").unwrap().contains("\"duration\":null"));
        assert!(store.load().unwrap().duration.is_nan());
        assert!(store.load_resumable().is_none());
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        let store = ProgressStore::new(storage.clone(), "k", true);
        assert!(!store.save("v.mp4", 42.0, 120.0));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_timer_single_instance() {
        let mut timer = SaveTimer::default();
        assert!(timer.start());
        assert!(!timer.start());
        assert!(timer.is_running());
        assert!(timer.stop());
        assert!(!timer.stop());
        assert!(!timer.is_running());
    }
}
