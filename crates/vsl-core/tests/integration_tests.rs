//! Integration tests for VSL Core

use vsl_core::{
    format::{parse_clock, progress_fill},
    format_time,
    progress::storage_key,
    quality,
    testing::{FakeEngine, FakeMedia},
    MediaElement, MediaEvent, MemoryStorage, Notification, Outcome, Overlay,
    PlaybackErrorKind, PlayerConfig, PlayerCore, ProgressRecord, ProgressStorage, ProgressStore,
    QualityLevel, QualityPreference, QualitySelection, Registry, Startup,
    UserAction,
};

const SRC: &str = "https://cdn.example.com/offer/master.m3u8";

fn levels(heights: &[u32]) -> Vec<QualityLevel> {
    heights
        .iter()
        .enumerate()
        .map(|(i, &h)| QualityLevel::new(i, h, h * 16 / 9, u64::from(h) * 3_000))
        .collect()
}

fn mount(
    config: PlayerConfig,
    storage: &MemoryStorage,
    duration: f64,
) -> (PlayerCore<FakeMedia, MemoryStorage>, FakeMedia) {
    let media = FakeMedia::new(duration);
    let core = PlayerCore::new(config, media.clone(), None, storage.clone()).unwrap();
    (core, media)
}

fn seed(storage: &MemoryStorage, config: &PlayerConfig, position: f64, duration: f64) {
    storage
        .write(&storage_key(config), &ProgressRecord::new(SRC, position, duration))
        .unwrap();
}

// =============================================================================
// Resume Tests
// =============================================================================

#[test]
fn test_resume_wins_over_autoplay_inside_window() {
    let duration = 300.0;
    for position in [3.01, 10.0, 150.0, 284.9] {
        let storage = MemoryStorage::new();
        let config = PlayerConfig {
            autoplay: true,
            ..PlayerConfig::new(SRC)
        };
        seed(&storage, &config, position, duration);

        let (mut core, _media) = mount(config, &storage, duration);
        assert_eq!(core.start(), Startup::Resume { position });
        assert_eq!(core.overlay(), Overlay::Resume);
    }
}

#[test]
fn test_outside_window_not_resumable() {
    let duration = 300.0;
    for position in [0.0, 2.0, 3.0, 285.0, 299.0] {
        let storage = MemoryStorage::new();
        let config = PlayerConfig::new(SRC);
        seed(&storage, &config, position, duration);

        let (mut core, _media) = mount(config, &storage, duration);
        assert_eq!(core.start(), Startup::Idle);
        assert_eq!(core.overlay(), Overlay::Hidden);
    }
}

#[test]
fn test_clear_then_reload_has_no_record() {
    let storage = MemoryStorage::new();
    let config = PlayerConfig::new(SRC);
    seed(&storage, &config, 60.0, 300.0);

    let store = ProgressStore::for_config(storage.clone(), &config);
    assert!(store.load_resumable().is_some());
    store.clear();

    let reloaded = ProgressStore::for_config(storage, &config);
    assert!(reloaded.load().is_none());
    assert!(reloaded.load_resumable().is_none());
}

#[test]
fn test_persistence_disabled_ignores_saved_record() {
    let storage = MemoryStorage::new();
    let config = PlayerConfig {
        save_progress: false,
        ..PlayerConfig::new(SRC)
    };
    seed(&storage, &config, 60.0, 300.0);

    let (mut core, _media) = mount(config, &storage, 300.0);
    assert_eq!(core.start(), Startup::Idle);
}

// =============================================================================
// Formatting Tests
// =============================================================================

#[test]
fn test_format_time() {
    assert_eq!(format_time(f64::NAN), "0:00");
    assert_eq!(format_time(65.0), "1:05");
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(3599.9), "59:59");
}

#[test]
fn test_format_time_reformat_is_stable() {
    for seconds in [0.0, 5.4, 59.0, 65.0, 600.0, 3725.0] {
        let once = format_time(seconds);
        let twice = format_time(parse_clock(&once).unwrap());
        assert_eq!(once, twice);
    }
}

#[test]
fn test_progress_distortion() {
    assert!((progress_fill(25.0, 100.0, 1.0) - 25.0).abs() < 1e-9);
    let expected = 0.25f64.powf(0.4) * 100.0;
    assert!((progress_fill(25.0, 100.0, 0.4) - expected).abs() < 1e-9);
    assert!(progress_fill(25.0, 100.0, 0.4) > 50.0);
}

// =============================================================================
// Controller Tests
// =============================================================================

#[test]
fn test_double_mute_restores_volume() {
    let storage = MemoryStorage::new();
    let (mut core, media) = mount(PlayerConfig::new(SRC), &storage, 120.0);

    core.handle_action(UserAction::SetVolume(0.63));
    core.handle_action(UserAction::ToggleMute);
    assert!(media.muted());
    core.handle_action(UserAction::ToggleMute);
    assert!(!media.muted());
    assert_eq!(media.volume(), 0.63);
}

// =============================================================================
// Quality Tests
// =============================================================================

#[test]
fn test_quality_resolution() {
    let ladder = levels(&[360, 480, 720, 1080]);
    assert_eq!(
        quality::resolve(&ladder, QualityPreference::Height(720)),
        Some(QualitySelection::Fixed(2))
    );
    assert_eq!(
        quality::resolve(&ladder, QualityPreference::Height(700)),
        Some(QualitySelection::Fixed(2))
    );
    assert_eq!(
        quality::resolve(&ladder, QualityPreference::Medium),
        Some(QualitySelection::Fixed(2))
    );
    assert_eq!(quality::resolve(&ladder, QualityPreference::Auto), Some(QualitySelection::Auto));
    assert_eq!(quality::resolve(&[], QualityPreference::High), None);
}

#[test]
fn test_quality_preference_from_options() {
    let config = PlayerConfig::from_json(
        r#"{"videoSrc":"https://cdn.example.com/a.m3u8","defaultQuality":"720p"}"#,
    )
    .unwrap();
    assert_eq!(config.default_quality, QualityPreference::Height(720));

    let config =
        PlayerConfig::from_json(r#"{"videoSrc":"https://cdn.example.com/a.m3u8","defaultQuality":480}"#)
            .unwrap();
    assert_eq!(config.default_quality, QualityPreference::Height(480));
}

#[test]
fn test_set_quality_through_core() {
    let engine = FakeEngine::with_heights(&[360, 480, 720, 1080]);
    let mut core = PlayerCore::new(
        PlayerConfig::new(SRC),
        FakeMedia::new(120.0),
        Some(Box::new(engine.clone())),
        MemoryStorage::new(),
    )
    .unwrap();

    core.handle_media_event(MediaEvent::Ready);
    assert_eq!(engine.current_level(), Some(-1));

    assert_eq!(core.set_quality(QualityPreference::Low), Some(QualitySelection::Fixed(0)));
    assert_eq!(engine.current_level(), Some(0));
    assert_eq!(core.quality_levels().len(), 4);
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_destroy_performs_exactly_one_save() {
    let storage = MemoryStorage::new();
    let (mut core, media) = mount(PlayerConfig::new(SRC), &storage, 300.0);

    core.handle_action(UserAction::TogglePlay);
    core.handle_media_event(MediaEvent::Play);
    assert!(core.save_timer_running());
    let before = storage.write_count();

    media.set_current_time(77.0);
    core.destroy();
    assert_eq!(storage.write_count(), before + 1);
    assert!(!core.save_timer_running());

    core.destroy();
    core.handle_media_event(MediaEvent::Pause);
    assert!(!core.tick());
    assert_eq!(storage.write_count(), before + 1);
}

#[test]
fn test_full_session() {
    let storage = MemoryStorage::new();
    let config = PlayerConfig::new(SRC);
    seed(&storage, &config, 42.0, 300.0);
    let (mut core, media) = mount(config.clone(), &storage, 300.0);

    assert_eq!(core.start(), Startup::Resume { position: 42.0 });
    assert_eq!(core.handle_action(UserAction::Resume), Outcome::Handled);
    core.handle_media_event(MediaEvent::Play);

    media.set_current_time(50.0);
    core.handle_media_event(MediaEvent::TimeUpdate);
    assert!(core.tick());

    core.handle_media_event(MediaEvent::Ended);
    assert!(!core.save_timer_running());
    assert!(!storage.contains(&storage_key(&config)));

    assert_eq!(
        core.take_notifications(),
        vec![
            Notification::Play,
            Notification::Progress {
                current_time: 50.0,
                duration: 300.0
            },
            Notification::Ended,
        ]
    );
}

#[test]
fn test_error_overlay_message() {
    let storage = MemoryStorage::new();
    let (mut core, _media) = mount(PlayerConfig::new(SRC), &storage, 300.0);

    core.handle_media_event(MediaEvent::Error(PlaybackErrorKind::from_media_error_code(3)));
    assert_eq!(
        core.view().overlay.error_message(),
        Some("Media error. The video format may not be supported.")
    );
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_registry_owns_players() {
    let storage = MemoryStorage::new();
    let mut registry = Registry::new();
    let (mut a, _) = mount(PlayerConfig::new(SRC), &storage, 100.0);
    let (b, _) = mount(PlayerConfig::new("https://cdn.example.com/b.mp4"), &storage, 100.0);

    a.destroy();
    let id_a = registry.register(a);
    let id_b = registry.register(b);
    assert_eq!(registry.len(), 2);

    let dropped = registry.prune(|p| !p.is_destroyed());
    assert_eq!(dropped.len(), 1);
    assert_eq!(registry.len(), 1);
    assert!(registry.get(id_a).is_none());
    assert!(registry.get(id_b).is_some());
}
