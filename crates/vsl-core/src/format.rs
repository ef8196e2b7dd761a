//! Clock formatting and progress-bar geometry

/// Format seconds as `M:SS`.
///
/// Minutes are unbounded, seconds are zero-padded. Non-finite input
/// (an unknown duration) renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "0:00".to_string();
    }
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}

/// Parse `M:SS` (or plain seconds) back into seconds
pub fn parse_clock(clock: &str) -> Option<f64> {
    let clock = clock.trim();
    match clock.split_once(':') {
        Some((minutes, secs)) => {
            let minutes: u64 = minutes.parse().ok()?;
            let secs: u64 = secs.parse().ok()?;
            if secs >= 60 {
                return None;
            }
            Some((minutes * 60 + secs) as f64)
        }
        None => clock.parse::<f64>().ok().filter(|s| s.is_finite() && *s >= 0.0),
    }
}

/// Linear playback fraction in `[0, 1]`, `0` when the duration is unknown
pub fn playback_fraction(position: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !position.is_finite() {
        return 0.0;
    }
    (position / duration).clamp(0.0, 1.0)
}

/// Progress-bar fill in percent: `(position / duration) ^ distortion * 100`.
///
/// Exponents below 1 front-load the bar so early progress looks larger.
pub fn progress_fill(position: f64, duration: f64, distortion: f64) -> f64 {
    playback_fraction(position, duration).powf(distortion) * 100.0
}

/// Buffered indicator width in percent
pub fn buffered_fill(buffered_end: f64, duration: f64) -> f64 {
    playback_fraction(buffered_end, duration) * 100.0
}

/// Fraction of the track under a click, `None` for a collapsed track
pub fn seek_fraction(click_x: f64, track_left: f64, track_width: f64) -> Option<f64> {
    if !track_width.is_finite() || track_width <= 0.0 {
        return None;
    }
    Some(((click_x - track_left) / track_width).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(59.9), "0:59");
        assert_eq!(format_time(3725.0), "62:05");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }

    #[test]
    fn test_format_is_stable_under_reparse() {
        for seconds in [0.0, 3.2, 59.0, 60.0, 65.7, 599.99, 7200.5] {
            let once = format_time(seconds);
            let twice = format_time(parse_clock(&once).unwrap());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("1:05"), Some(65.0));
        assert_eq!(parse_clock("42.5"), Some(42.5));
        assert_eq!(parse_clock("1:75"), None);
        assert_eq!(parse_clock("abc"), None);
    }

    #[test]
    fn test_progress_fill_distortion() {
        assert!((progress_fill(25.0, 100.0, 1.0) - 25.0).abs() < 1e-9);
        let expected = 0.25f64.powf(0.4) * 100.0;
        let fill = progress_fill(25.0, 100.0, 0.4);
        assert!((fill - expected).abs() < 1e-9);
        assert!(fill > 50.0);
        assert_eq!(progress_fill(100.0, 100.0, 0.4), 100.0);
    }

    #[test]
    fn test_progress_fill_unknown_duration() {
        assert_eq!(progress_fill(10.0, f64::NAN, 0.4), 0.0);
        assert_eq!(progress_fill(10.0, 0.0, 0.4), 0.0);
        assert_eq!(buffered_fill(30.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_seek_fraction() {
        assert_eq!(seek_fraction(150.0, 100.0, 200.0), Some(0.25));
        assert_eq!(seek_fraction(50.0, 100.0, 200.0), Some(0.0));
        assert_eq!(seek_fraction(150.0, 100.0, 0.0), None);
    }
}
