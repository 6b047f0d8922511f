/// Formats elapsed session seconds as zero padded `HH:MM:SS`.
pub fn format_session_clock(t: f64) -> String {
    let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
    let hours = (t / 3600.0).floor() as u64;
    let minutes = ((t % 3600.0) / 60.0).floor() as u64;
    let seconds = (t % 60.0).floor() as u64;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Time and lap line drawn on the canvas, e.g. `00:01:05  Lap 3/57`
pub fn hud_text(t: f64, lap: u32, total_laps: u32) -> String {
    format!("{}  Lap {}/{}", format_session_clock(t), lap, total_laps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_session_clock() {
        assert_eq!(format_session_clock(0.0), "00:00:00");
        assert_eq!(format_session_clock(65.9), "00:01:05");
        assert_eq!(format_session_clock(3600.0 * 2.0 + 61.0), "02:01:01");
    }

    #[test]
    fn test_format_session_clock_rejects_garbage() {
        assert_eq!(format_session_clock(-12.0), "00:00:00");
        assert_eq!(format_session_clock(f64::NAN), "00:00:00");
    }

    #[test]
    fn test_hud_text() {
        assert_eq!(hud_text(65.0, 1, 57), "00:01:05  Lap 1/57");
    }
}
