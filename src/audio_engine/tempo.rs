//! Tempo validation.
//!
//! User-facing tempo values arrive as whatever the host form holds at the time: numbers,
//! half-typed strings, or nothing at all. [`Tempo`] turns any of those into an effective
//! beats-per-minute value inside `TEMPO_MIN..=TEMPO_MAX` and derives the loop period from it.

use std::time::Duration;

use crate::audio_engine::constants::{TEMPO_DEFAULT, TEMPO_MAX, TEMPO_MIN};

/// An effective tempo in beats per minute, always within `TEMPO_MIN..=TEMPO_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tempo(u16);

impl Tempo {
    /// Rounds and clamps a numeric tempo. NaN resolves to the default tempo.
    pub fn from_bpm(bpm: f64) -> Self {
        if bpm.is_nan() {
            return Self::default();
        }

        let clamped = bpm.round().clamp(f64::from(TEMPO_MIN), f64::from(TEMPO_MAX));
        Self(clamped as u16)
    }

    /// Parses raw text from the host as an integer.
    ///
    /// Only the leading integer (optional sign followed by digits) counts, so `"140bpm"`
    /// gives 140 and `"90.6"` gives 90. Anything else, including an empty string,
    /// resolves to the default tempo.
    pub fn parse(text: &str) -> Self {
        match leading_integer(text.trim()) {
            Some(value) => Self::from_bpm(value),
            None => Self::default(),
        }
    }

    /// Tempo in beats per minute.
    pub fn bpm(self) -> u16 {
        self.0
    }

    /// Time between two clicks in seconds.
    pub fn beat_period_secs(self) -> f64 {
        60.0 / f64::from(self.0)
    }

    pub fn beat_period(self) -> Duration {
        Duration::from_secs_f64(self.beat_period_secs())
    }

    /// Loop end point in frames at `sample_rate`.
    pub fn loop_end_frames(self, sample_rate: u32) -> usize {
        (f64::from(sample_rate) * self.beat_period_secs()).round() as usize
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self(TEMPO_DEFAULT)
    }
}

fn leading_integer(text: &str) -> Option<f64> {
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1.0, &text[1..]),
        Some(b'+') => (1.0, &text[1..]),
        _ => (1.0, text),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Long digit runs parse as huge values and clamp to TEMPO_MAX.
    digits[..end].parse::<f64>().ok().map(|value| sign * value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bpm_in_range() {
        assert_eq!(Tempo::from_bpm(120.0).bpm(), 120);
        assert_eq!(Tempo::from_bpm(30.0).bpm(), 30);
        assert_eq!(Tempo::from_bpm(300.0).bpm(), 300);
    }

    #[test]
    fn test_from_bpm_rounds() {
        assert_eq!(Tempo::from_bpm(119.4).bpm(), 119);
        assert_eq!(Tempo::from_bpm(119.6).bpm(), 120);
    }

    #[test]
    fn test_from_bpm_clamps() {
        assert_eq!(Tempo::from_bpm(10.0).bpm(), 30);
        assert_eq!(Tempo::from_bpm(500.0).bpm(), 300);
        assert_eq!(Tempo::from_bpm(-80.0).bpm(), 30);
        assert_eq!(Tempo::from_bpm(f64::INFINITY).bpm(), 300);
        assert_eq!(Tempo::from_bpm(f64::NEG_INFINITY).bpm(), 30);
    }

    #[test]
    fn test_from_bpm_nan_uses_default() {
        assert_eq!(Tempo::from_bpm(f64::NAN), Tempo::default());
        assert_eq!(Tempo::default().bpm(), TEMPO_DEFAULT);
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(Tempo::parse("90").bpm(), 90);
        assert_eq!(Tempo::parse("  90 ").bpm(), 90);
        assert_eq!(Tempo::parse("90.6").bpm(), 90);
        assert_eq!(Tempo::parse("90.99").bpm(), 90);
        assert_eq!(Tempo::parse("2000").bpm(), 300);
        assert_eq!(Tempo::parse("5").bpm(), 30);
    }

    #[test]
    fn test_parse_leading_integer() {
        assert_eq!(Tempo::parse("140bpm").bpm(), 140);
        assert_eq!(Tempo::parse("+75 beats").bpm(), 75);
        assert_eq!(Tempo::parse("-12x").bpm(), 30);
        assert_eq!(Tempo::parse("99999999999999999999999999999999x").bpm(), 300);
        assert_eq!(Tempo::parse("1e3").bpm(), 30);
    }

    #[test]
    fn test_parse_garbage_uses_default() {
        assert_eq!(Tempo::parse(""), Tempo::default());
        assert_eq!(Tempo::parse("   "), Tempo::default());
        assert_eq!(Tempo::parse("fast"), Tempo::default());
        assert_eq!(Tempo::parse("-"), Tempo::default());
        assert_eq!(Tempo::parse("NaN"), Tempo::default());
        assert_eq!(Tempo::parse("inf"), Tempo::default());
        assert_eq!(Tempo::parse(".5"), Tempo::default());
    }

    #[test]
    fn test_beat_period() {
        assert!((Tempo::from_bpm(120.0).beat_period_secs() - 0.5).abs() < 1e-12);
        assert!((Tempo::from_bpm(60.0).beat_period_secs() - 1.0).abs() < 1e-12);
        assert!((Tempo::from_bpm(10.0).beat_period_secs() - 2.0).abs() < 1e-12);
        assert!((Tempo::from_bpm(500.0).beat_period_secs() - 0.2).abs() < 1e-12);
        assert_eq!(Tempo::from_bpm(60.0).beat_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_loop_end_frames() {
        assert_eq!(Tempo::from_bpm(120.0).loop_end_frames(48_000), 24_000);
        assert_eq!(Tempo::from_bpm(30.0).loop_end_frames(44_100), 88_200);
        assert_eq!(Tempo::from_bpm(300.0).loop_end_frames(44_100), 8_820);
        assert_eq!(Tempo::from_bpm(70.0).loop_end_frames(44_100), 37_800);
    }
}
