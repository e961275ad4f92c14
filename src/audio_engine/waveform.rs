//! Click waveform synthesis.
//!
//! The click is a decaying 440 Hz sine burst rendered once per engine into a silent
//! buffer long enough to hold the slowest beat. Only the loop end point changes with the
//! tempo; the samples themselves are never regenerated.

use std::f64::consts::TAU;
use std::sync::Arc;

use crate::audio_engine::constants::{
    CLICK_BUFFER_SECONDS, CLICK_FREQUENCY_HZ, CLICK_LENGTH_DIVISOR,
};

/// Immutable mono click buffer at a fixed sample rate.
#[derive(Debug, Clone)]
pub struct ClickWaveform {
    sample_rate: u32,
    samples: Arc<[f32]>,
}

impl ClickWaveform {
    /// Synthesizes the click at `sample_rate`.
    ///
    /// The buffer holds `CLICK_BUFFER_SECONDS` of audio. The first
    /// `sample_rate / CLICK_LENGTH_DIVISOR` samples carry a sine whose amplitude falls
    /// linearly from 1.0 towards 0.0; everything after that stays silent.
    pub fn synthesize(sample_rate: u32) -> Self {
        let len = sample_rate as usize * CLICK_BUFFER_SECONDS as usize;
        let populated_len = (sample_rate / CLICK_LENGTH_DIVISOR) as usize;
        let mut samples = vec![0.0f32; len];

        let phase_step = TAU * CLICK_FREQUENCY_HZ / f64::from(sample_rate.max(1));
        let decay = 1.0 / populated_len.max(1) as f64;
        let mut phase = 0.0f64;
        let mut amp = 1.0f64;

        for sample in samples.iter_mut().take(populated_len) {
            *sample = (phase.sin() * amp) as f32;
            phase += phase_step;
            if phase > TAU {
                phase -= TAU;
            }
            amp -= decay;
        }

        Self {
            sample_rate,
            samples: Arc::from(samples.into_boxed_slice()),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total buffer length in frames, including the silent tail.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of leading frames that carry the tone burst.
    #[cfg(test)]
    pub fn populated_len(&self) -> usize {
        (self.sample_rate / CLICK_LENGTH_DIVISOR) as usize
    }

    /// Shared handle to the samples; cloning it never copies audio data.
    pub fn samples(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }

    /// Amplitude envelope applied at `index`. Zero outside the populated region.
    #[cfg(test)]
    pub fn envelope(&self, index: usize) -> f32 {
        let populated_len = self.populated_len();
        if index >= populated_len {
            return 0.0;
        }
        1.0 - index as f32 / populated_len as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_lengths() {
        for &rate in &[44_100u32, 48_000, 96_000] {
            let click = ClickWaveform::synthesize(rate);
            assert_eq!(click.len(), rate as usize * 2);
            assert_eq!(click.populated_len(), rate as usize / 50);
            assert_eq!(click.sample_rate(), rate);
            assert!(!click.is_empty());
        }
        assert!(ClickWaveform::synthesize(0).is_empty());
    }

    #[test]
    fn test_tail_is_silent() {
        let click = ClickWaveform::synthesize(48_000);
        let samples = click.samples();

        assert!(samples[click.populated_len()..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_populated_region_carries_signal() {
        let click = ClickWaveform::synthesize(48_000);
        let samples = click.samples();

        assert!(samples[..click.populated_len()].iter().any(|&s| s.abs() > 0.5));
    }

    #[test]
    fn test_samples_within_unit_range() {
        let click = ClickWaveform::synthesize(44_100);

        assert!(click.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_starts_at_full_amplitude_and_zero_phase() {
        let click = ClickWaveform::synthesize(48_000);

        assert!((click.envelope(0) - 1.0).abs() < f32::EPSILON);
        assert_eq!(click.samples()[0], 0.0);
    }

    #[test]
    fn test_envelope_decays_monotonically_to_zero() {
        let click = ClickWaveform::synthesize(48_000);
        let samples = click.samples();
        let n = click.populated_len();

        for i in 1..n {
            assert!(click.envelope(i) < click.envelope(i - 1));
        }
        assert!(click.envelope(n - 1) < 0.01);
        assert_eq!(click.envelope(n), 0.0);

        for (i, s) in samples[..n].iter().enumerate() {
            assert!(s.abs() <= click.envelope(i) + 1e-4, "sample {i} exceeds envelope");
        }
    }

    #[test]
    fn test_peaks_decay_per_cycle() {
        let rate = 48_000;
        let click = ClickWaveform::synthesize(rate);
        let samples = click.samples();
        let cycle = (rate as f64 / CLICK_FREQUENCY_HZ).ceil() as usize;

        let peaks: Vec<f32> = samples[..click.populated_len()]
            .chunks(cycle)
            .map(|chunk| chunk.iter().fold(0.0f32, |acc, s| acc.max(s.abs())))
            .collect();

        assert!(peaks.windows(2).all(|w| w[1] <= w[0]));
        assert!(*peaks.last().unwrap() < 0.15);
    }

    #[test]
    fn test_samples_handle_is_shared() {
        let click = ClickWaveform::synthesize(8_000);
        let a = click.samples();
        let b = click.clone().samples();

        assert!(Arc::ptr_eq(&a, &b));
    }
}
