//! Real-time click renderer.
//!
//! This module provides the [`RtClick`] struct which owns the audio clock and the single
//! [`LoopVoice`](crate::audio_engine::voice::LoopVoice) that plays the click. Suspending
//! the clock silences the output and freezes the playhead; resuming picks up exactly where
//! it stopped. Nothing here allocates or locks, so it is safe to call from the cpal callback.

use std::sync::Arc;

use crate::audio_engine::clock::ClockState;
use crate::audio_engine::constants::{VOLUME_MAX, VOLUME_MIN};
use crate::audio_engine::voice::LoopVoice;
use crate::audio_engine::waveform::ClickWaveform;
use cpal::Sample;

pub struct RtClick {
    /// Number of output channels (1 for mono, 2 for stereo).
    channels: usize,

    /// Click volume multiplier.
    volume: f32,

    /// The looping click voice. Created once, never rebuilt.
    voice: LoopVoice,

    /// Clock state shared with the host.
    clock: Arc<ClockState>,
}

impl RtClick {
    /// Creates a suspended renderer.
    ///
    /// # Parameters
    ///
    /// - `channels`: Number of interleaved output channels
    /// - `waveform`: The synthesized click, at the output sample rate
    /// - `loop_end`: Initial loop end in frames
    /// - `clock`: Clock state to publish acknowledgements to
    pub fn new(
        channels: usize,
        waveform: &ClickWaveform,
        loop_end: usize,
        clock: Arc<ClockState>,
    ) -> Self {
        Self {
            channels,
            volume: VOLUME_MAX,
            voice: LoopVoice::new(waveform.samples(), loop_end),
            clock,
        }
    }

    /// Resumes the clock. Returns `false` if it was already running.
    pub fn resume(&mut self) -> bool {
        if self.clock.is_running() {
            return false;
        }
        self.clock.set_running(true);
        true
    }

    /// Suspends the clock. Returns `false` if it was already suspended.
    pub fn suspend(&mut self) -> bool {
        if !self.clock.is_running() {
            return false;
        }
        self.clock.set_running(false);
        true
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn set_loop_end(&mut self, frames: usize) {
        self.voice.set_loop_end(frames);
    }

    /// Sets the click volume. Invalid values (NaN, infinite, or out of range) are ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() || !(VOLUME_MIN..=VOLUME_MAX).contains(&volume) {
            return;
        }

        self.volume = volume;
    }

    /// Renders interleaved frames into `output`.
    ///
    /// The mono click is copied to every channel. While suspended the buffer is filled
    /// with silence and neither the voice nor the clock advances.
    pub fn render(&mut self, output: &mut [f32]) {
        output.fill(Sample::EQUILIBRIUM);

        if self.channels == 0 || !self.clock.is_running() {
            return;
        }

        let mut frames = 0u64;
        for frame in output.chunks_exact_mut(self.channels) {
            let sample = self.voice.next_sample() * self.volume;
            frame.fill(sample);
            frames += 1;
        }

        self.clock.advance(frames);
    }

    /// Gets the number of channels configured for this renderer.
    #[cfg(test)]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[cfg(test)]
    pub fn voice(&self) -> &LoopVoice {
        &self.voice
    }
}
