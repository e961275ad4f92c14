//! Audio Engine Module
//!
//! This module provides the metronome click track. It is organized into sub-modules, each
//! with a specific responsibility:
//!
//! - [`audio_stream`]: CPAL audio stream management and real-time callback
//! - [`click_track`]: The engine state machine (start, stop, toggle, tempo, disposal)
//! - [`clock`]: Audio clock state shared with the audio thread
//! - [`constants`]: Configuration constants and limits
//! - [`errors`]: Audio-specific error types
//! - [`mixer`]: Real-time click renderer
//! - [`tempo`]: Tempo parsing and clamping
//! - [`voice`]: Looping playback source
//! - [`waveform`]: Click synthesis
//!
//! The [`Metronome`] pyclass is the opaque handle the host UI holds; it owns exactly one
//! [`ClickTrack`] and releases it on [`Metronome::dispose`] or when garbage collected.

use crate::audio_engine::click_track::ClickTrack;
use crate::audio_engine::constants::CLOCK_ACK_TIMEOUT_MS;
use crate::audio_engine::errors::ClickTrackError;
use crate::audio_engine::tempo::Tempo;
use crate::messages::AudioMessage;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyInt;
use std::time::Duration;

pub use crate::audio_engine::click_track::PlaybackState;

mod audio_stream;
mod click_track;
mod clock;
mod constants;
mod errors;
mod mixer;
mod tempo;
mod voice;
mod waveform;

impl From<ClickTrackError> for PyErr {
    fn from(err: ClickTrackError) -> Self {
        match err {
            ClickTrackError::InvalidVolume(_) => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

/// Resolves any host value to a tempo: `str` is parsed, numbers are rounded, everything
/// else (including `None`) falls back to the default tempo.
fn tempo_from_py(value: Option<&Bound<'_, PyAny>>) -> Tempo {
    let Some(value) = value else {
        return Tempo::default();
    };

    if let Ok(text) = value.extract::<String>() {
        return Tempo::parse(&text);
    }

    match value.extract::<f64>() {
        Ok(bpm) => Tempo::from_bpm(bpm),
        // Ints beyond the f64 range overflow; they still clamp by sign.
        Err(_) if value.is_instance_of::<PyInt>() => {
            let negative = value.lt(0).unwrap_or(false);
            Tempo::from_bpm(if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            })
        }
        Err(_) => Tempo::default(),
    }
}

/// Tempo the engine would use for `value`, for previewing form input.
#[pyfunction]
#[pyo3(signature = (value=None))]
pub fn effective_tempo(value: Option<&Bound<'_, PyAny>>) -> u16 {
    tempo_from_py(value).bpm()
}

/// Metronome provides a synthesized click track on the default audio device.
#[pyclass]
pub struct Metronome {
    track: ClickTrack,
}

impl Metronome {
    fn settle(&mut self, wait: bool) -> PlaybackState {
        if wait && !self.track.wait_for_clock(Duration::from_millis(CLOCK_ACK_TIMEOUT_MS)) {
            log::warn!("Audio clock did not acknowledge {:?}", self.track.state());
            return self.track.revert_unconfirmed_start();
        }
        self.track.state()
    }
}

#[pymethods]
impl Metronome {
    /// Create a new Metronome on the default audio device, initially stopped.
    #[new]
    #[pyo3(signature = (bpm=None))]
    pub fn new(bpm: Option<&Bound<'_, PyAny>>) -> Self {
        Metronome {
            track: ClickTrack::new(tempo_from_py(bpm)),
        }
    }

    /// Resume the audio clock. With `wait`, block until the audio thread confirms.
    #[pyo3(signature = (wait=false))]
    pub fn start(&mut self, wait: bool) -> PlaybackState {
        self.track.start();
        self.settle(wait)
    }

    /// Suspend the audio clock. With `wait`, block until the audio thread confirms.
    #[pyo3(signature = (wait=false))]
    pub fn stop(&mut self, wait: bool) -> PlaybackState {
        self.track.stop();
        self.settle(wait)
    }

    /// Start when stopped, stop when running.
    #[pyo3(signature = (wait=false))]
    pub fn toggle(&mut self, wait: bool) -> PlaybackState {
        self.track.toggle();
        self.settle(wait)
    }

    /// Update the tempo from whatever the host form currently holds.
    pub fn set_tempo(&mut self, value: Option<&Bound<'_, PyAny>>) -> PyResult<u16> {
        let tempo = tempo_from_py(value);
        self.track.set_tempo(tempo)?;
        Ok(tempo.bpm())
    }

    #[getter]
    pub fn tempo(&self) -> u16 {
        self.track.tempo().bpm()
    }

    /// Seconds between clicks.
    #[getter]
    pub fn beat_period(&self) -> f64 {
        self.track.beat_period().as_secs_f64()
    }

    #[getter]
    pub fn state(&self) -> PlaybackState {
        self.track.state()
    }

    #[getter]
    pub fn is_running(&self) -> bool {
        self.track.state() == PlaybackState::Running
    }

    /// Button label for the current state.
    #[getter]
    pub fn icon(&self) -> &'static str {
        match self.track.state() {
            PlaybackState::Running => "◼",
            PlaybackState::Stopped => "▶",
        }
    }

    /// Whether an audio output is open.
    #[getter]
    pub fn attached(&self) -> bool {
        self.track.is_attached()
    }

    /// Output sample rate of the click, if attached.
    #[getter]
    pub fn sample_rate(&self) -> Option<u32> {
        self.track.waveform().map(|waveform| waveform.sample_rate())
    }

    /// Whether the audio thread reports its clock as running.
    pub fn clock_running(&self) -> bool {
        self.track.clock_running()
    }

    /// Seconds the audio clock has run while not suspended.
    pub fn clock_time(&self) -> f64 {
        self.track.clock_time()
    }

    /// Set the click volume (0.0 to 1.0).
    pub fn set_volume(&mut self, volume: f32) -> PyResult<()> {
        self.track.set_volume(volume)?;
        Ok(())
    }

    /// Send a ping message to the audio thread.
    pub fn ping(&mut self) -> PyResult<()> {
        self.track.ping()?;
        Ok(())
    }

    /// Receive a message from the audio thread.
    pub fn receive_msg(&mut self) -> PyResult<Option<AudioMessage>> {
        Ok(self.track.receive_msg()?)
    }

    /// Stop if running and release the audio device. Call when the owning widget unmounts.
    pub fn dispose(&mut self) {
        self.track.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_engine::audio_stream::create_link;

    fn offline_metronome() -> Metronome {
        let (handle, _callback) = create_link(2, 8_000, Tempo::default());
        Metronome {
            track: ClickTrack::with_link(handle, Tempo::default()),
        }
    }

    #[test]
    fn test_icon_reflects_state() {
        let mut metronome = offline_metronome();
        assert_eq!(metronome.icon(), "▶");

        metronome.toggle(false);
        assert_eq!(metronome.icon(), "◼");
        assert!(metronome.is_running());

        metronome.toggle(false);
        assert_eq!(metronome.icon(), "▶");
    }

    #[test]
    fn test_beat_period_and_tempo() {
        let metronome = offline_metronome();

        assert_eq!(metronome.tempo(), 120);
        assert_eq!(metronome.sample_rate(), Some(8_000));
        assert!(metronome.attached());
        assert!((metronome.beat_period() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unacknowledged_start_reports_stopped() {
        let mut metronome = offline_metronome();

        // Nothing drives the callback, so the clock never resumes.
        assert_eq!(metronome.start(true), PlaybackState::Stopped);
        assert!(!metronome.clock_running());
        assert!(!metronome.is_running());
        assert_eq!(metronome.icon(), "▶");
    }

    #[test]
    fn test_start_without_wait_is_optimistic() {
        let mut metronome = offline_metronome();

        assert_eq!(metronome.start(false), PlaybackState::Running);
        assert_eq!(metronome.icon(), "◼");
    }

    #[test]
    fn test_tempo_from_python_values() {
        Python::initialize();
        Python::attach(|py| {
            let cases = [
                (c"10**400", 300),
                (c"-(10**400)", 30),
                (c"1e400", 300),
                (c"120", 120),
                (c"60.4", 60),
                (c"'90.6'", 90),
                (c"'abc'", 120),
                (c"[]", 120),
            ];

            for (source, expected) in cases {
                let value = py.eval(source, None, None).unwrap();
                assert_eq!(tempo_from_py(Some(&value)).bpm(), expected, "{source:?}");
            }
            assert_eq!(tempo_from_py(None), Tempo::default());
        });
    }

    #[test]
    fn test_dispose_stops() {
        let mut metronome = offline_metronome();
        metronome.start(false);

        metronome.dispose();

        assert_eq!(metronome.state(), PlaybackState::Stopped);
        assert_eq!(metronome.start(false), PlaybackState::Stopped);
        assert!(!metronome.attached());
        assert_eq!(metronome.sample_rate(), None);
    }
}
