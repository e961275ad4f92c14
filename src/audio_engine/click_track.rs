//! Click track engine.
//!
//! [`ClickTrack`] owns one audio link for its whole life: one waveform, one looping voice,
//! one stream. Starting and stopping only resume and suspend the audio clock inside the
//! callback, so repeated toggles never rebuild anything and never pop.
//!
//! All methods are meant to be called from the host's single UI thread. State changes take
//! effect when requested; [`ClickTrack::wait_for_clock`] blocks until the audio thread has
//! acknowledged them.

use std::time::Duration;

use pyo3::prelude::*;

use crate::audio_engine::audio_stream::{AudioStreamHandle, create_audio_stream};
use crate::audio_engine::constants::{CLOCK_ACK_TIMEOUT_MS, VOLUME_MAX, VOLUME_MIN};
use crate::audio_engine::errors::ClickTrackError;
use crate::audio_engine::tempo::Tempo;
use crate::audio_engine::waveform::ClickWaveform;
use crate::messages::{AudioMessage, ControlMessage};

/// Whether the click loop is audible.
#[pyclass(eq, eq_int)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Running,
}

pub struct ClickTrack {
    tempo: Tempo,
    state: PlaybackState,
    /// `None` when no output is available or after disposal.
    link: Option<AudioStreamHandle>,
}

impl ClickTrack {
    /// Opens the default output device. Without one the engine is created detached and
    /// stays `Stopped`.
    pub fn new(tempo: Tempo) -> Self {
        match create_audio_stream(tempo) {
            Ok(handle) => Self::with_link(handle, tempo),
            Err(e) => {
                log::warn!("Click track has no audio output: {e}");
                Self::detached(tempo)
            }
        }
    }

    /// Builds the engine on an existing link, e.g. one from
    /// [`create_link`](crate::audio_engine::audio_stream::create_link).
    pub fn with_link(handle: AudioStreamHandle, tempo: Tempo) -> Self {
        let track = Self {
            tempo,
            state: PlaybackState::Stopped,
            link: Some(handle),
        };
        if let Err(e) = track.send_loop_end(tempo) {
            log::warn!("Failed to set initial loop end: {e}");
        }
        track
    }

    pub fn detached(tempo: Tempo) -> Self {
        Self {
            tempo,
            state: PlaybackState::Stopped,
            link: None,
        }
    }

    /// Resumes the audio clock. No-op when already running.
    ///
    /// If the request cannot reach the audio thread the state stays `Stopped`.
    pub fn start(&mut self) -> PlaybackState {
        if self.state == PlaybackState::Running {
            return self.state;
        }

        match self.send(ControlMessage::Resume()) {
            Ok(()) => {
                self.state = PlaybackState::Running;
                log::debug!("Click track running at {} BPM", self.tempo.bpm());
            }
            Err(e) => log::warn!("Click track could not start: {e}"),
        }
        self.state
    }

    /// Suspends the audio clock. No-op when already stopped.
    pub fn stop(&mut self) -> PlaybackState {
        if self.state == PlaybackState::Stopped {
            return self.state;
        }

        match self.send(ControlMessage::Suspend()) {
            Ok(()) => {
                self.state = PlaybackState::Stopped;
                log::debug!("Click track stopped");
            }
            Err(e) => log::warn!("Click track could not stop: {e}"),
        }
        self.state
    }

    /// Drops a start the audio thread never confirmed.
    ///
    /// If the state says `Running` but the clock is not, a suspend is queued so a late
    /// resume is undone, and the state falls back to `Stopped`.
    pub fn revert_unconfirmed_start(&mut self) -> PlaybackState {
        if self.state != PlaybackState::Running || self.clock_running() {
            return self.state;
        }

        if let Err(e) = self.send(ControlMessage::Suspend()) {
            log::warn!("Could not queue suspend for unconfirmed start: {e}");
        }
        self.state = PlaybackState::Stopped;
        log::warn!("Audio clock never resumed; click track marked stopped");
        self.state
    }

    /// Starts when stopped, stops when running.
    pub fn toggle(&mut self) -> PlaybackState {
        match self.state {
            PlaybackState::Stopped => self.start(),
            PlaybackState::Running => self.stop(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn beat_period(&self) -> Duration {
        self.tempo.beat_period()
    }

    /// Moves the loop end to the new beat period. Playback position is kept.
    pub fn set_tempo(&mut self, tempo: Tempo) -> Result<(), ClickTrackError> {
        if tempo == self.tempo {
            return Ok(());
        }

        // The tempo is only committed once the audio thread has the matching loop end.
        match self.send_loop_end(tempo) {
            Ok(()) | Err(ClickTrackError::Detached) => {
                self.tempo = tempo;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<(), ClickTrackError> {
        if !volume.is_finite() || !(VOLUME_MIN..=VOLUME_MAX).contains(&volume) {
            return Err(ClickTrackError::InvalidVolume(volume));
        }

        self.send(ControlMessage::SetVolume(volume))
    }

    /// Send a ping message to the audio thread.
    pub fn ping(&self) -> Result<(), ClickTrackError> {
        self.send(ControlMessage::Ping())
    }

    /// Receive a message from the audio thread.
    pub fn receive_msg(&self) -> Result<Option<AudioMessage>, ClickTrackError> {
        let handle = self.link.as_ref().ok_or(ClickTrackError::Detached)?;
        let mut consumer = handle
            .consumer
            .lock()
            .map_err(|_| ClickTrackError::LockPoisoned("consumer"))?;

        Ok(consumer.pop().ok())
    }

    /// Whether the audio thread reports its clock as running.
    pub fn clock_running(&self) -> bool {
        self.link
            .as_ref()
            .is_some_and(|handle| handle.clock.is_running())
    }

    /// Seconds the audio clock has run. Frozen while suspended.
    pub fn clock_time(&self) -> f64 {
        self.link
            .as_ref()
            .map_or(0.0, |handle| handle.clock.seconds())
    }

    /// Blocks until the audio clock matches the current state or `timeout` expires.
    pub fn wait_for_clock(&self, timeout: Duration) -> bool {
        let running = self.state == PlaybackState::Running;
        match &self.link {
            Some(handle) => handle.clock.wait_for(running, timeout),
            None => !running,
        }
    }

    pub fn waveform(&self) -> Option<&ClickWaveform> {
        self.link.as_ref().map(|handle| &handle.waveform)
    }

    pub fn is_attached(&self) -> bool {
        self.link.is_some()
    }

    /// Suspends the clock if running, waits for the audio thread to confirm, then releases
    /// the stream. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.link.is_none() {
            return;
        }

        if self.stop() == PlaybackState::Stopped
            && !self.wait_for_clock(Duration::from_millis(CLOCK_ACK_TIMEOUT_MS))
        {
            log::warn!("Audio clock did not acknowledge suspend before release");
        }

        self.link = None;
        self.state = PlaybackState::Stopped;
        log::debug!("Click track released");
    }

    fn send_loop_end(&self, tempo: Tempo) -> Result<(), ClickTrackError> {
        let handle = self.link.as_ref().ok_or(ClickTrackError::Detached)?;
        let frames = tempo.loop_end_frames(handle.output_sample_rate);
        self.send(ControlMessage::SetLoopEnd { frames })
    }

    fn send(&self, message: ControlMessage) -> Result<(), ClickTrackError> {
        let handle = self.link.as_ref().ok_or(ClickTrackError::Detached)?;
        let label = message.label();
        let mut producer = handle
            .producer
            .lock()
            .map_err(|_| ClickTrackError::LockPoisoned("producer"))?;

        producer
            .push(message)
            .map_err(|_| ClickTrackError::ControlQueueFull(label))
    }
}

impl Drop for ClickTrack {
    fn drop(&mut self) {
        self.dispose();
    }
}
