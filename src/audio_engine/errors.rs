//! Click track error types.

use thiserror::Error;

/// Errors that can occur while opening or driving the click track.
#[derive(Debug, Error)]
pub enum ClickTrackError {
    /// The host has no default output device.
    #[error("no audio output device found")]
    NoOutputDevice,

    /// The output device did not report a usable default configuration.
    #[error("no default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    /// Failed to build the output stream.
    #[error("failed to create audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// The host refused to start the output stream.
    #[error("failed to play audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// The control ring buffer is full; the audio thread is not draining it.
    #[error("failed to send {0} - buffer may be full")]
    ControlQueueFull(&'static str),

    /// A ring buffer lock was poisoned by a panicking thread.
    #[error("failed to acquire {0} lock")]
    LockPoisoned(&'static str),

    /// Volume outside `VOLUME_MIN..=VOLUME_MAX` or not finite.
    #[error("volume out of range: {0}")]
    InvalidVolume(f32),

    /// The engine has no audio link (device unavailable or already disposed).
    #[error("click track is not attached to an audio output")]
    Detached,
}
