//! Message definitions for communication between the host and the audio thread.
//!
//! This module defines the enums that serve as the wire format for messages passed through the
//! ring buffers between the host (Python) thread and the real-time audio thread.

use pyo3::prelude::*;

/// Message that is emitted from the audio thread.
#[derive(Debug, Clone, PartialEq)]
#[pyclass]
pub enum AudioMessage {
    /// Response to a Ping message.
    Pong(),

    /// The audio clock is running; clicks are audible from here on.
    Resumed(),

    /// The audio clock is suspended; output is silent and the playhead is frozen.
    Suspended(),
}

#[pymethods]
impl AudioMessage {
    /// Clock state this message acknowledges, if any.
    pub fn clock_running(&self) -> Option<bool> {
        match self {
            AudioMessage::Resumed() => Some(true),
            AudioMessage::Suspended() => Some(false),
            AudioMessage::Pong() => None,
        }
    }
}

/// Message that is emitted from the host side.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// Used for testing message passing functionality.
    Ping(),

    /// Resume the audio clock.
    Resume(),

    /// Suspend the audio clock.
    Suspend(),

    /// Move the loop end point of the click voice.
    ///
    /// # Parameters
    /// * `frames` - Loop end in frames at the output sample rate
    SetLoopEnd { frames: usize },

    /// Set the click volume.
    ///
    /// # Parameters
    /// * `volume` - Volume level (0.0 to 1.0)
    SetVolume(f32),
}

impl ControlMessage {
    /// Short name used in log lines and errors.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Ping() => "Ping",
            Self::Resume() => "Resume",
            Self::Suspend() => "Suspend",
            Self::SetLoopEnd { .. } => "SetLoopEnd",
            Self::SetVolume(_) => "SetVolume",
        }
    }
}
