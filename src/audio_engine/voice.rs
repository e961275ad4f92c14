//! Looping playback source.
//!
//! This module provides the [`LoopVoice`] struct which plays the click buffer in a loop
//! whose region ends before the buffer does. One loop iteration is one beat: the click
//! at the start, silence up to the loop end.
//!
//! The voice is owned by the [`RtClick`](crate::audio_engine::mixer::RtClick) renderer and
//! lives for the whole engine; tempo changes only move its loop end.

use std::sync::Arc;

/// A looping voice over a shared mono buffer.
#[derive(Debug)]
pub struct LoopVoice {
    /// The buffer being played.
    samples: Arc<[f32]>,

    /// Current playback position in frames.
    frame_pos: usize,

    /// Exclusive end of the loop region in frames.
    loop_end: usize,
}

impl LoopVoice {
    /// Creates a voice positioned at the start of the buffer.
    ///
    /// # Parameters
    ///
    /// - `samples`: Mono buffer to loop over
    /// - `loop_end`: Loop end in frames, clamped to `1..=samples.len()`
    pub fn new(samples: Arc<[f32]>, loop_end: usize) -> Self {
        let mut voice = Self {
            samples,
            frame_pos: 0,
            loop_end: 0,
        };
        voice.set_loop_end(loop_end);
        voice
    }

    /// Moves the loop end point without touching the playhead.
    ///
    /// When the playhead already lies past the new end it wraps to the loop start, the
    /// same way it would on reaching the end naturally.
    pub fn set_loop_end(&mut self, loop_end: usize) {
        self.loop_end = loop_end.clamp(1, self.samples.len().max(1));
        if self.frame_pos >= self.loop_end {
            self.frame_pos = 0;
        }
    }

    #[cfg(test)]
    pub fn loop_end(&self) -> usize {
        self.loop_end
    }

    #[cfg(test)]
    pub fn frame_pos(&self) -> usize {
        self.frame_pos
    }

    /// Returns the sample under the playhead and advances by one frame.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let Some(&sample) = self.samples.get(self.frame_pos) else {
            return 0.0;
        };

        self.frame_pos += 1;
        if self.frame_pos >= self.loop_end {
            self.frame_pos = 0;
        }

        sample
    }
}
