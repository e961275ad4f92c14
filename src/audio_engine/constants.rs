//! Click track configuration constants and limits.

/// Lowest tempo the engine will schedule, in beats per minute.
pub const TEMPO_MIN: u16 = 30;

/// Highest tempo the engine will schedule, in beats per minute.
pub const TEMPO_MAX: u16 = 300;

/// Tempo used when the host supplies nothing parseable.
pub const TEMPO_DEFAULT: u16 = 120;

/// Pitch of the synthesized click tone.
pub const CLICK_FREQUENCY_HZ: f64 = 440.0;

/// The click occupies `sample_rate / CLICK_LENGTH_DIVISOR` samples (20 ms).
pub const CLICK_LENGTH_DIVISOR: u32 = 50;

/// Total length of the click buffer in seconds. Equals the beat period at `TEMPO_MIN`.
pub const CLICK_BUFFER_SECONDS: u32 = 2;

/// Capacity of the control and audio message ring buffers.
pub const RING_CAPACITY: usize = 256;

/// Fixed cpal buffer size in frames.
pub const STREAM_BUFFER_FRAMES: u32 = 512;

/// Upper bound on how long disposal waits for the audio thread to acknowledge a suspend.
pub const CLOCK_ACK_TIMEOUT_MS: u64 = 250;

/// Minimum volume level (silence).
pub const VOLUME_MIN: f32 = 0.0;

/// Maximum volume level (100%).
pub const VOLUME_MAX: f32 = 1.0;
