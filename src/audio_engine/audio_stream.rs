//! Audio Stream Module
//!
//! This module handles CPAL audio stream management including:
//! - Output device and configuration discovery
//! - Ring buffers for host <-> audio thread messages
//! - The real-time callback that applies control messages and renders the click
//! - An offline link with the same shape, for hosts without an output device

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Stream, StreamConfig};
use env_logger::{Builder, Env};
use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::{Arc, Mutex};

use crate::audio_engine::clock::ClockState;
use crate::audio_engine::constants::{RING_CAPACITY, STREAM_BUFFER_FRAMES};
use crate::audio_engine::errors::ClickTrackError;
use crate::audio_engine::mixer::RtClick;
use crate::audio_engine::tempo::Tempo;
use crate::audio_engine::waveform::ClickWaveform;
use crate::messages::{AudioMessage, ControlMessage};

/// Handle to the audio stream with associated message channels
pub struct AudioStreamHandle {
    /// `None` for an offline link whose callback is driven by the caller.
    pub stream: Option<Stream>,
    pub producer: Arc<Mutex<Producer<ControlMessage>>>,
    pub consumer: Arc<Mutex<Consumer<AudioMessage>>>,
    pub clock: Arc<ClockState>,
    pub output_channels: usize,
    pub output_sample_rate: u32,
    pub waveform: ClickWaveform,
}

/// Audio-thread half of a link: drains control messages and renders the click.
pub struct RtCallback {
    consumer: Consumer<ControlMessage>,
    producer: Producer<AudioMessage>,
    click: RtClick,
}

impl RtCallback {
    /// One callback period: apply pending control messages, then fill `data`.
    pub fn process(&mut self, data: &mut [f32]) {
        while let Ok(message) = self.consumer.pop() {
            match message {
                ControlMessage::Ping() => {
                    let _ = self.producer.push(AudioMessage::Pong());
                }
                ControlMessage::Resume() => {
                    if self.click.resume() {
                        let _ = self.producer.push(AudioMessage::Resumed());
                    }
                }
                ControlMessage::Suspend() => {
                    if self.click.suspend() {
                        let _ = self.producer.push(AudioMessage::Suspended());
                    }
                }
                ControlMessage::SetLoopEnd { frames } => {
                    self.click.set_loop_end(frames);
                }
                ControlMessage::SetVolume(volume) => {
                    self.click.set_volume(volume);
                }
            }
        }

        self.click.render(data);
    }

    #[cfg(test)]
    pub fn click(&self) -> &RtClick {
        &self.click
    }
}

/// Setup and configure the logger for audio operations
pub fn setup_logger() {
    // Users can override via `RUST_LOG`, e.g. `RUST_LOG=debug` to trace state transitions.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init()
        .unwrap_or(()); // Ignore initialization errors
}

/// Build both halves of a link for a given output format.
///
/// The click is synthesized here, at `sample_rate`, and the renderer starts suspended with
/// its loop end set for `tempo`.
pub fn create_link(
    channels: usize,
    sample_rate: u32,
    tempo: Tempo,
) -> (AudioStreamHandle, RtCallback) {
    // Create ring buffer for incoming messages (host->audio)
    let (producer_in, consumer_in) = RingBuffer::new(RING_CAPACITY);

    // Create ring buffer for outgoing messages (audio->host)
    let (producer_out, consumer_out) = RingBuffer::new(RING_CAPACITY);

    let waveform = ClickWaveform::synthesize(sample_rate);
    let clock = Arc::new(ClockState::new(sample_rate));
    let click = RtClick::new(
        channels,
        &waveform,
        tempo.loop_end_frames(sample_rate),
        Arc::clone(&clock),
    );

    let handle = AudioStreamHandle {
        stream: None,
        producer: Arc::new(Mutex::new(producer_in)),
        consumer: Arc::new(Mutex::new(consumer_out)),
        clock,
        output_channels: channels,
        output_sample_rate: sample_rate,
        waveform,
    };
    let callback = RtCallback {
        consumer: consumer_in,
        producer: producer_out,
        click,
    };

    (handle, callback)
}

/// Create and configure the audio stream
///
/// This function:
/// 1. Sets up the default audio device
/// 2. Configures the stream with appropriate parameters
/// 3. Synthesizes the click and creates the message ring buffers
/// 4. Builds the audio stream and starts it with the clock suspended
///
/// The stream runs for the life of the handle; start and stop only resume and suspend
/// the clock inside the callback.
pub fn create_audio_stream(tempo: Tempo) -> Result<AudioStreamHandle, ClickTrackError> {
    setup_logger();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(ClickTrackError::NoOutputDevice)?;

    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate();
    let channels = config.channels();

    log::info!(
        "Starting click track... ({} ch@{} Hz, {} BPM)",
        channels,
        sample_rate,
        tempo.bpm()
    );

    let (mut handle, mut callback) = create_link(channels as usize, sample_rate, tempo);

    // Create stream config
    let stream_config = StreamConfig {
        channels,
        sample_rate,
        buffer_size: BufferSize::Fixed(STREAM_BUFFER_FRAMES),
    };

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            callback.process(data);
        },
        |err| {
            log::error!("Audio stream error: {}", err);
        },
        None,
    )?;

    start_stream(&stream)?;
    handle.stream = Some(stream);

    Ok(handle)
}

/// Start playing the audio stream
pub fn start_stream(stream: &Stream) -> Result<(), ClickTrackError> {
    stream.play()?;
    Ok(())
}
