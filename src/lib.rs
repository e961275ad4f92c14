use pyo3::pymodule;

mod audio_engine;
mod messages;

/// The Python module implemented in Rust.
#[pymodule]
mod click_track_audio {
    #[pymodule_export]
    use super::audio_engine::Metronome;

    #[pymodule_export]
    use super::audio_engine::PlaybackState;

    #[pymodule_export]
    use super::audio_engine::effective_tempo;

    #[pymodule_export]
    use super::messages::AudioMessage;
}
