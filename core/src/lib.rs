//! Text-over-audio FSK modem
//!
//! Each bit of a text message is sent as one of two tones, bracketed by a
//! sync tone and an end tone, and carried in a mono 16-bit WAV file. The
//! receiver finds the sync tone with a Goertzel filter and compares mark and
//! space energy per bit window.

pub mod bits;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod fec;
pub mod goertzel;
pub mod tone;
pub mod wav;

pub use config::ModemConfig;
pub use decoder::FrameDecoder;
pub use encoder::FrameEncoder;
pub use error::{ConfigWarning, DecodeStage, ModemError, Result, WavError};
pub use wav::WavAudio;

/// Default sample rate in Hz
pub const SAMPLE_RATE: u32 = 44100;

/// Default cap on demodulated bits per decode call
pub const MAX_DECODED_BITS: usize = 20000;

/// Encode text into PCM samples at `config.sample_rate`
pub fn encode_text(config: &ModemConfig, text: &str) -> Vec<f32> {
    FrameEncoder::new(config).encode(text)
}

/// Encode text into a complete WAV file
pub fn encode_wav(config: &ModemConfig, text: &str) -> Vec<u8> {
    let samples = encode_text(config, text);
    wav::encode(&samples, config.sample_rate)
}

/// Decode text from buffered PCM samples recorded at `sample_rate`
pub fn decode_samples(config: &ModemConfig, samples: &[f32], sample_rate: u32) -> Result<String> {
    FrameDecoder::new(config).decode(samples, sample_rate)
}

/// Parse a WAV file and decode the text it carries
pub fn decode_wav(config: &ModemConfig, bytes: &[u8]) -> Result<String> {
    let audio = wav::decode(bytes)?;
    decode_samples(config, &audio.samples, audio.sample_rate)
}
