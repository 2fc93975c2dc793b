//! Minimal RIFF/WAVE codec for mono 16-bit PCM
//!
//! Encoding always emits the canonical 44-byte header. Decoding accepts any
//! chunk layout as long as `fmt ` directly follows the RIFF header and a
//! `data` chunk can be found by walking the chunk list.

use crate::error::WavError;

/// Size of the canonical header written by [`encode`]
pub const WAV_HEADER_SIZE: usize = 44;

pub const PCM_FORMAT: u16 = 1;
pub const NUM_CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;

const BYTES_PER_SAMPLE: usize = (BITS_PER_SAMPLE / 8) as usize;

/// Decoded PCM payload together with the rate it was recorded at
#[derive(Debug, Clone, PartialEq)]
pub struct WavAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Serialize samples in [-1, 1] into a mono 16-bit WAV file
pub fn encode(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let block_align = NUM_CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_size = (samples.len() * BYTES_PER_SAMPLE) as u32;
    let file_size = WAV_HEADER_SIZE as u32 + data_size;

    let mut buf = Vec::with_capacity(file_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(file_size - 8).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    buf.extend_from_slice(&NUM_CHANNELS.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data sub-chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample_to_i16(sample).to_le_bytes());
    }

    buf
}

/// Negative samples scale by 32768 and positive ones by 32767, truncating toward zero
fn sample_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}

/// Parse a mono 16-bit PCM WAV file
///
/// A `data` chunk whose declared size runs past the end of the buffer is
/// clipped to the bytes actually present instead of being rejected.
pub fn decode(bytes: &[u8]) -> Result<WavAudio, WavError> {
    if bytes.len() < WAV_HEADER_SIZE {
        return Err(WavError::TooShort(bytes.len()));
    }
    if &bytes[0..4] != b"RIFF" {
        return Err(WavError::MissingMarker("RIFF"));
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(WavError::MissingMarker("WAVE"));
    }
    if &bytes[12..16] != b"fmt " {
        return Err(WavError::MissingMarker("fmt "));
    }

    let fmt_size = read_u32(bytes, 16);
    if fmt_size < 16 {
        return Err(WavError::InvalidFmtChunk(fmt_size));
    }
    let audio_format = read_u16(bytes, 20);
    if audio_format != PCM_FORMAT {
        return Err(WavError::UnsupportedFormat(audio_format));
    }
    let channels = read_u16(bytes, 22);
    if channels != NUM_CHANNELS {
        return Err(WavError::UnsupportedChannels(channels));
    }
    let sample_rate = read_u32(bytes, 24);
    let bits_per_sample = read_u16(bytes, 34);
    if bits_per_sample != BITS_PER_SAMPLE {
        return Err(WavError::UnsupportedBitDepth(bits_per_sample));
    }

    let (data_offset, declared_size) = find_data_chunk(bytes).ok_or(WavError::MissingDataChunk)?;

    let available = bytes.len() - data_offset;
    let data_size = if declared_size > available {
        log::warn!(
            "'data' chunk declares {} bytes but only {} remain, clipping",
            declared_size,
            available
        );
        available
    } else {
        declared_size
    };

    let data = &bytes[data_offset..data_offset + data_size];
    if data.len() < BYTES_PER_SAMPLE {
        return Err(WavError::NoSamples);
    }

    // chunks_exact stops before a trailing partial sample
    let samples: Vec<f32> = data
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();

    log::debug!(
        "Parsed WAV: {} Hz, {} samples ({} data bytes)",
        sample_rate,
        samples.len(),
        data_size
    );

    Ok(WavAudio {
        samples,
        sample_rate,
    })
}

/// Walk chunk headers from the end of the RIFF header looking for `data`.
///
/// Returns the payload offset and declared size. Unknown chunks are skipped,
/// honouring the pad byte that follows odd-sized chunks.
fn find_data_chunk(bytes: &[u8]) -> Option<(usize, usize)> {
    let mut offset = 12usize;
    while offset + 8 <= bytes.len() {
        let chunk_id = &bytes[offset..offset + 4];
        let chunk_size = read_u32(bytes, offset + 4) as usize;
        if chunk_id == b"data" {
            return Some((offset + 8, chunk_size));
        }
        offset = offset.checked_add(8 + chunk_size)?;
        if chunk_size % 2 != 0 {
            offset += 1;
        }
    }
    None
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
