use crate::bits::text_to_bits;
use crate::config::ModemConfig;
use crate::fec;
use crate::tone::ToneSynthesizer;

/// Frame encoder - turns text into a complete FSK transmission
///
/// Layout: sync tone + one tone per (FEC-expanded) bit + end tone. Every
/// segment gets its own Hann envelope and segments are laid end to end.
/// The output length depends only on the text length and the configuration.
pub struct FrameEncoder<'a> {
    config: &'a ModemConfig,
    synth: ToneSynthesizer<'a>,
}

impl<'a> FrameEncoder<'a> {
    pub fn new(config: &'a ModemConfig) -> Self {
        Self {
            config,
            synth: ToneSynthesizer::new(config),
        }
    }

    /// Total transmission length in samples for a bitstream of `num_bits`
    pub fn frame_samples(&self, num_bits: usize) -> usize {
        let total_duration = self.config.sync_tone_duration
            + num_bits as f64 * self.config.bit_duration()
            + self.config.end_tone_duration;
        self.config.duration_to_samples(total_duration)
    }

    /// Encode text into PCM samples at the configured sample rate
    pub fn encode(&self, text: &str) -> Vec<f32> {
        let bits = fec::expand(&text_to_bits(text), self.config.redundancy());
        self.encode_bits(&bits)
    }

    /// Modulate an already FEC-expanded bitstream
    pub fn encode_bits(&self, bits: &str) -> Vec<f32> {
        let num_bits = bits.len();
        let mut frame = FrameWriter::new(self.frame_samples(num_bits));

        log::debug!(
            "Encoding {} bits: SR={}, BR={}, F0={}, F1={}, AM={}, {} samples",
            num_bits,
            self.config.sample_rate,
            self.config.bit_rate,
            self.config.freq_0,
            self.config.freq_1,
            self.config.am_modulation,
            frame.capacity()
        );

        frame.push(&self.synth.shaped_tone(
            self.config.sync_tone_freq,
            self.config.sync_tone_duration,
        ));

        let bit_duration = self.config.bit_duration();
        for bit in bits.chars() {
            let freq = if bit == '0' {
                self.config.freq_0
            } else {
                self.config.freq_1
            };
            frame.push(&self.synth.shaped_tone(freq, bit_duration));
        }

        frame.push(&self.synth.shaped_tone(
            self.config.end_tone_freq,
            self.config.end_tone_duration,
        ));

        log::debug!("Finished frame, offset {} / {}", frame.offset, frame.capacity());
        frame.finish()
    }
}

/// Fixed-size output buffer filled segment by segment
struct FrameWriter {
    samples: Vec<f32>,
    offset: usize,
}

impl FrameWriter {
    fn new(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
            offset: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Copy a segment at the current offset, truncating whatever does not fit
    fn push(&mut self, segment: &[f32]) {
        let space_left = self.samples.len() - self.offset;
        let count = segment.len().min(space_left);
        if count < segment.len() {
            log::debug!(
                "Tone truncated: {} of {} samples fit at offset {}",
                count,
                segment.len(),
                self.offset
            );
        }
        self.samples[self.offset..self.offset + count].copy_from_slice(&segment[..count]);
        self.offset += count;
    }

    fn finish(self) -> Vec<f32> {
        self.samples
    }
}
