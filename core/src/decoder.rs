use crate::bits::{bits_to_text, BITS_PER_CHAR};
use crate::config::ModemConfig;
use crate::error::{DecodeStage, ModemError, Result};
use crate::fec;
use crate::goertzel::energy;

/// Fraction of each bit window ignored at both edges, where the previous and
/// next tones bleed in
const BIT_WINDOW_TRIM_RATIO: f64 = 0.15;

/// Windows shorter than this fraction of the sync length are not scanned
const MIN_SYNC_WINDOW_RATIO: f64 = 0.8;

/// Sync search advances by `sync_samples / SYNC_SEARCH_STEPS_PER_WINDOW`
const SYNC_SEARCH_STEPS_PER_WINDOW: usize = 5;

/// Position of the accepted sync window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncLock {
    /// First sample of the sync window
    pub index: usize,
    pub energy: f64,
}

/// Why bit demodulation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Not enough samples left for another bit window
    BufferExhausted,
    /// The trimmed analysis window came out empty
    InvalidWindow,
    /// The window was dominated by the end tone
    EndTone,
    /// `max_decoded_bits` was reached
    BitCap,
}

/// Raw output of the demodulation loop
#[derive(Debug, Clone, PartialEq)]
pub struct Demodulation {
    pub bits: String,
    pub stop: StopReason,
}

/// Frame decoder - recovers text from a buffered FSK transmission
///
/// Single forward pass: locate the sync tone, demodulate fixed-width bit
/// windows by comparing mark and space energy, undo the repetition code, then
/// convert bytes to text. There is no backtracking once demodulation starts.
pub struct FrameDecoder<'a> {
    config: &'a ModemConfig,
}

impl<'a> FrameDecoder<'a> {
    pub fn new(config: &'a ModemConfig) -> Self {
        Self { config }
    }

    /// Decode a fully buffered mono recording
    pub fn decode(&self, samples: &[f32], sample_rate: u32) -> Result<String> {
        log::debug!("Decoding {} samples at {} Hz", samples.len(), sample_rate);

        if sample_rate != self.config.sample_rate {
            return Err(ModemError::SampleRateMismatch {
                expected: self.config.sample_rate,
                actual: sample_rate,
            });
        }
        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(ModemError::Decode(format!(
                "non-finite sample at index {}",
                pos
            )));
        }

        let sync = self.find_sync(samples)?;
        let data_start = sync.index + self.config.sync_samples();
        let demod = self.demodulate(samples, data_start);

        let raw_bits = demod.bits.len();
        log::debug!("Demodulated {} raw bits, stopped by {:?}", raw_bits, demod.stop);
        if raw_bits < BITS_PER_CHAR {
            return Err(ModemError::InsufficientBits {
                bits: raw_bits,
                stage: DecodeStage::Demodulation,
            });
        }

        let bits = fec::reduce(&demod.bits, self.config.redundancy());
        log::debug!("De-FEC bitstream has {} bits", bits.len());
        if bits.len() < BITS_PER_CHAR {
            return Err(ModemError::InsufficientBits {
                bits: bits.len(),
                stage: DecodeStage::FecReduction,
            });
        }

        let text = bits_to_text(&bits);
        log::debug!("Decoded text length: {}", text.len());
        Ok(text)
    }

    /// Scan for the first window whose sync-tone energy clears the threshold.
    ///
    /// First match wins, even if a later window would be stronger. On failure
    /// the error carries the strongest energy seen for diagnostics.
    pub fn find_sync(&self, samples: &[f32]) -> Result<SyncLock> {
        let sync_samples = self.config.sync_samples();
        let required = self.config.required_sync_energy();
        let step = (sync_samples / SYNC_SEARCH_STEPS_PER_WINDOW).max(1);
        let search_end = samples.len().saturating_sub(sync_samples);
        let min_window = sync_samples as f64 * MIN_SYNC_WINDOW_RATIO;

        log::debug!(
            "Searching sync ({} Hz), window {} samples, required energy > {:.3e}",
            self.config.sync_tone_freq,
            sync_samples,
            required
        );

        let mut max_energy = 0.0f64;
        for index in (0..search_end).step_by(step) {
            let end = (index + sync_samples).min(samples.len());
            let window = &samples[index..end];
            if (window.len() as f64) < min_window {
                continue;
            }

            let window_energy =
                energy(window, self.config.sync_tone_freq, self.config.sample_rate);
            max_energy = max_energy.max(window_energy);
            if window_energy > required {
                log::debug!("Sync found at index {}, energy {:.3e}", index, window_energy);
                return Ok(SyncLock {
                    index,
                    energy: window_energy,
                });
            }
        }

        log::debug!("Sync not found (max energy {:.3e})", max_energy);
        Err(ModemError::SyncNotFound {
            max_energy,
            required,
        })
    }

    /// Demodulate consecutive bit windows starting at `start`
    pub fn demodulate(&self, samples: &[f32], start: usize) -> Demodulation {
        let bit_samples = self.config.bit_duration_samples();
        let trim = (bit_samples as f64 * BIT_WINDOW_TRIM_RATIO).floor() as usize;
        let max_bits = self.config.max_decoded_bits;
        let rate = self.config.sample_rate;

        let mut bits = String::new();
        let mut index = start;
        let mut stop = StopReason::BufferExhausted;

        while index.saturating_add(bit_samples) <= samples.len() {
            if bits.len() >= max_bits {
                log::warn!("Demodulation stopped by bit cap ({})", max_bits);
                stop = StopReason::BitCap;
                break;
            }

            let analysis_start = index + trim;
            let analysis_end = (index + bit_samples).saturating_sub(trim);
            if analysis_start >= analysis_end {
                log::debug!("Invalid analysis window at bit {}", bits.len());
                stop = StopReason::InvalidWindow;
                break;
            }
            let window = &samples[analysis_start..analysis_end];

            let energy_0 = energy(window, self.config.freq_0, rate);
            let energy_1 = energy(window, self.config.freq_1, rate);

            if self.is_end_tone(window, energy_0.max(energy_1)) {
                log::debug!("End tone reached after {} bits", bits.len());
                stop = StopReason::EndTone;
                break;
            }

            let bit = self.decide_bit(energy_0, energy_1);
            bits.push(bit);
            log::trace!("Bit {} -> {} (e0={:.3e}, e1={:.3e})", bits.len() - 1, bit, energy_0, energy_1);

            index += bit_samples;
        }

        Demodulation { bits, stop }
    }

    /// Pick the bit for one window.
    ///
    /// A clear winner needs to beat the other tone by the configured ratio;
    /// otherwise the larger energy wins, with exact ties going to '1'.
    pub fn decide_bit(&self, energy_0: f64, energy_1: f64) -> char {
        let ratio = self.config.bit_decision_ratio_threshold;
        if energy_1 > energy_0 * ratio {
            '1'
        } else if energy_0 > energy_1 * ratio {
            '0'
        } else if energy_1 >= energy_0 {
            '1'
        } else {
            '0'
        }
    }

    fn is_end_tone(&self, window: &[f32], data_energy: f64) -> bool {
        if self.config.end_samples() == 0 {
            return false;
        }
        let end_energy = energy(window, self.config.end_tone_freq, self.config.sample_rate);
        end_energy > data_energy * self.config.end_detection_multiplier
    }
}
