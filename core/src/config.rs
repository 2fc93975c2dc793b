use crate::error::ConfigWarning;
use serde::{Deserialize, Serialize};

/// Modem parameters, fixed for the lifetime of the process
///
/// Built once (usually via [`Default`] or a JSON overlay in the CLI) and passed
/// by reference into the encoder and decoder. Nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModemConfig {
    pub sample_rate: u32,
    /// Peak amplitude of every generated tone
    pub amplitude: f64,
    /// Bits per second
    pub bit_rate: f64,
    /// Space tone, transmitted for a '0' bit
    pub freq_0: f64,
    /// Mark tone, transmitted for a '1' bit
    pub freq_1: f64,

    pub am_modulation: bool,
    pub am_modulation_freq: f64,
    pub am_modulation_depth: f64,

    pub sync_tone_freq: f64,
    /// Seconds
    pub sync_tone_duration: f64,
    pub end_tone_freq: f64,
    /// Seconds
    pub end_tone_duration: f64,

    // Harmonics are carried as configuration only, the synthesizer never mixes them in.
    pub add_harmonics: bool,
    pub harmonic_2_amplitude_factor: f64,
    pub harmonic_3_amplitude_factor: f64,

    /// Number of times each bit is repeated on the wire
    pub fec_redundancy: usize,

    pub energy_threshold: f64,
    pub sync_detection_multiplier: f64,
    pub end_detection_multiplier: f64,
    /// Not consulted by the decoder
    pub end_detection_confirmations: u32,
    pub bit_decision_ratio_threshold: f64,
    /// Not consulted by the decoder
    pub min_raw_bits_before_end_check: usize,
    /// Hard cap on demodulated bits, guarantees termination on garbage input
    pub max_decoded_bits: usize,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            sample_rate: crate::SAMPLE_RATE,
            amplitude: 0.3,
            bit_rate: 100.0,
            freq_0: 523.25,
            freq_1: 659.25,
            am_modulation: true,
            am_modulation_freq: 4.0,
            am_modulation_depth: 0.4,
            sync_tone_freq: 800.0,
            sync_tone_duration: 0.1,
            end_tone_freq: 2500.0,
            end_tone_duration: 0.1,
            add_harmonics: false,
            harmonic_2_amplitude_factor: 0.0,
            harmonic_3_amplitude_factor: 0.0,
            fec_redundancy: 1,
            energy_threshold: 1e-8,
            sync_detection_multiplier: 3.0,
            end_detection_multiplier: 4.0,
            end_detection_confirmations: 3,
            bit_decision_ratio_threshold: 1.4,
            min_raw_bits_before_end_check: 64,
            max_decoded_bits: crate::MAX_DECODED_BITS,
        }
    }
}

impl ModemConfig {
    /// Check the parameters and report anything suspicious.
    ///
    /// Never fails: the modem keeps running with whatever was configured.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.freq_0 >= self.freq_1 {
            warnings.push(ConfigWarning::FrequencyOrder {
                freq_0: self.freq_0,
                freq_1: self.freq_1,
            });
        }
        if self.sample_rate == 0 {
            warnings.push(ConfigWarning::ZeroSampleRate);
        }
        if !(self.bit_rate > 0.0) {
            warnings.push(ConfigWarning::NonPositiveBitRate(self.bit_rate));
        }
        let bit_samples = self.bit_duration_samples();
        if bit_samples < 50 {
            warnings.push(ConfigWarning::ShortBitDuration(bit_samples));
        }
        if !(0.0..=1.0).contains(&self.am_modulation_depth) {
            warnings.push(ConfigWarning::AmDepthOutOfRange(self.am_modulation_depth));
        }
        if self.end_detection_confirmations < 1 {
            warnings.push(ConfigWarning::EndConfirmations(self.end_detection_confirmations));
        }
        if self.fec_redundancy < 1 {
            warnings.push(ConfigWarning::FecRedundancy(self.fec_redundancy));
        }

        warnings
    }

    /// Duration of one bit tone in seconds (zero when the bit rate is unusable)
    pub fn bit_duration(&self) -> f64 {
        if self.bit_rate > 0.0 {
            1.0 / self.bit_rate
        } else {
            0.0
        }
    }

    /// Samples per bit window on the receive side, at least 1
    pub fn bit_duration_samples(&self) -> usize {
        if self.bit_rate > 0.0 {
            ((self.sample_rate as f64 / self.bit_rate).floor() as usize).max(1)
        } else {
            1
        }
    }

    pub fn sync_samples(&self) -> usize {
        self.duration_to_samples(self.sync_tone_duration)
    }

    pub fn end_samples(&self) -> usize {
        self.duration_to_samples(self.end_tone_duration)
    }

    /// Effective repetition factor, values below 1 are treated as 1
    pub fn redundancy(&self) -> usize {
        self.fec_redundancy.max(1)
    }

    /// Goertzel energy a window must exceed to be accepted as the sync tone
    pub fn required_sync_energy(&self) -> f64 {
        self.energy_threshold * self.sync_detection_multiplier
    }

    /// `floor(seconds * sample_rate)`, negative durations give zero samples
    pub fn duration_to_samples(&self, seconds: f64) -> usize {
        let samples = (seconds * self.sample_rate as f64).floor();
        if samples > 0.0 {
            samples as usize
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_derived_values() {
        let config = ModemConfig::default();
        assert_eq!(config.bit_duration_samples(), 441);
        assert_eq!(config.sync_samples(), 4410);
        assert_eq!(config.end_samples(), 4410);
        assert_eq!(config.redundancy(), 1);
        assert!((config.bit_duration() - 0.01).abs() < 1e-12);
        assert!((config.required_sync_energy() - 3e-8).abs() < 1e-20);
    }

    #[test]
    fn test_default_config_has_no_warnings() {
        assert!(ModemConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let config = ModemConfig {
            freq_0: 700.0,
            freq_1: 600.0,
            bit_rate: 2000.0,
            am_modulation_depth: 1.5,
            end_detection_confirmations: 0,
            fec_redundancy: 0,
            ..ModemConfig::default()
        };
        let warnings = config.validate();
        assert!(warnings.contains(&ConfigWarning::FrequencyOrder { freq_0: 700.0, freq_1: 600.0 }));
        assert!(warnings.contains(&ConfigWarning::ShortBitDuration(22)));
        assert!(warnings.contains(&ConfigWarning::AmDepthOutOfRange(1.5)));
        assert!(warnings.contains(&ConfigWarning::EndConfirmations(0)));
        assert!(warnings.contains(&ConfigWarning::FecRedundancy(0)));
        assert_eq!(config.redundancy(), 1);
    }

    #[test]
    fn test_zero_bit_rate_is_a_warning_not_a_panic() {
        let config = ModemConfig { bit_rate: 0.0, ..ModemConfig::default() };
        let warnings = config.validate();
        assert!(warnings.contains(&ConfigWarning::NonPositiveBitRate(0.0)));
        assert_eq!(config.bit_duration(), 0.0);
        assert_eq!(config.bit_duration_samples(), 1);
    }

    #[test]
    fn test_negative_duration_gives_zero_samples() {
        let config = ModemConfig::default();
        assert_eq!(config.duration_to_samples(-0.5), 0);
        assert_eq!(config.duration_to_samples(0.0), 0);
    }
}
