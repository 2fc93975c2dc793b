use crate::config::ModemConfig;
use std::f64::consts::PI;

/// Tone generator - produces single-frequency sine segments
///
/// Each tone is optionally amplitude-modulated by a slow sine (AM depth and
/// rate come from the configuration) and scaled to the configured amplitude.
/// Phase is computed in f64 so long segments stay phase-accurate.
pub struct ToneSynthesizer<'a> {
    config: &'a ModemConfig,
}

impl<'a> ToneSynthesizer<'a> {
    pub fn new(config: &'a ModemConfig) -> Self {
        Self { config }
    }

    /// Generate `floor(duration * sample_rate)` samples of a sine at `freq`
    pub fn generate_tone(&self, freq: f64, duration: f64) -> Vec<f32> {
        let num_samples = self.config.duration_to_samples(duration);
        if num_samples == 0 {
            return Vec::new();
        }

        let sample_rate = self.config.sample_rate as f64;
        let amplitude = self.config.amplitude;

        (0..num_samples)
            .map(|i| {
                let t = i as f64 / sample_rate;
                let carrier = (2.0 * PI * freq * t).sin();
                let value = carrier * self.am_multiplier(t) * amplitude;
                value.clamp(-1.0, 1.0) as f32
            })
            .collect()
    }

    /// Generate a tone and taper it with a Hann envelope
    pub fn shaped_tone(&self, freq: f64, duration: f64) -> Vec<f32> {
        let mut tone = self.generate_tone(freq, duration);
        apply_envelope(&mut tone);
        tone
    }

    fn am_multiplier(&self, t: f64) -> f64 {
        let depth = self.config.am_modulation_depth;
        if !self.config.am_modulation || depth <= 0.0 {
            return 1.0;
        }
        let modulator = 0.5 + 0.5 * (2.0 * PI * self.config.am_modulation_freq * t).sin();
        (1.0 - depth) + depth * modulator
    }
}

/// Multiply a buffer in place by a raised-cosine (Hann) window.
///
/// Both ends fall to zero so adjacent tones do not click into each other's
/// Goertzel windows. Buffers of one sample or less are left untouched.
pub fn apply_envelope(samples: &mut [f32]) {
    let n = samples.len();
    if n <= 1 {
        return;
    }

    let denom = (n - 1) as f64;
    for (i, sample) in samples.iter_mut().enumerate() {
        let weight = 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos());
        *sample = (*sample as f64 * weight) as f32;
    }
}
