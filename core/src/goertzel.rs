use std::f64::consts::PI;

/// Energy of the DFT bin nearest `freq` over `samples`, via the Goertzel filter
///
/// Only one bin is evaluated, which is all sync detection and mark/space
/// comparison need. The bin index is `round(len * freq / sample_rate)`, so the
/// frequency resolution is `sample_rate / len`. Returns 0 for an empty window.
pub fn energy(samples: &[f32], freq: f64, sample_rate: u32) -> f64 {
    let n = samples.len();
    if n == 0 || sample_rate == 0 {
        return 0.0;
    }

    let k = (0.5 + n as f64 * freq / sample_rate as f64).floor();
    let omega = 2.0 * PI * k / n as f64;
    let (sin_omega, cos_omega) = omega.sin_cos();
    let coeff = 2.0 * cos_omega;

    let mut q1 = 0.0f64;
    let mut q2 = 0.0f64;

    for &sample in samples {
        let q0 = sample as f64 + coeff * q1 - q2;
        q2 = q1;
        q1 = q0;
    }

    // Magnitude squared of the bin
    let real = q1 - q2 * cos_omega;
    let imag = q2 * sin_omega;
    real * real + imag * imag
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44100;

    fn sine(freq: f64, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / SAMPLE_RATE as f64).sin() as f32)
            .collect()
    }

    #[test]
    fn test_empty_window_has_no_energy() {
        assert_eq!(energy(&[], 1000.0, SAMPLE_RATE), 0.0);
    }

    #[test]
    fn test_silence_has_no_energy() {
        let silence = vec![0.0f32; 4410];
        for freq in [100.0, 523.25, 800.0, 2500.0, 10000.0] {
            assert_eq!(energy(&silence, freq, SAMPLE_RATE), 0.0);
        }
    }

    #[test]
    fn test_on_bin_energy_dominates() {
        // 441 samples of 1 kHz is exactly 10 periods, bins are 100 Hz apart
        let window = sine(1000.0, 441);
        let on_bin = energy(&window, 1000.0, SAMPLE_RATE);

        for off in [1200.0, 800.0, 1500.0, 3000.0] {
            let off_bin = energy(&window, off, SAMPLE_RATE);
            assert!(
                on_bin > off_bin * 1000.0,
                "on={} off({})={}",
                on_bin,
                off,
                off_bin
            );
        }
    }

    #[test]
    fn test_on_bin_energy_matches_dft_magnitude() {
        // A unit sine on an exact bin has |X[k]| = N/2
        let window = sine(1000.0, 441);
        let expected = (441.0f64 / 2.0).powi(2);
        let measured = energy(&window, 1000.0, SAMPLE_RATE);
        assert!((measured - expected).abs() / expected < 1e-4, "measured={}", measured);
    }

    #[test]
    fn test_frequency_is_rounded_to_nearest_bin() {
        let window = sine(1000.0, 441);
        // 1030 Hz rounds to the 1000 Hz bin at 100 Hz resolution
        let exact = energy(&window, 1000.0, SAMPLE_RATE);
        let nearby = energy(&window, 1030.0, SAMPLE_RATE);
        assert_eq!(exact, nearby);
    }

    #[test]
    fn test_energy_scales_with_square_of_amplitude() {
        let loud = sine(2000.0, 882);
        let quiet: Vec<f32> = loud.iter().map(|s| s * 0.5).collect();
        let ratio = energy(&loud, 2000.0, SAMPLE_RATE) / energy(&quiet, 2000.0, SAMPLE_RATE);
        assert!((ratio - 4.0).abs() < 1e-3, "ratio={}", ratio);
    }
}
