// ============================================================================
// END-TO-END MODEM TESTS
// ============================================================================
// Full text -> PCM -> WAV -> PCM -> text round trips under the default
// configuration (44.1 kHz, 100 bit/s). A long message is a few hundred
// thousand samples, so these run noticeably faster with --release.
// ============================================================================

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tonelink_core::bits::text_to_bits;
use tonelink_core::{
    decode_samples, decode_wav, encode_text, encode_wav, fec, wav, DecodeStage, FrameEncoder,
    ModemConfig, ModemError,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn expected_samples(config: &ModemConfig, text: &str) -> usize {
    let bits = text.chars().count() * 8 * config.redundancy();
    let seconds = config.sync_tone_duration
        + bits as f64 * config.bit_duration()
        + config.end_tone_duration;
    (seconds * config.sample_rate as f64).floor() as usize
}

#[test]
fn test_hi_reference_case() {
    init_logging();
    let config = ModemConfig::default();

    assert_eq!(text_to_bits("Hi"), "0100100001101001");

    let wav_bytes = encode_wav(&config, "Hi");
    let audio = wav::decode(&wav_bytes).expect("Failed to parse WAV");
    assert_eq!(audio.sample_rate, 44100);
    assert_eq!(audio.samples.len(), 15876, "0.36 s at 44.1 kHz");

    let decoded = decode_wav(&config, &wav_bytes).expect("Failed to decode");
    assert_eq!(decoded, "Hi");
}

#[test]
fn test_round_trip_all_printable_ascii() {
    init_logging();
    let config = ModemConfig::default();
    let printable: String = (32u8..=126).map(char::from).collect();

    let samples = encode_text(&config, &printable);
    let decoded = decode_samples(&config, &samples, config.sample_rate).expect("Failed to decode");

    assert_eq!(decoded, printable);
}

#[test]
fn test_round_trip_through_wav_bytes() {
    init_logging();
    let config = ModemConfig::default();

    for message in ["Hello, Audio Modem!", "a", "  spaces  ", "0123456789", "~!@#$%^&*()"] {
        let wav_bytes = encode_wav(&config, message);
        let decoded = decode_wav(&config, &wav_bytes).expect("Failed to decode");
        assert_eq!(decoded, message, "WAV round trip failed for {:?}", message);
    }
}

#[test]
fn test_sample_count_is_deterministic() {
    let config = ModemConfig::default();

    for message in ["", "A", "Hi", "Hello, World!", "The quick brown fox"] {
        let samples = encode_text(&config, message);
        assert_eq!(samples.len(), expected_samples(&config, message), "{:?}", message);

        let wav_bytes = encode_wav(&config, message);
        let data_size = u32::from_le_bytes([wav_bytes[40], wav_bytes[41], wav_bytes[42], wav_bytes[43]]);
        assert_eq!(data_size as usize, samples.len() * 2);
        assert_eq!(wav_bytes.len(), wav::WAV_HEADER_SIZE + samples.len() * 2);
    }
}

#[test]
fn test_round_trip_with_trailing_silence() {
    let config = ModemConfig::default();
    let mut samples = encode_text(&config, "silence after");
    samples.extend(vec![0.0; config.sample_rate as usize]);

    let decoded = decode_samples(&config, &samples, config.sample_rate).expect("Failed to decode");
    assert_eq!(decoded, "silence after");
}

#[test]
fn test_round_trip_with_gaussian_noise() {
    init_logging();
    let config = ModemConfig::default();
    let message = "Noisy channel";
    let mut samples = encode_text(&config, message);

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let noise = Normal::new(0.0f32, 0.02).unwrap();
    for sample in samples.iter_mut() {
        *sample += noise.sample(&mut rng);
    }

    let decoded = decode_samples(&config, &samples, config.sample_rate).expect("Failed to decode");
    assert_eq!(decoded, message);
}

#[test]
fn test_round_trip_without_am() {
    let config = ModemConfig {
        am_modulation: false,
        ..ModemConfig::default()
    };
    let samples = encode_text(&config, "flat tones");
    let decoded = decode_samples(&config, &samples, config.sample_rate).expect("Failed to decode");
    assert_eq!(decoded, "flat tones");
}

#[test]
fn test_fec_majority_vote_corrects_flipped_bits() {
    init_logging();
    let config = ModemConfig {
        fec_redundancy: 3,
        ..ModemConfig::default()
    };
    let message = "FEC";

    // Flip the middle copy of every bit before modulation
    let expanded = fec::expand(&text_to_bits(message), 3);
    let corrupted: String = expanded
        .chars()
        .enumerate()
        .map(|(i, bit)| match (i % 3, bit) {
            (1, '0') => '1',
            (1, _) => '0',
            (_, b) => b,
        })
        .collect();

    let samples = FrameEncoder::new(&config).encode_bits(&corrupted);
    let decoded = decode_samples(&config, &samples, config.sample_rate).expect("Failed to decode");
    assert_eq!(decoded, message);
}

#[test]
fn test_truncated_wav_still_decodes() {
    let config = ModemConfig::default();
    let message = "cut short";
    let wav_bytes = encode_wav(&config, message);

    // Keep the data bits plus part of the end tone; the header still claims the full size
    let data_end = config.sync_samples() + message.len() * 8 * config.bit_duration_samples();
    let keep = wav::WAV_HEADER_SIZE + (data_end + 2000) * 2 + 1;
    let decoded = decode_wav(&config, &wav_bytes[..keep]).expect("Failed to decode");
    assert_eq!(decoded, message);
}

#[test]
fn test_silence_has_no_sync() {
    let config = ModemConfig::default();
    let wav_bytes = wav::encode(&vec![0.0; 44100], 44100);

    match decode_wav(&config, &wav_bytes) {
        Err(ModemError::SyncNotFound { max_energy, required }) => {
            assert!(max_energy < required);
            assert!((required - config.energy_threshold * config.sync_detection_multiplier).abs() < 1e-20);
        }
        other => panic!("expected SyncNotFound, got {:?}", other),
    }
}

#[test]
fn test_sample_rate_mismatch_from_wav() {
    let config = ModemConfig::default();
    let samples = encode_text(&config, "rate");
    let wav_bytes = wav::encode(&samples, 48000);

    let err = decode_wav(&config, &wav_bytes).unwrap_err();
    assert_eq!(
        err,
        ModemError::SampleRateMismatch {
            expected: 44100,
            actual: 48000
        }
    );
}

#[test]
fn test_sync_only_is_insufficient() {
    let config = ModemConfig::default();
    // Empty text: sync straight into end tone, which stops demodulation at once
    let samples = encode_text(&config, "");

    match decode_samples(&config, &samples, config.sample_rate) {
        Err(ModemError::InsufficientBits { bits, stage }) => {
            assert_eq!(bits, 0);
            assert_eq!(stage, DecodeStage::Demodulation);
        }
        other => panic!("expected InsufficientBits, got {:?}", other),
    }
}

#[test]
fn test_container_errors_surface_as_modem_errors() {
    let config = ModemConfig::default();
    let err = decode_wav(&config, b"definitely not a wav file, just some text bytes").unwrap_err();
    assert_eq!(err.kind(), "ContainerParseError");
}
