use thiserror::Error;

/// Failures while parsing a RIFF/WAVE container
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WavError {
    #[error("File too small ({0} bytes, need at least 44)")]
    TooShort(usize),

    #[error("Missing '{0}' marker")]
    MissingMarker(&'static str),

    #[error("Invalid 'fmt ' chunk size: {0}")]
    InvalidFmtChunk(u32),

    #[error("Unsupported audio format: {0} (only PCM is supported)")]
    UnsupportedFormat(u16),

    #[error("Unsupported channel count: {0} (only mono is supported)")]
    UnsupportedChannels(u16),

    #[error("Unsupported bits per sample: {0} (only 16-bit is supported)")]
    UnsupportedBitDepth(u16),

    #[error("'data' chunk not found")]
    MissingDataChunk,

    #[error("'data' chunk contains no samples")]
    NoSamples,
}

/// Which part of the decode pipeline ran short of bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    Demodulation,
    FecReduction,
}

impl std::fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeStage::Demodulation => f.write_str("demodulation"),
            DecodeStage::FecReduction => f.write_str("FEC reduction"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModemError {
    #[error("WAV parse error: {0}")]
    Container(#[from] WavError),

    #[error("Sample rate mismatch: file={actual}, expected={expected}")]
    SampleRateMismatch { expected: u32, actual: u32 },

    #[error("Sync tone not detected (max energy {max_energy:.3e}, required > {required:.3e})")]
    SyncNotFound { max_energy: f64, required: f64 },

    #[error("Insufficient bits after {stage} ({bits})")]
    InsufficientBits { bits: usize, stage: DecodeStage },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl ModemError {
    /// Stable name of the failure kind, used by outer layers to tag results
    pub fn kind(&self) -> &'static str {
        match self {
            ModemError::Container(_) => "ContainerParseError",
            ModemError::SampleRateMismatch { .. } => "SampleRateMismatch",
            ModemError::SyncNotFound { .. } => "SyncNotFound",
            ModemError::InsufficientBits { .. } => "InsufficientBits",
            ModemError::Decode(_) => "GenericDecodeError",
        }
    }
}

/// Non-fatal configuration problems found by [`crate::ModemConfig::validate`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigWarning {
    #[error("FREQ_0 ({freq_0} Hz) >= FREQ_1 ({freq_1} Hz)")]
    FrequencyOrder { freq_0: f64, freq_1: f64 },

    #[error("Bit duration is only {0} samples, detection will be unreliable below 50")]
    ShortBitDuration(usize),

    #[error("AM modulation depth {0} is outside [0, 1]")]
    AmDepthOutOfRange(f64),

    #[error("End detection confirmations should be at least 1 (got {0})")]
    EndConfirmations(u32),

    #[error("FEC redundancy must be at least 1 (got {0}), using 1")]
    FecRedundancy(usize),

    #[error("Sample rate must be non-zero")]
    ZeroSampleRate,

    #[error("Bit rate must be positive (got {0})")]
    NonPositiveBitRate(f64),
}

pub type Result<T> = std::result::Result<T, ModemError>;
