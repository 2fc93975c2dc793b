use tonelink_core::{FrameDecoder, FrameEncoder, ModemConfig};
use wasm_bindgen::prelude::*;

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse a partial JSON config, missing fields keep their defaults
fn config_from_json(json: &str) -> Result<ModemConfig, JsValue> {
    serde_json::from_str(json).map_err(|e| to_js_error(format!("Invalid config: {}", e)))
}

#[wasm_bindgen]
pub struct WasmEncoder {
    config: ModemConfig,
}

#[wasm_bindgen]
impl WasmEncoder {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmEncoder {
        WasmEncoder {
            config: ModemConfig::default(),
        }
    }

    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<WasmEncoder, JsValue> {
        config_from_json(json).map(|config| WasmEncoder { config })
    }

    /// Encode text into a complete mono 16-bit WAV file (Uint8Array)
    pub fn encode(&self, text: &str) -> Vec<u8> {
        tonelink_core::encode_wav(&self.config, text)
    }

    /// Encode text into raw samples (Float32Array) for Web Audio playback
    #[wasm_bindgen(js_name = encodeSamples)]
    pub fn encode_samples(&self, text: &str) -> Vec<f32> {
        FrameEncoder::new(&self.config).encode(text)
    }

    #[wasm_bindgen(js_name = sampleRate)]
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}

impl Default for WasmEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
pub struct WasmDecoder {
    config: ModemConfig,
}

#[wasm_bindgen]
impl WasmDecoder {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmDecoder {
        WasmDecoder {
            config: ModemConfig::default(),
        }
    }

    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<WasmDecoder, JsValue> {
        config_from_json(json).map(|config| WasmDecoder { config })
    }

    /// Decode the text carried by a WAV file (Uint8Array)
    pub fn decode(&self, wav_bytes: &[u8]) -> Result<String, JsValue> {
        tonelink_core::decode_wav(&self.config, wav_bytes).map_err(to_js_error)
    }

    /// Decode recorded samples (Float32Array) captured at `sample_rate`
    #[wasm_bindgen(js_name = decodeSamples)]
    pub fn decode_samples(&self, samples: &[f32], sample_rate: u32) -> Result<String, JsValue> {
        FrameDecoder::new(&self.config)
            .decode(samples, sample_rate)
            .map_err(to_js_error)
    }
}

impl Default for WasmDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wasm_round_trip() {
        let encoder = WasmEncoder::new();
        let wav_bytes = encoder.encode("wasm");
        assert_eq!(&wav_bytes[0..4], b"RIFF");

        let decoder = WasmDecoder::new();
        assert_eq!(decoder.decode(&wav_bytes).ok(), Some("wasm".to_string()));

        let samples = encoder.encode_samples("wasm");
        assert_eq!(
            decoder.decode_samples(&samples, encoder.sample_rate()).ok(),
            Some("wasm".to_string())
        );
    }

    #[test]
    fn test_config_overlay() {
        let encoder = WasmEncoder::with_config(r#"{ "sample_rate": 22050 }"#).ok().unwrap();
        assert_eq!(encoder.sample_rate(), 22050);
    }
}
