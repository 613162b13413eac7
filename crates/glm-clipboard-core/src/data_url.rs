//! `data:` URL decoding.
//!
//! Accepts `data:[<mime>][;charset=<cs>][;base64],<payload>`. A string that
//! does not have that shape is simply not a data URL and yields `Ok(None)`;
//! only a payload that claims an encoding and then fails to decode is an error.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use std::sync::LazyLock;

/// MIME type assumed when the URL omits one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^data:([^;,]+)?(?:;charset=[^;,]+)?(;base64)?,(.*)$")
        .expect("data URL pattern is valid")
});

/// Standard alphabet; padding optional, trailing bits tolerated.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("percent-decoded payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A decoded data URL. The MIME type is always lower-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Parse a data URL into its MIME type and raw bytes.
pub fn parse_data_url(url: &str) -> Result<Option<DataUrl>, DataUrlError> {
    let Some(captures) = DATA_URL_RE.captures(url) else {
        return Ok(None);
    };

    let mime_type = captures
        .get(1)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
    let is_base64 = captures.get(2).is_some();
    let payload = captures.get(3).map(|m| m.as_str()).unwrap_or("");

    let bytes = if is_base64 {
        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        PAYLOAD_ENGINE.decode(compact)?
    } else {
        urlencoding::decode(payload)?.into_owned().into_bytes()
    };

    Ok(Some(DataUrl { mime_type, bytes }))
}
