//! Minimal `data:` URL handling for signature and stamp bitmaps

use crate::ModelError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Decoded `data:<mime>;base64,<payload>` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn parse(url: &str) -> Result<Self, ModelError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| invalid("missing data: prefix"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("missing payload separator"))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| invalid("only base64 payloads are supported"))?;
        let bytes = STANDARD.decode(payload.trim())?;

        Ok(Self {
            mime: mime.to_string(),
            bytes,
        })
    }

    pub fn encode(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    pub fn is_svg(&self) -> bool {
        self.mime == "image/svg+xml"
    }
}

fn invalid(reason: &str) -> ModelError {
    ModelError::InvalidDataUrl(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base64_payload() {
        let url = DataUrl::encode("image/png", b"abc");
        let parsed = DataUrl::parse(&url).unwrap();
        assert_eq!(parsed.mime, "image/png");
        assert_eq!(parsed.bytes, b"abc");
        assert!(!parsed.is_svg());
    }

    #[test]
    fn rejects_non_data_urls() {
        assert!(DataUrl::parse("https://example.com/a.png").is_err());
        assert!(DataUrl::parse("data:image/png,raw").is_err());
        assert!(DataUrl::parse("data:image/png;base64,@@@").is_err());
    }
}
