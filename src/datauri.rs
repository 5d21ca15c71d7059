//! Base64 data URIs: the portable form of image entries and exported documents

use base64::engine::general_purpose::STANDARD;
use base64::Engine as Base64Engine;

use crate::{Error, Result};

/// A decoded `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Media type such as `image/png`
    pub media_type: String,
    /// Extra `key=value` parameters between the media type and `;base64`
    pub params: Vec<(String, String)>,
    /// Raw payload bytes
    pub data: Vec<u8>,
}

impl DataUri {
    /// Look up a parameter by key
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Encode `data` as `data:<media_type>;base64,<payload>`.
pub fn encode(media_type: &str, data: &[u8]) -> String {
    encode_with_params(media_type, &[], data)
}

/// Encode with extra parameters, e.g. `data:application/pdf;filename=a.pdf;base64,...`.
pub fn encode_with_params(media_type: &str, params: &[(&str, &str)], data: &[u8]) -> String {
    let mut out = String::with_capacity(media_type.len() + 16 + data.len() * 4 / 3);
    out.push_str("data:");
    out.push_str(media_type);
    for (k, v) in params {
        out.push(';');
        out.push_str(k);
        out.push('=');
        out.push_str(v);
    }
    out.push_str(";base64,");
    STANDARD.encode_string(data, &mut out);
    out
}

/// Parse a base64 data URI. Percent-encoded (non-base64) URIs are rejected.
pub fn parse(uri: &str) -> Result<DataUri> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::InvalidDataUri("missing `data:` scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::InvalidDataUri("missing `,` separator".to_string()))?;

    let mut parts = header.split(';');
    let media_type = parts.next().unwrap_or_default().trim().to_ascii_lowercase();

    let mut params = Vec::new();
    let mut is_base64 = false;
    for part in parts {
        if part.eq_ignore_ascii_case("base64") {
            is_base64 = true;
        } else if let Some((k, v)) = part.split_once('=') {
            params.push((k.trim().to_string(), v.trim().to_string()));
        }
    }
    if !is_base64 {
        return Err(Error::InvalidDataUri(
            "only base64 payloads are supported".to_string(),
        ));
    }

    let data = STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::InvalidDataUri(format!("bad base64 payload: {}", e)))?;

    Ok(DataUri {
        media_type,
        params,
        data,
    })
}
