//! Encoding detection and decoding for byte input.

use crate::error::EncodingError;

/// Detect the encoding of raw bytes using chardet, normalized to the
/// labels [`decode_content`] understands.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes with the given encoding label.
///
/// UTF-8 input must be valid. Other labels known to `encoding_rs` decode
/// with replacement characters; unknown labels are refused. A leading
/// byte order mark is removed.
pub fn decode_content(bytes: &[u8], encoding: &str) -> Result<String, EncodingError> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => {
            String::from_utf8(bytes.to_vec()).map_err(|e| EncodingError::Invalid {
                encoding: "utf-8".to_string(),
                message: e.to_string(),
            })?
        }
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => {
            let codec = encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| EncodingError::Unsupported(label.to_string()))?;
            codec.decode(bytes).0.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Detect then decode. Falls back to lossy UTF-8 when the detected
/// encoding cannot be decoded.
pub fn decode_auto(bytes: &[u8]) -> (String, String) {
    let encoding = detect_encoding(bytes);
    match decode_content(bytes, &encoding) {
        Ok(text) => (text, encoding),
        Err(e) => {
            log::warn!("Falling back to lossy UTF-8: {}", e);
            let text = String::from_utf8_lossy(bytes);
            let text = text.strip_prefix('\u{feff}').unwrap_or(&text).to_string();
            (text, "utf-8".to_string())
        }
    }
}
