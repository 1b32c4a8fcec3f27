use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::error::DecodeError;

/// Decodes a url-safe base64 body, padded form first, then unpadded.
pub fn decode_body(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let encoded = encoded.trim();
    match URL_SAFE.decode(encoded) {
        Ok(bytes) => Ok(bytes),
        Err(padded) => URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|unpadded| DecodeError { padded, unpadded }),
    }
}

/// Decoded body as text. Invalid UTF-8 is replaced and CRLF becomes LF.
pub fn decode_body_text(encoded: &str) -> Result<String, DecodeError> {
    let bytes = decode_body(encoded)?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_and_unpadded_decode_to_same_bytes() {
        let raw = "Amount: $1.00\n"; // 14 bytes, needs padding
        let padded = URL_SAFE.encode(raw);
        let unpadded = URL_SAFE_NO_PAD.encode(raw);
        assert!(padded.ends_with('='));
        assert_ne!(padded, unpadded);

        let a = decode_body(&padded).expect("padded decodes");
        let b = decode_body(&unpadded).expect("unpadded decodes");
        assert_eq!(a, b);
        assert_eq!(a, raw.as_bytes());
    }

    #[test]
    fn url_safe_alphabet_is_accepted() {
        let raw = [0xfb_u8, 0xff, 0xbf];
        let encoded = URL_SAFE_NO_PAD.encode(raw);
        assert!(encoded.contains('-') || encoded.contains('_'));
        assert_eq!(decode_body(&encoded).expect("decode"), raw);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_body("not*base64!").expect_err("should fail");
        assert!(err.to_string().contains("url-safe base64"));
    }

    #[test]
    fn text_normalizes_line_endings() {
        let encoded = URL_SAFE.encode("a\r\nb\r\n");
        assert_eq!(decode_body_text(&encoded).expect("decode"), "a\nb\n");
    }
}
