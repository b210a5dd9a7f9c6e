//! `data:<mime>;base64,<payload>` strings, the form the worker uses for images
//! in both directions.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use thiserror::Error;

/// Media type the worker expects for uploaded images.
pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// Marker that identifies an image payload inside a response text.
pub const IMAGE_MARKER: &str = "data:image";

#[derive(Debug, Error)]
pub enum DataUriError {
    #[error("data URI has no ',' separating header and payload")]
    MissingSeparator,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Encode `bytes` as a base64 data URI with the given media type.
pub fn encode(media_type: &str, bytes: impl AsRef<[u8]>) -> String {
    format!(
        "data:{media_type};base64,{}",
        BASE64_STANDARD.encode(bytes.as_ref())
    )
}

/// Read a file and encode it as a JPEG data URI.
///
/// The media type is always `image/jpeg`, whatever the file actually holds.
pub fn jpeg_from_path<P: AsRef<Path>>(path: P) -> Result<String, std::io::Error> {
    let data = std::fs::read(path.as_ref())?;
    log::debug!(
        "encoding {} ({} bytes) as data URI",
        path.as_ref().display(),
        data.len()
    );
    Ok(encode(JPEG_MEDIA_TYPE, data))
}

/// Whether `text` looks like it carries image data.
pub fn contains_image(text: &str) -> bool {
    text.contains(IMAGE_MARKER)
}

/// Split at the first comma into `(header, payload)`.
pub fn split(uri: &str) -> Result<(&str, &str), DataUriError> {
    uri.split_once(',').ok_or(DataUriError::MissingSeparator)
}

/// Decode the base64 payload of a data URI.
///
/// ASCII whitespace in the payload (line-wrapped base64) is ignored.
pub fn decode(uri: &str) -> Result<Vec<u8>, DataUriError> {
    let (_header, payload) = split(uri)?;
    let cleaned = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect::<Vec<u8>>();
    Ok(BASE64_STANDARD.decode(cleaned)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uses_jpeg_prefix() {
        let uri = encode(JPEG_MEDIA_TYPE, [0xff, 0xd8, 0xff]);
        assert_eq!(uri, "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_decode_returns_original_bytes() {
        let bytes = b"not really a jpeg".to_vec();
        let uri = encode(JPEG_MEDIA_TYPE, &bytes);
        assert_eq!(decode(&uri).unwrap(), bytes);
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        let uri = "data:image/jpeg;base64,AQID\r\nBAUG\n BwgJ\n";
        assert_eq!(decode(uri).unwrap(), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_split_at_first_comma_only() {
        let (header, payload) = split("data:image/png;base64,AAAA,BBBB").unwrap();
        assert_eq!(header, "data:image/png;base64");
        assert_eq!(payload, "AAAA,BBBB");
    }

    #[test]
    fn test_missing_separator() {
        let err = decode("see data:image for details").unwrap_err();
        assert!(matches!(err, DataUriError::MissingSeparator));
    }

    #[test]
    fn test_invalid_payload() {
        let err = decode("data:image/jpeg;base64,@@@").unwrap_err();
        assert!(matches!(err, DataUriError::Base64(_)));
    }

    #[test]
    fn test_contains_image_is_substring_match() {
        assert!(contains_image("here: data:image/jpeg;base64,AAAA"));
        assert!(!contains_image("a plain description"));
    }

    #[test]
    fn test_jpeg_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.jpg");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        assert_eq!(jpeg_from_path(&path).unwrap(), "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn test_jpeg_from_missing_path() {
        let err = jpeg_from_path("/definitely/not/here.jpg").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
