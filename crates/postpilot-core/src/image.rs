//! Generated illustration held between synthesis and publishing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::error::{PostPilotError, Result};

/// Image bytes plus a preview handle.
///
/// The raw payload is kept for the upload step while `display_reference`
/// serves previews.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    display_reference: String,
    payload: Vec<u8>,
    mime_type: String,
}

impl GeneratedImage {
    /// Accepts `payload` only when `mime_type` is in the `image/*` family.
    ///
    /// Content-type parameters (`; charset=...`) are stripped.
    pub fn from_payload(payload: Vec<u8>, mime_type: &str) -> Result<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if !essence.starts_with("image/") {
            return Err(PostPilotError::NonImageResponse {
                mime_type: mime_type.to_string(),
            });
        }

        let display_reference = format!(
            "data:{};base64,{}",
            essence,
            BASE64_STANDARD.encode(&payload)
        );

        Ok(Self {
            display_reference,
            payload,
            mime_type: essence,
        })
    }

    /// A `data:` URI any image viewer or browser can render.
    pub fn display_reference(&self) -> &str {
        &self.display_reference
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File extension matching the mime subtype (`png`, `jpg`, ...).
    pub fn file_extension(&self) -> &str {
        match self.mime_type.trim_start_matches("image/") {
            "jpeg" | "jpg" => "jpg",
            "svg+xml" => "svg",
            other => other,
        }
    }
}

impl std::fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.payload.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_is_accepted() {
        let image = GeneratedImage::from_payload(vec![0x89, b'P', b'N', b'G'], "image/png").unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.payload(), &[0x89, b'P', b'N', b'G']);
        assert!(image.display_reference().starts_with("data:image/png;base64,"));
        assert_eq!(image.file_extension(), "png");
    }

    #[test]
    fn test_text_plain_is_rejected() {
        let err = GeneratedImage::from_payload(b"hello".to_vec(), "text/plain").unwrap_err();
        assert_eq!(
            err,
            PostPilotError::NonImageResponse {
                mime_type: "text/plain".to_string()
            }
        );
    }

    #[test]
    fn test_parameters_are_stripped() {
        let image = GeneratedImage::from_payload(vec![1, 2, 3], "Image/JPEG; q=0.9").unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.file_extension(), "jpg");
    }
}
