//! Avatar images arrive as `data:<mime>;base64,<payload>` URLs and are stored
//! on the user verbatim. [`validate_avatar`] gates what may be stored.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use store::AvatarConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvatarError {
    #[error("Avatar must be a base64 data URL")]
    NotDataUrl,
    #[error("Please choose a JPEG, PNG, GIF or WebP image")]
    UnsupportedType(String),
    #[error("Avatar image data is corrupt")]
    InvalidEncoding,
    #[error("Image must be smaller than {limit}")]
    TooLarge { limit: String },
}

/// Check the MIME type against `allowed_types` and the decoded size against
/// `max_bytes`.
pub fn validate_avatar(data_url: &str, config: &AvatarConfig) -> Result<(), AvatarError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(AvatarError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(AvatarError::NotDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(AvatarError::NotDataUrl)?
        .to_ascii_lowercase();

    if !config.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(&mime)) {
        return Err(AvatarError::UnsupportedType(mime));
    }

    // Reject on encoded length first so oversized payloads are never decoded.
    if payload.len() / 4 * 3 > config.max_bytes + 3 {
        return Err(too_large(config));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| AvatarError::InvalidEncoding)?;
    if bytes.len() > config.max_bytes {
        return Err(too_large(config));
    }
    Ok(())
}

fn too_large(config: &AvatarConfig) -> AvatarError {
    AvatarError::TooLarge {
        limit: human_size(config.max_bytes),
    }
}

/// Whole MB when the limit is a multiple of 1 MiB, else KB, else bytes.
fn human_size(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * KIB;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{} KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_url(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn test_accepts_allowed_types() {
        let config = AvatarConfig::default();
        for mime in ["image/png", "image/jpeg", "image/jpg", "image/gif", "image/webp", "IMAGE/PNG"] {
            assert_eq!(validate_avatar(&data_url(mime, b"\x89PNG"), &config), Ok(()), "{mime}");
        }
    }

    #[test]
    fn test_rejects_other_types_and_shapes() {
        let config = AvatarConfig::default();
        assert_eq!(
            validate_avatar(&data_url("image/svg+xml", b"<svg/>"), &config),
            Err(AvatarError::UnsupportedType("image/svg+xml".to_string()))
        );
        assert_eq!(
            validate_avatar("https://example.com/a.png", &config),
            Err(AvatarError::NotDataUrl)
        );
        assert_eq!(
            validate_avatar("data:image/png,rawbytes", &config),
            Err(AvatarError::NotDataUrl)
        );
        assert_eq!(
            validate_avatar("data:image/png;base64,@@@@", &config),
            Err(AvatarError::InvalidEncoding)
        );
    }

    #[test]
    fn test_size_limit() {
        let config = AvatarConfig {
            max_bytes: 16,
            ..Default::default()
        };
        assert!(validate_avatar(&data_url("image/png", &[0u8; 16]), &config).is_ok());
        assert!(matches!(
            validate_avatar(&data_url("image/png", &[0u8; 17]), &config),
            Err(AvatarError::TooLarge { .. })
        ));
        assert!(matches!(
            validate_avatar(&data_url("image/png", &[0u8; 4096]), &config),
            Err(AvatarError::TooLarge { .. })
        ));

        assert_eq!(
            too_large(&AvatarConfig::default()).to_string(),
            "Image must be smaller than 5 MB"
        );
        assert_eq!(
            validate_avatar(&data_url("image/png", &[0u8; 17]), &config)
                .unwrap_err()
                .to_string(),
            "Image must be smaller than 16 bytes"
        );
    }

    #[test]
    fn test_limits_under_one_megabyte_are_not_reported_as_zero() {
        let config = AvatarConfig {
            max_bytes: 512 * 1024,
            ..Default::default()
        };
        let err = validate_avatar(&data_url("image/png", &vec![0u8; 600 * 1024]), &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "Image must be smaller than 512 KB");
        assert_eq!(human_size(1536 * 1024), "1536 KB");
    }
}
