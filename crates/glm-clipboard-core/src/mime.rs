/// Extension used when nothing usable can be derived from the MIME type.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Get a filesystem-safe file extension for a MIME type.
pub fn extension_for_mime(mime: &str) -> String {
    match mime {
        "image/jpeg" => return "jpg".to_string(),
        "image/svg+xml" => return "svg".to_string(),
        _ => {}
    }

    let Some((_, subtype)) = mime.split_once('/') else {
        return FALLBACK_EXTENSION.to_string();
    };

    let extension: String = subtype
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
        .collect();

    if extension.is_empty() {
        FALLBACK_EXTENSION.to_string()
    } else {
        extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_cases() {
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("image/svg+xml"), "svg");
    }

    #[test]
    fn test_subtype_passthrough() {
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/webp"), "webp");
        assert_eq!(
            extension_for_mime("application/x-custom+special"),
            "x-custom+special"
        );
    }

    #[test]
    fn test_disallowed_characters_stripped() {
        assert_eq!(extension_for_mime("image/we bp!"), "webp");
        assert_eq!(extension_for_mime("image/../png"), "..png");
        assert_eq!(extension_for_mime("image/PNG"), "PNG");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(extension_for_mime("image/"), FALLBACK_EXTENSION);
        assert_eq!(extension_for_mime("image/???"), FALLBACK_EXTENSION);
        assert_eq!(extension_for_mime("image"), FALLBACK_EXTENSION);
        assert_eq!(extension_for_mime(""), FALLBACK_EXTENSION);
    }
}
