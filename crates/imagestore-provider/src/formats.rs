//! Extension-based image format recognition.

use imagestore_core::FormatSniffer;
use std::collections::BTreeSet;
use url::Url;

/// Extensions recognized when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "bmp", "gif", "jpg", "jpeg", "png", "tga", "tif", "tiff", "webp",
];

/// Recognizes images by a `format` query parameter or the path extension.
#[derive(Debug, Clone)]
pub struct ExtensionSniffer {
    extensions: BTreeSet<String>,
}

impl ExtensionSniffer {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    fn recognize(&self, candidate: &str) -> Option<String> {
        let candidate = candidate.to_ascii_lowercase();
        self.extensions.contains(&candidate).then_some(candidate)
    }
}

impl Default for ExtensionSniffer {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

impl FormatSniffer for ExtensionSniffer {
    fn extension_from_url(&self, url: &str) -> Option<String> {
        let parsed = parse_display_url(url)?;

        let requested = parsed
            .query_pairs()
            .find(|(name, _)| name.eq_ignore_ascii_case("format"))
            .and_then(|(_, value)| self.recognize(&value));
        if requested.is_some() {
            return requested;
        }

        let file = parsed.path().rsplit('/').next()?;
        let (_, ext) = file.rsplit_once('.')?;
        self.recognize(ext)
    }
}

// Accepts absolute URLs as well as bare request paths.
fn parse_display_url(url: &str) -> Option<Url> {
    match Url::parse(url) {
        Ok(parsed) => Some(parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://localhost/")
            .ok()?
            .join(url)
            .ok(),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_extension() {
        let sniffer = ExtensionSniffer::default();
        assert_eq!(
            sniffer.extension_from_url("https://cdn.example.com/images/Photo.JPG"),
            Some("jpg".to_string())
        );
        assert_eq!(sniffer.extension_from_url("/images/a.b/c.webp"), Some("webp".to_string()));
        assert_eq!(sniffer.extension_from_url("images/c.png?width=10"), Some("png".to_string()));
    }

    #[test]
    fn test_format_query_wins() {
        let sniffer = ExtensionSniffer::default();
        assert_eq!(
            sniffer.extension_from_url("/images/photo.jpg?format=WEBP"),
            Some("webp".to_string())
        );
        assert_eq!(
            sniffer.extension_from_url("/images/photo.jpg?format=heic"),
            Some("jpg".to_string())
        );
    }

    #[test]
    fn test_unrecognized() {
        let sniffer = ExtensionSniffer::default();
        assert_eq!(sniffer.extension_from_url("/images/readme.txt"), None);
        assert_eq!(sniffer.extension_from_url("/images/noext"), None);
        assert_eq!(sniffer.extension_from_url("/images.png/"), None);
    }

    #[test]
    fn test_custom_extensions() {
        let sniffer = ExtensionSniffer::new([".AVIF", "png", ""]);
        assert_eq!(sniffer.extension_from_url("/a.avif"), Some("avif".to_string()));
        assert_eq!(sniffer.extension_from_url("/a.gif"), None);
    }
}
