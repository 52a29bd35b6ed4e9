//! Inline image embedding for `image` nodes.
//!
//! Uploaded files never leave the client: their bytes are sniffed and
//! encoded as a `data:` URI stored in the node itself.

use crate::error::DiagramError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Image formats the canvas can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Avif,
    Bmp,
    Ico,
    Svg,
}

impl ImageFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Avif => "image/avif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Ico => "image/x-icon",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    /// Detect the format from the file's leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(ImageFormat::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(ImageFormat::Webp);
        }
        if bytes.len() >= 12
            && &bytes[4..8] == b"ftyp"
            && let b"avif" | b"avis" = &bytes[8..12]
        {
            return Some(ImageFormat::Avif);
        }
        if bytes.len() >= 14 && bytes.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }
        if bytes.len() >= 6 && bytes.starts_with(&[0, 0, 1, 0]) && bytes[4..6] != [0u8, 0] {
            return Some(ImageFormat::Ico);
        }
        is_svg(bytes).then_some(ImageFormat::Svg)
    }
}

/// Whether the text prolog of `bytes` leads to an `<svg` root element.
/// Skips a BOM, whitespace, the XML declaration, comments, processing
/// instructions and a DOCTYPE.
fn is_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(4096)];
    let text = String::from_utf8_lossy(head);
    let mut rest = text.trim_start_matches('\u{feff}');
    loop {
        rest = rest.trim_start();
        let skip_to = if rest.starts_with("<!--") {
            "-->"
        } else if rest.starts_with("<?") {
            "?>"
        } else if rest.starts_with("<!DOCTYPE") || rest.starts_with("<!doctype") {
            match (rest.find('['), rest.find('>')) {
                (Some(open), Some(close)) if open < close => "]>",
                _ => ">",
            }
        } else {
            return rest.starts_with("<svg");
        };
        match rest.find(skip_to) {
            Some(end) => rest = &rest[end + skip_to.len()..],
            None => return false,
        }
    }
}

/// Encode `bytes` as a `data:<mime>;base64,...` URI.
pub fn encode_data_uri(bytes: &[u8]) -> Result<String, DiagramError> {
    let format = ImageFormat::sniff(bytes).ok_or(DiagramError::UnsupportedImage)?;
    Ok(format!("data:{};base64,{}", format.mime(), STANDARD.encode(bytes)))
}

/// Whether `uri` is an inline image the canvas can show.
pub fn is_image_data_uri(uri: &str) -> bool {
    uri.strip_prefix("data:image/")
        .and_then(|rest| rest.split_once(','))
        .is_some_and(|(_, payload)| !payload.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn sniff_known_formats() {
        assert_eq!(ImageFormat::sniff(PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(
            ImageFormat::sniff(b"<?xml version=\"1.0\"?>\n<svg xmlns=\"\"/>"),
            Some(ImageFormat::Svg)
        );
        assert_eq!(
            ImageFormat::sniff(b"\0\0\0\x1cftypavif\0\0\0\0"),
            Some(ImageFormat::Avif)
        );
        assert_eq!(
            ImageFormat::sniff(b"BM\x3a\0\0\0\0\0\0\0\x36\0\0\0"),
            Some(ImageFormat::Bmp)
        );
        assert_eq!(
            ImageFormat::sniff(&[0, 0, 1, 0, 1, 0, 16, 16]),
            Some(ImageFormat::Ico)
        );
        assert_eq!(ImageFormat::sniff(b"%PDF-1.7"), None);
        assert_eq!(ImageFormat::sniff(b""), None);
    }

    #[test]
    fn svg_after_prolog() {
        let doctype = b"<?xml version=\"1.0\"?>\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
            \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n<svg width=\"1\"/>";
        assert_eq!(ImageFormat::sniff(doctype), Some(ImageFormat::Svg));

        let commented = b"<!-- Generator: Inkscape -->\n<svg xmlns=\"http://www.w3.org/2000/svg\"/>";
        assert_eq!(ImageFormat::sniff(commented), Some(ImageFormat::Svg));

        let subset = b"<!DOCTYPE svg [ <!ENTITY ns \"x\"> ]>\n<svg/>";
        assert_eq!(ImageFormat::sniff(subset), Some(ImageFormat::Svg));

        assert_eq!(ImageFormat::sniff(b"<!DOCTYPE html><html></html>"), None);
        assert_eq!(ImageFormat::sniff(b"<!-- unterminated <svg"), None);
        assert_eq!(ImageFormat::sniff(b"<?xml version=\"1.0\"?><note/>"), None);
    }

    #[test]
    fn encodes_png_as_data_uri() {
        let uri = encode_data_uri(PNG_HEADER).unwrap();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert!(is_image_data_uri(&uri));
    }

    #[test]
    fn rejects_unknown_bytes() {
        assert!(matches!(
            encode_data_uri(b"hello world"),
            Err(DiagramError::UnsupportedImage)
        ));
    }

    #[test]
    fn data_uri_check() {
        assert!(is_image_data_uri("data:image/gif;base64,R0lGOD"));
        assert!(!is_image_data_uri("data:text/plain;base64,aGk="));
        assert!(!is_image_data_uri("data:image/png;base64,"));
        assert!(!is_image_data_uri("https://example.com/a.png"));
    }
}
