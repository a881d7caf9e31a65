//! Turns a raw feed response into text.
//!
//! Publishers still serve windows-1252, ISO-8859-x and UTF-16 feeds. The
//! character set is taken from, in order: a byte-order mark, the XML
//! declaration, the `charset` parameter of the Content-Type header. UTF-8 is
//! assumed when none of them names one.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

static DECLARED_ENCODING: LazyLock<regex::bytes::Regex> = LazyLock::new(|| {
    regex::bytes::Regex::new(
        r#"\A\s*<\?xml\s[^>]*?encoding\s*=\s*["'](?P<label>[A-Za-z0-9._:\-]+)["']"#,
    )
    .unwrap()
});

static DECLARATION_ENCODING_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\A(?P<head>\s*<\?xml\s[^>]*?encoding\s*=\s*)["'][^"']*["']"#).unwrap()
});

static CHARSET_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*"?(?P<label>[^";\s]+)"?"#).unwrap()
});

/// Decodes `bytes` to a string whose XML declaration, if any, says UTF-8.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = sniff_encoding(bytes, content_type);
    tracing::debug!("Decoding feed body as {}", encoding.name());

    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        tracing::warn!(
            "Feed body is not valid {}; replaced malformed sequences",
            encoding.name()
        );
    }

    if DECLARATION_ENCODING_ATTR.is_match(&text) {
        DECLARATION_ENCODING_ATTR
            .replace(&text, r#"${head}"UTF-8""#)
            .into_owned()
    } else {
        text.into_owned()
    }
}

fn sniff_encoding(bytes: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    // "<?" without a BOM
    match bytes {
        [0x3C, 0x00, 0x3F, 0x00, ..] => return UTF_16LE,
        [0x00, 0x3C, 0x00, 0x3F, ..] => return UTF_16BE,
        _ => {}
    }

    declared_encoding(bytes)
        .or_else(|| content_type.and_then(charset_encoding))
        .unwrap_or(UTF_8)
}

/// Encoding named by an XML declaration readable as ASCII. A UTF-16 label
/// there contradicts the bytes themselves and is ignored.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let captures = DECLARED_ENCODING.captures(bytes)?;
    let encoding = Encoding::for_label(captures.name("label")?.as_bytes())?;
    (encoding != UTF_16LE && encoding != UTF_16BE).then_some(encoding)
}

fn charset_encoding(content_type: &str) -> Option<&'static Encoding> {
    let label = CHARSET_PARAM.captures(content_type)?.name("label")?.as_str();
    Encoding::for_label(label.trim().as_bytes())
}
