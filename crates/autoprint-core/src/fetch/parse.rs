//! Pick the headers the pipeline needs out of raw response header lines.

use std::borrow::Cow;

/// Headers of the final response that matter to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHeaders {
    /// Raw `ETag` value, quotes kept so it can be echoed in `If-None-Match`.
    pub etag: Option<String>,
    /// Raw `Content-Disposition` value.
    pub content_disposition: Option<String>,
}

/// Parse collected header lines, as delivered by libcurl (CRLF included).
///
/// libcurl reports the headers of every response when following redirects;
/// only lines after the last status line are considered. The first occurrence
/// of a header wins. Values are bytes on the wire: invalid UTF-8 is replaced
/// with U+FFFD rather than dropped, so a mangled Content-Disposition still
/// reaches the filename parser.
pub(crate) fn parse_headers(lines: &[Vec<u8>]) -> ResponseHeaders {
    let start = lines
        .iter()
        .rposition(|l| l.starts_with(b"HTTP/"))
        .map_or(0, |i| i + 1);

    let mut parsed = ResponseHeaders::default();
    for line in &lines[start..] {
        let line = trim_bytes(line);
        if line.is_empty() {
            continue;
        }
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            continue;
        };
        let name = trim_bytes(&line[..colon]);
        let value = trim_bytes(&line[colon + 1..]);
        if name.eq_ignore_ascii_case(b"etag") && parsed.etag.is_none() {
            parsed.etag = Some(decode_value("ETag", value));
        }
        if name.eq_ignore_ascii_case(b"content-disposition")
            && parsed.content_disposition.is_none()
        {
            parsed.content_disposition = Some(decode_value("Content-Disposition", value));
        }
    }
    parsed
}

fn decode_value(name: &str, value: &[u8]) -> String {
    match String::from_utf8_lossy(value) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => {
            tracing::warn!("{} header is not valid UTF-8: {:?}", name, s);
            s
        }
    }
}

fn trim_bytes(mut b: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = b {
        if !first.is_ascii_whitespace() {
            break;
        }
        b = rest;
    }
    while let [rest @ .., last] = b {
        if !last.is_ascii_whitespace() {
            break;
        }
        b = rest;
    }
    b
}
