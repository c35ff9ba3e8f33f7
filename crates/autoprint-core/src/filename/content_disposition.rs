//! Content-Disposition header parsing (RFC 2183 grammar, RFC 2231 extended values).
//!
//! Unlike a best-effort scan, the parser rejects anything that is not a valid
//! `type; attribute=value; ...` list so callers never print with a guessed name.

use anyhow::{bail, Result};
use std::collections::HashMap;

/// A parsed `disposition-type; param=value; ...` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    /// Lowercased disposition type, e.g. `attachment`.
    pub kind: String,
    /// Lowercased parameter names mapped to their decoded values. Extended
    /// (`name*`) and continued (`name*0`, `name*1*`, ...) parameters are
    /// folded into `name`.
    pub params: HashMap<String, String>,
}

/// Parses a raw header value. Malformed syntax or conflicting duplicate
/// parameters are errors.
pub fn parse_disposition(value: &str) -> Result<Disposition> {
    let (kind, mut rest) = match value.find(';') {
        Some(i) => value.split_at(i),
        None => (value, ""),
    };
    let kind = kind.trim().to_ascii_lowercase();
    check_kind(&kind)?;

    let mut plain: HashMap<String, String> = HashMap::new();
    let mut extended: HashMap<String, HashMap<String, String>> = HashMap::new();

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let Some((name, value, tail)) = consume_param(rest) else {
            // A lone trailing ';' is tolerated.
            if rest.trim() == ";" {
                break;
            }
            bail!("invalid parameter list near {:?}", rest);
        };

        let map = match name.split_once('*') {
            Some((base, _)) => extended.entry(base.to_string()).or_default(),
            None => &mut plain,
        };
        if map.get(&name).is_some_and(|existing| *existing != value) {
            bail!("duplicate parameter name: {}", name);
        }
        map.insert(name, value);
        rest = tail;
    }

    for (base, pieces) in extended {
        if let Some(joined) = fold_extended(&base, &pieces) {
            plain.insert(base, joined);
        }
    }

    Ok(Disposition {
        kind,
        params: plain,
    })
}

fn check_kind(kind: &str) -> Result<()> {
    let (first, rest) = consume_token(kind);
    if first.is_empty() {
        bail!("missing disposition type");
    }
    if rest.is_empty() {
        return Ok(());
    }
    let Some(after_slash) = rest.strip_prefix('/') else {
        bail!("unexpected content after disposition type: {:?}", rest);
    };
    let (second, rest) = consume_token(after_slash);
    if second.is_empty() {
        bail!("expected token after '/'");
    }
    if !rest.is_empty() {
        bail!("unexpected content after disposition subtype: {:?}", rest);
    }
    Ok(())
}

/// `name*` wins outright; otherwise `name*0`, `name*1`, ... are concatenated,
/// with `*N*` segments percent-decoded.
fn fold_extended(base: &str, pieces: &HashMap<String, String>) -> Option<String> {
    if let Some(v) = pieces.get(&format!("{}*", base)) {
        return decode_extended_value(v);
    }

    let mut out = String::new();
    let mut found = false;
    for n in 0.. {
        let simple = format!("{}*{}", base, n);
        if let Some(v) = pieces.get(&simple) {
            found = true;
            out.push_str(v);
            continue;
        }
        let Some(v) = pieces.get(&format!("{}*", simple)) else {
            break;
        };
        found = true;
        let decoded = if n == 0 {
            decode_extended_value(v)
        } else {
            percent_decode(v).map(|b| String::from_utf8_lossy(&b).into_owned())
        };
        if let Some(d) = decoded {
            out.push_str(&d);
        }
    }
    found.then_some(out)
}

/// Decodes `charset'language'percent-encoded`. Only UTF-8 and US-ASCII are
/// accepted; anything else yields `None` and the parameter is dropped.
fn decode_extended_value(v: &str) -> Option<String> {
    let mut parts = v.splitn(3, '\'');
    let charset = parts.next()?.to_ascii_lowercase();
    let _language = parts.next()?;
    let encoded = parts.next()?;
    if charset != "utf-8" && charset != "us-ascii" {
        return None;
    }
    let bytes = percent_decode(encoded)?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Strict percent-decoding: every `%` must be followed by two hex digits.
fn percent_decode(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut bytes = input.bytes();
    while let Some(b) = bytes.next() {
        if b == b'%' {
            let high = bytes.next().and_then(hex_digit)?;
            let low = bytes.next().and_then(hex_digit)?;
            out.push(high << 4 | low);
        } else {
            out.push(b);
        }
    }
    Some(out)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn is_tspecial(c: char) -> bool {
    "()<>@,;:\\\"/[]?=".contains(c)
}

fn is_token_char(c: char) -> bool {
    c > ' ' && c < '\x7f' && !is_tspecial(c)
}

fn consume_token(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_token_char(c)).unwrap_or(s.len());
    s.split_at(end)
}

/// Token or quoted-string. Inside quotes a backslash escapes a tspecial;
/// other backslashes are kept literally (unescaped Windows paths).
fn consume_value(s: &str) -> Option<(String, &str)> {
    let Some(quoted) = s.strip_prefix('"') else {
        let (token, rest) = consume_token(s);
        if token.is_empty() {
            return None;
        }
        return Some((token.to_string(), rest));
    };

    let mut out = String::new();
    let mut chars = quoted.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((out, &quoted[i + 1..])),
            '\r' | '\n' => return None,
            '\\' => match chars.peek() {
                Some(&(_, next)) if is_tspecial(next) => {
                    out.push(next);
                    chars.next();
                }
                _ => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    // Unterminated quoted-string.
    None
}

/// `; name = value`, returning the lowercased name, the value, and the remainder.
fn consume_param(s: &str) -> Option<(String, String, &str)> {
    let rest = s.trim_start().strip_prefix(';')?.trim_start();
    let (name, rest) = consume_token(rest);
    if name.is_empty() {
        return None;
    }
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let (value, rest) = consume_value(rest)?;
    Some((name.to_ascii_lowercase(), value, rest))
}
