//! urlencoded and Cookie header parsing.

use std::borrow::Cow;

/// Percent-decode, leaving the string untouched when there is nothing to decode.
fn percent_decode(s: &str) -> Cow<'_, str> {
    if s.contains('%') {
        percent_encoding::percent_decode_str(s).decode_utf8_lossy()
    } else {
        Cow::Borrowed(s)
    }
}

/// Form values encode spaces as `+`; a literal plus arrives as `%2B`.
fn form_decode(s: &str) -> String {
    if s.contains('+') {
        percent_decode(&s.replace('+', " ")).into_owned()
    } else {
        percent_decode(s).into_owned()
    }
}

/// Parse `application/x-www-form-urlencoded` text into ordered pairs.
///
/// Empty pairs (`a=1&&b=2`) are skipped; a key without `=` gets an empty value.
pub fn parse_urlencoded(input: &str) -> Vec<(String, String)> {
    let input = input.strip_prefix('?').unwrap_or(input);
    let mut pairs = Vec::with_capacity((input.matches('&').count() + 1).min(32));

    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key.is_empty() {
            continue;
        }

        pairs.push((form_decode(key), form_decode(value)));
    }

    pairs
}

/// Parse a Cookie header into name-value pairs. Values are percent-decoded.
pub fn parse_cookies(cookie_header: &str) -> Vec<(String, String)> {
    cookie_header
        .split(';')
        .filter_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"');
            Some((name.to_string(), percent_decode(value).into_owned()))
        })
        .collect()
}
