/// Returns true if `token` starts and ends with `marker` and has room for both.
pub fn bookmarked_by(token: &str, marker: char) -> bool {
    token.chars().count() >= 2 && token.starts_with(marker) && token.ends_with(marker)
}

/// Returns true for the `~"uri"` remote reference form.
pub fn is_remote_reference(token: &str) -> bool {
    token.len() >= 3 && token.starts_with("~\"") && token.ends_with('"')
}

/// Drops `start` characters from the front and `end` characters from the back.
pub fn unbookmark(token: &str, start: usize, end: usize) -> &str {
    let from = token
        .char_indices()
        .nth(start)
        .map_or(token.len(), |(i, _)| i);
    let to = if end == 0 {
        token.len()
    } else {
        token.char_indices().rev().nth(end - 1).map_or(0, |(i, _)| i)
    };
    if from >= to {
        ""
    } else {
        &token[from..to]
    }
}

/// Removes every double quote from `token`.
pub fn strip_quotes(token: &str) -> String {
    token.chars().filter(|c| *c != '"').collect()
}

/// The text a token stands for when it is used as an object key.
pub fn key_text(token: &str) -> String {
    if bookmarked_by(token, '"') {
        decode_escapes(unbookmark(token, 1, 1))
    } else {
        strip_quotes(token)
    }
}

/// Decodes backslash escapes. `\\` collapses to `\`, the JSON escapes are
/// honoured, and any other escaped character stands for itself.
pub fn decode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let mut ahead = chars.clone();
                match read_hex4(&mut ahead) {
                    Some(unit) => {
                        chars = ahead;
                        out.push(decode_utf16_unit(unit, &mut chars));
                    }
                    None => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut value = 0;
    for _ in 0..4 {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

// A high surrogate only makes a character together with a following `\uXXXX` low surrogate.
fn decode_utf16_unit(unit: u32, chars: &mut std::str::Chars<'_>) -> char {
    if (0xD800..0xDC00).contains(&unit) {
        let mut ahead = chars.clone();
        if ahead.next() == Some('\\') && ahead.next() == Some('u') {
            if let Some(low) = read_hex4(&mut ahead) {
                if (0xDC00..0xE000).contains(&low) {
                    *chars = ahead;
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
                }
            }
        }
        return char::REPLACEMENT_CHARACTER;
    }
    char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Numeric coercion of a bare literal, following the JavaScript `Number()`
/// rules for non-empty input: decimal with optional sign, fraction and
/// exponent, `Infinity`, and unsigned `0x`/`0o`/`0b` integers.
pub fn coerce_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text.strip_prefix('+').unwrap_or(text)),
    };
    if unsigned == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = text.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    // Rust also accepts `inf` and `NaN`, JavaScript does not.
    let numeric = unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !numeric {
        return None;
    }
    text.parse::<f64>().ok()
}
