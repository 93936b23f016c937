use memchr::memchr;

const NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
];

// 0x10FFFF has 6 hex digits and 7 decimal digits.
const MAX_HEX_DIGITS: usize = 6;
const MAX_DEC_DIGITS: usize = 7;

/// Decode the small set of character references markup templates use.
///
/// - Named: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`.
/// - Numeric, semicolon-terminated: `&#123;` and `&#x1F4A9;`.
///
/// Anything else (unknown names, missing `;`, invalid scalar values) is kept verbatim.
pub(crate) fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return s.to_string();
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut i = first;

    while i < bytes.len() {
        let Some(rel) = memchr(b'&', &bytes[i..]) else {
            out.push_str(&s[i..]);
            break;
        };
        out.push_str(&s[i..i + rel]);
        i += rel;

        match decode_reference(&s[i + 1..]) {
            Some((ch, consumed)) => {
                out.push(ch);
                i += 1 + consumed;
            }
            None => {
                out.push('&');
                i += 1;
            }
        }
    }
    out
}

/// Decode the reference following a `&`, returning the char and the bytes consumed
/// including the terminating `;`.
fn decode_reference(rest: &str) -> Option<(char, usize)> {
    let end = memchr(b';', rest.as_bytes())?;
    let body = &rest[..end];

    if let Some(numeric) = body.strip_prefix('#') {
        let (digits, radix, max) = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, MAX_HEX_DIGITS),
            None => (numeric, 10, MAX_DEC_DIGITS),
        };
        let valid = |b: u8| match radix {
            16 => b.is_ascii_hexdigit(),
            _ => b.is_ascii_digit(),
        };
        if digits.is_empty() || digits.len() > max || !digits.bytes().all(valid) {
            return None;
        }
        let ch = u32::from_str_radix(digits, radix)
            .ok()
            .and_then(char::from_u32)?;
        return Some((ch, end + 1));
    }

    NAMED
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, ch)| (*ch, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric_references() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;x&gt;"), "<x>");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("caf&#xE9;"), "café");
    }

    #[test]
    fn keeps_unknown_or_malformed_references() {
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
        assert_eq!(decode_entities("&#12345678;"), "&#12345678;");
        assert_eq!(decode_entities("trailing &"), "trailing &");
        // hex digits only count after `#x`
        assert_eq!(decode_entities("&#1a;"), "&#1a;");
        assert_eq!(decode_entities("&#x1a;"), "\u{1a}");
    }
}
