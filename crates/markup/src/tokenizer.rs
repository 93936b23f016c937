//! Tokenizer for component markup.
//!
//! Component markup is a small XML-like dialect: start tags, end tags, self-closing tags,
//! text, comments and an optional doctype. Tag and attribute names use the ASCII class
//! `[A-Za-z0-9:_-]` and are normalized to lowercase. Comments and doctypes produce no tokens.
//!
//! Malformed input never fails here; structural errors (unclosed or mismatched tags) are
//! reported by the tree builder, which sees the whole token stream.
use crate::entities::decode_entities;
use crate::types::Token;
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

fn scan_name(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_name_char(bytes[i]) {
        i += 1;
    }
    i
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    // Slices are only cut at ASCII structural bytes or after ASCII-only names, so every
    // slice endpoint is a UTF-8 char boundary.
    while i < len {
        if bytes[i] != b'<' {
            let end = memchr(b'<', &bytes[i..]).map_or(len, |rel| i + rel);
            debug_assert!(input.is_char_boundary(end));
            let decoded = decode_entities(&input[i..end]);
            if !decoded.is_empty() {
                emit(&mut out, Token::Text(decoded));
            }
            i = end;
            continue;
        }

        if input[i..].starts_with(COMMENT_START) {
            let body = i + COMMENT_START.len();
            i = match input[body..].find(COMMENT_END) {
                Some(rel) => body + rel + COMMENT_END.len(),
                None => len,
            };
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'!' {
            // doctype or other declaration: skip to '>'
            i = memchr(b'>', &bytes[i..]).map_or(len, |rel| i + rel + 1);
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'/' {
            let start = i + 2;
            let end = scan_name(bytes, start);
            let name = input[start..end].to_ascii_lowercase();
            i = memchr(b'>', &bytes[end..]).map_or(len, |rel| end + rel + 1);
            emit(&mut out, Token::EndTag(name));
            continue;
        }

        let start = i + 1;
        let name_end = scan_name(bytes, start);
        if name_end == start {
            // A lone '<' that does not open a tag is text.
            emit(&mut out, Token::Text("<".to_string()));
            i += 1;
            continue;
        }
        let name = input[start..name_end].to_ascii_lowercase();
        let (attributes, self_closing, next) = scan_attributes(input, name_end);
        emit(
            &mut out,
            Token::StartTag {
                name,
                attributes,
                self_closing,
            },
        );
        i = next;
    }
    out
}

fn emit(out: &mut Vec<Token>, token: Token) {
    log::trace!(target: "markup.tokenizer", "emit token: {token:?}");
    out.push(token);
}

/// Scan attributes starting right after a tag name. Returns the attributes, whether the tag
/// was self-closing, and the position after the closing `>`.
fn scan_attributes(input: &str, mut k: usize) -> (Vec<(String, String)>, bool, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut attributes = Vec::new();

    let skip_whitespace = |k: &mut usize| {
        while *k < len && bytes[*k].is_ascii_whitespace() {
            *k += 1;
        }
    };

    loop {
        skip_whitespace(&mut k);
        if k >= len {
            return (attributes, false, len);
        }
        match bytes[k] {
            b'>' => return (attributes, false, k + 1),
            b'/' if k + 1 < len && bytes[k + 1] == b'>' => return (attributes, true, k + 2),
            b'/' => {
                k += 1;
                continue;
            }
            _ => {}
        }

        let name_start = k;
        k = scan_name(bytes, k);
        if name_start == k {
            k += 1;
            continue;
        }
        let name = input[name_start..k].to_ascii_lowercase();

        skip_whitespace(&mut k);
        if k >= len || bytes[k] != b'=' {
            attributes.push((name, String::new()));
            continue;
        }
        k += 1;
        skip_whitespace(&mut k);

        let value = if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
            let quote = bytes[k];
            let vstart = k + 1;
            let vend = memchr(quote, &bytes[vstart..]).map_or(len, |rel| vstart + rel);
            k = (vend + 1).min(len);
            decode_entities(&input[vstart..vend])
        } else {
            let vstart = k;
            while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                    break;
                }
                k += 1;
            }
            decode_entities(&input[vstart..k])
        };
        attributes.push((name, value));
    }
}
