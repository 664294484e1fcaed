use std::borrow::Cow;

/// Character that makes the following character literal in the text form.
pub const ESCAPE: char = '\\';

/// Escapes `separator` and the escape character inside one segment.
pub fn escape_segment(segment: &str, separator: char) -> Cow<'_, str> {
    if !segment.contains([separator, ESCAPE]) {
        return Cow::Borrowed(segment);
    }
    let mut out = String::with_capacity(segment.len() + 2);
    for c in segment.chars() {
        if c == separator || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Splits `text` on unescaped `separator`s and unescapes each segment.
///
/// A trailing lone escape character is kept as is.
pub fn split_segments(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            current.push(chars.next().unwrap_or(ESCAPE));
        } else if c == separator {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}
