//! Backslash escape and character reference decoding.

use std::sync::OnceLock;

use regex::Regex;

use super::{CodePoint, chars::is_ascii_punctuation};

/// Longest named or numeric reference we try, `&` and `;` included.
const MAX_REFERENCE_LEN: usize = 34;

fn reference_regex() -> &'static Regex {
    static REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();
    REFERENCE_REGEX.get_or_init(|| {
        Regex::new(r"^&(?:#[xX]([0-9a-fA-F]{1,6})|#([0-9]{1,7})|([A-Za-z][A-Za-z0-9]{1,31}));$")
            .expect("Invalid character reference regex")
    })
}

/// Decodes a character reference starting at `chars[0] == '&'`.
///
/// Returns the decoded text and how many characters it consumed.
pub fn match_reference(chars: &[char]) -> Option<(String, usize)> {
    if chars.first() != Some(&'&') {
        return None;
    }
    let end = chars
        .iter()
        .take(MAX_REFERENCE_LEN)
        .position(|&c| c == ';')?;
    let candidate: String = chars[..=end].iter().collect();
    let caps = reference_regex().captures(&candidate)?;

    let numeric = |digits: &str, radix: u32| {
        let value = u32::from_str_radix(digits, radix).unwrap_or(0);
        let c = match value {
            0 => '\u{FFFD}',
            v => char::from_u32(v).unwrap_or('\u{FFFD}'),
        };
        c.to_string()
    };

    let decoded = if let Some(hex) = caps.get(1) {
        numeric(hex.as_str(), 16)
    } else if let Some(dec) = caps.get(2) {
        numeric(dec.as_str(), 10)
    } else {
        let decoded = html_escape::decode_html_entities(&candidate);
        if decoded == candidate {
            return None;
        }
        decoded.into_owned()
    };
    Some((decoded, end + 1))
}

/// Applies backslash escapes and character references to `chars`.
pub fn decode(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if chars.get(i + 1).is_some_and(|&n| is_ascii_punctuation(n)) => {
                out.push(chars[i + 1]);
                i += 2;
            }
            '&' => match match_reference(&chars[i..]) {
                Some((decoded, len)) => {
                    out.push_str(&decoded);
                    i += len;
                }
                None => {
                    out.push('&');
                    i += 1;
                }
            },
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// [`decode`] over a run of code points.
pub fn decode_points(points: &[CodePoint]) -> String {
    let chars: Vec<char> = points.iter().map(|p| p.code_point).collect();
    decode(&chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn decode_str(s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        decode(&chars)
    }

    #[rstest]
    #[case(r"\*not emphasis\*", "*not emphasis*")]
    #[case(r"\a stays", r"\a stays")]
    #[case("&amp; &copy;", "& ©")]
    #[case("&#35; &#x22;", "# \"")]
    #[case("&#0;", "\u{FFFD}")]
    #[case("&nosuchentity;", "&nosuchentity;")]
    #[case("& alone", "& alone")]
    #[case(r"\&amp;", "&amp;")]
    fn decodes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(decode_str(input), expected);
    }

    #[test]
    fn reference_length() {
        let chars: Vec<char> = "&ouml;x".chars().collect();
        let (text, len) = match_reference(&chars).unwrap();
        assert_eq!(text, "ö");
        assert_eq!(len, 6);
    }
}
