//! Character classes used by the tokenizers.

/// Space or tab.
#[must_use]
pub fn is_space_or_tab(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Unicode whitespace: space separators plus tab, line feed, form feed, carriage return.
#[must_use]
pub fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\u{000C}' | '\r') || c.is_whitespace()
}

/// `!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~`
#[must_use]
pub fn is_ascii_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Unicode punctuation or symbol.
///
/// Anything that is neither alphanumeric, whitespace, nor a control
/// character counts, which covers the P and S general categories.
#[must_use]
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace() && !c.is_control())
}

/// Characters allowed in an autolink URI scheme after the first letter.
#[must_use]
pub fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case('!', true)]
    #[case('~', true)]
    #[case('\u{00A1}', true)]
    #[case('€', true)]
    #[case('a', false)]
    #[case('é', false)]
    #[case(' ', false)]
    #[case('7', false)]
    fn punctuation(#[case] c: char, #[case] expected: bool) {
        assert_eq!(is_punctuation(c), expected);
    }

    #[test]
    fn whitespace_classes() {
        assert!(is_whitespace('\u{00A0}'));
        assert!(is_whitespace('\u{000C}'));
        assert!(is_space_or_tab('\t'));
        assert!(!is_space_or_tab('\n'));
    }
}
