//! Normalization for stored message text.
//! Emoji become `:shortcode:` tokens so the corpus stays ASCII-safe lines.

/// Variation selectors that only tweak emoji presentation; dropped outright.
const VARIATION_SELECTORS: &[char] = &['\u{FE0E}', '\u{FE0F}'];

/// Normalize raw message content into its stored form.
///
/// Deterministic: the same input always yields the same output. Emoji
/// scalars are replaced by their `:shortcode:` token (falling back to the
/// underscored Unicode name), and CR/LF become spaces so one stored message
/// is always one corpus line.
pub fn demojize(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    for ch in content.chars() {
        if ch == '\n' || ch == '\r' {
            result.push(' ');
            continue;
        }
        if VARIATION_SELECTORS.contains(&ch) {
            continue;
        }
        let mut buf = [0u8; 4];
        match emojis::get(ch.encode_utf8(&mut buf)) {
            Some(emoji) => {
                result.push(':');
                match emoji.shortcode() {
                    Some(code) => result.push_str(code),
                    None => {
                        for word in emoji.name().split_whitespace() {
                            if !result.ends_with(':') {
                                result.push('_');
                            }
                            result.push_str(word);
                        }
                    }
                }
                result.push(':');
            }
            None => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_becomes_shortcode_token() {
        assert_eq!(demojize("to the moon 🚀"), "to the moon :rocket:");
        assert_eq!(demojize("🔥🔥"), ":fire::fire:");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(demojize("hello there"), "hello there");
        assert_eq!(demojize(""), "");
    }

    #[test]
    fn test_newlines_flattened() {
        assert_eq!(demojize("one\ntwo\r\nthree"), "one two three");
    }

    #[test]
    fn test_deterministic() {
        let raw = "same 🚀 input 😀";
        assert_eq!(demojize(raw), demojize(raw));
    }
}
