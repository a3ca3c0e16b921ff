//! Merge-tag translation: `*|NAME|*` becomes `{{NAME}}`.
//!
//! The rewrite is purely textual. A token is the shortest non-empty run of
//! characters between `*|` and the next `|*` on the same line; asterisks and
//! pipes that are not part of such a token are left alone.

const OPEN: &str = "*|";
const CLOSE: &str = "|*";

/// Rewrite every `*|TOKEN|*` in `text` to `{{TOKEN}}`.
pub fn translate_placeholders(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(OPEN) {
        out.push_str(&rest[..open]);
        let after = &rest[open + OPEN.len()..];
        match token_end(after) {
            Some(end) => {
                out.push_str("{{");
                out.push_str(&after[..end]);
                out.push_str("}}");
                rest = &after[end + CLOSE.len()..];
            }
            None => {
                // Not a token start; keep the asterisk and rescan from the pipe.
                out.push('*');
                rest = &rest[open + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Byte offset of the closing `|*` for a token starting at the beginning of `s`.
fn token_end(s: &str) -> Option<usize> {
    s.match_indices(CLOSE)
        .map(|(idx, _)| idx)
        .find(|&idx| idx > 0)
        .filter(|&idx| !s[..idx].contains('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translates_single_token() {
        assert_eq!(translate_placeholders("Hello, *|NAME|*!"), "Hello, {{NAME}}!");
    }

    #[test]
    fn test_translates_multiple_tokens() {
        assert_eq!(
            translate_placeholders("*|FNAME|* *|LNAME|* <*|EMAIL|*>"),
            "{{FNAME}} {{LNAME}} <{{EMAIL}}>"
        );
    }

    #[test]
    fn test_clean_text_is_unchanged() {
        for text in ["", "plain text", "a * b | c", "5 * 3 || 2", "*|", "|*", "*||*"] {
            assert_eq!(translate_placeholders(text), text);
        }
    }

    #[test]
    fn test_preserves_token_content() {
        assert_eq!(
            translate_placeholders("*|user.first_name|*"),
            "{{user.first_name}}"
        );
        assert_eq!(translate_placeholders("*|Mixed Case|*"), "{{Mixed Case}}");
    }

    #[test]
    fn test_does_not_span_lines() {
        assert_eq!(translate_placeholders("*|A\nB|*"), "*|A\nB|*");
        assert_eq!(translate_placeholders("*|A\r\nB|*"), "*|A\r\nB|*");
    }

    #[test]
    fn test_lone_carriage_return_stays_in_token() {
        assert_eq!(translate_placeholders("*|A\rB|*"), "{{A\rB}}");
    }

    #[test]
    fn test_shortest_token_wins() {
        assert_eq!(translate_placeholders("*|A|* and |*"), "{{A}} and |*");
        assert_eq!(translate_placeholders("**|A|**"), "*{{A}}*");
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            translate_placeholders("Olá *|NOME|*, café ☕"),
            "Olá {{NOME}}, café ☕"
        );
    }
}
