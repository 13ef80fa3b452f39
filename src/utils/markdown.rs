//! Telegram MarkdownV2 helpers.
//!
//! Every user-supplied string (task descriptions, names, addresses) goes
//! through one of these before it is sent with `ParseMode::MarkdownV2`.

/// Escapes markdown special characters for MarkdownV2 parsing mode.
///
/// # Example
/// ```
/// use running_list_bot::utils::markdown::escape_markdown;
///
/// let text = "Buy *nails* (5 kg)";
/// let escaped = escape_markdown(text);
/// assert_eq!(escaped, "Buy \\*nails\\* \\(5 kg\\)");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '='
                | '|' | '{' | '}' | '.' | '!'
        ) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Wraps text in a pre-formatted block so board columns line up.
/// Inside the block only backslash and backtick need escaping.
pub fn code_block(text: &str) -> String {
    let body = text.replace('\\', "\\\\").replace('`', "\\`");
    format!("```\n{body}\n```")
}

/// Bold text with the content escaped.
pub fn bold(text: &str) -> String {
    format!("*{}*", escape_markdown(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_basic_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("_italic_"), "\\_italic\\_");
        assert_eq!(escape_markdown("`code`"), "\\`code\\`");
    }

    #[test]
    fn test_escape_task_references() {
        assert_eq!(escape_markdown("[#12]"), "\\[\\#12\\]");
        assert_eq!(escape_markdown("1-15 March"), "1\\-15 March");
        assert_eq!(escape_markdown("C:\\path"), "C:\\\\path");
    }

    #[test]
    fn test_escape_empty_and_plain_text() {
        assert_eq!(escape_markdown(""), "");
        assert_eq!(escape_markdown("plain text"), "plain text");
        assert_eq!(escape_markdown("Кирпич 500 шт"), "Кирпич 500 шт");
    }

    #[test]
    fn test_code_block_escapes_only_backticks() {
        assert_eq!(code_block("a `b` - c."), "```\na \\`b\\` - c.\n```");
    }

    #[test]
    fn test_bold() {
        assert_eq!(bold("Stats!"), "*Stats\\!*");
    }
}
