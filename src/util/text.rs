use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal columns.
///
/// CJK characters and most emoji take two columns; combining marks take none.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Truncate `s` to at most `max_width` columns, ending in `...` when cut.
///
/// Widths of three or less have no room for an ellipsis and get a plain
/// prefix instead. A string that already fits is returned borrowed.
///
/// ```
/// use postgrid::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width <= ELLIPSIS_WIDTH {
        return Cow::Owned(take_columns(s, max_width).to_string());
    }
    Cow::Owned(format!(
        "{}{}",
        take_columns(s, max_width - ELLIPSIS_WIDTH),
        ELLIPSIS
    ))
}

/// Longest prefix of `s` that fits in `budget` columns.
fn take_columns(s: &str, budget: usize) -> &str {
    let mut used = 0;
    for (idx, c) in s.char_indices() {
        let w = char_width(c);
        if used + w > budget {
            return &s[..idx];
        }
        used += w;
    }
    s
}

/// Make index-supplied text safe for a single terminal line.
///
/// ANSI escape sequences and control characters are dropped, and every run
/// of whitespace (including newlines and tabs) becomes one space. Leading and
/// trailing whitespace is trimmed.
pub fn sanitize_line(s: &str) -> Cow<'_, str> {
    let clean = !s.chars().any(|c| c.is_control())
        && !s.contains("  ")
        && s.trim().len() == s.len();
    if clean {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            skip_escape(&mut chars);
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if c.is_control() {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    Cow::Owned(out)
}

/// Consume the rest of an escape sequence after its ESC.
///
/// CSI (`ESC [`) runs to a final byte in `@..=~`; OSC (`ESC ]`) runs to BEL
/// or `ESC \`. Anything else drops only the ESC itself.
fn skip_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    match chars.peek() {
        Some('[') => {
            chars.next();
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        }
        Some(']') => {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '\x07' {
                    break;
                }
                if c == '\x1b' && chars.peek() == Some(&'\\') {
                    chars.next();
                    break;
                }
            }
        }
        _ => {}
    }
}

/// Greedy word wrap into at most `max_lines` lines of `width` columns.
///
/// Words wider than a line are hard-split. When text remains after the last
/// allowed line, that line is truncated with an ellipsis.
pub fn wrap_to_width(s: &str, width: usize, max_lines: usize) -> Vec<String> {
    if width == 0 || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut overflow = false;

    'words: for word in s.split_whitespace() {
        let word_width = display_width(word);
        let gap = usize::from(!current.is_empty());

        if current_width + gap + word_width <= width {
            if gap == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_width += gap + word_width;
            continue;
        }

        if !current.is_empty() {
            if lines.len() + 1 == max_lines {
                overflow = true;
                break;
            }
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }

        // Hard-split words that cannot fit on an empty line
        for c in word.chars() {
            let w = char_width(c);
            if current_width + w > width && !current.is_empty() {
                if lines.len() + 1 == max_lines {
                    overflow = true;
                    break 'words;
                }
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(c);
            current_width += w;
        }
    }

    if overflow {
        lines.push(with_ellipsis(&current, width));
    } else if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// `line` marked as continuing, still within `width` columns.
fn with_ellipsis(line: &str, width: usize) -> String {
    if width <= ELLIPSIS_WIDTH {
        return take_columns(line, width).to_string();
    }
    let kept = take_columns(line, width - ELLIPSIS_WIDTH).trim_end();
    format!("{}{}", kept, ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_display_width_cjk() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("你好"), 4);
    }

    #[test]
    fn test_truncate_cjk_does_not_split_wide_char() {
        // budget 4 columns before the ellipsis: two wide chars
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
    }

    #[test]
    fn test_truncate_zero_width() {
        assert_eq!(truncate_to_width("Test", 0), "");
    }

    #[test]
    fn test_sanitize_strips_ansi_and_controls() {
        assert_eq!(sanitize_line("\x1b[31mRed\x1b[0m title"), "Red title");
        assert_eq!(sanitize_line("a\x07b"), "ab");
        assert_eq!(sanitize_line("\x1b]0;pwned\x07Title"), "Title");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_line("  one\n\ttwo   three "), "one two three");
    }

    #[test]
    fn test_sanitize_borrows_clean_input() {
        assert!(matches!(sanitize_line("Plain title"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_wrap_basic() {
        assert_eq!(
            wrap_to_width("the quick brown fox", 10, 5),
            ["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_wrap_truncates_last_line() {
        let lines = wrap_to_width("one two three four five six", 9, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "one two");
        assert!(lines[1].ends_with("..."));
        assert!(display_width(&lines[1]) <= 9);
    }

    #[test]
    fn test_wrap_hard_splits_long_word() {
        assert_eq!(wrap_to_width("abcdefgh", 3, 5), ["abc", "def", "gh"]);
    }

    #[test]
    fn test_wrap_empty_input() {
        assert!(wrap_to_width("", 10, 3).is_empty());
        assert!(wrap_to_width("words", 0, 3).is_empty());
    }

    proptest! {
        #[test]
        fn prop_truncate_fits(s in "[a-zA-Z0-9 你好世界]{0,40}", width in 0usize..30) {
            prop_assert!(display_width(&truncate_to_width(&s, width)) <= width);
        }

        #[test]
        fn prop_wrap_respects_bounds(s in "[a-z ]{0,80}", width in 4usize..20, max in 1usize..5) {
            let lines = wrap_to_width(&s, width, max);
            prop_assert!(lines.len() <= max);
            for line in &lines {
                prop_assert!(display_width(line) <= width);
            }
        }
    }
}
