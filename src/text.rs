//! Grapheme-aware display width, truncation, and wrapping.
//!
//! Output is plain text; no ANSI sequences are produced or recognized.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 4;

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }
    if grapheme == "\t" {
        return TAB_WIDTH;
    }

    if emoji_get(grapheme).is_some() {
        return 2;
    }

    grapheme
        .chars()
        .map(|ch| {
            if ch == '\t' {
                TAB_WIDTH
            } else {
                UnicodeWidthChar::width(ch).unwrap_or(0)
            }
        })
        .sum()
}

/// Terminal columns `text` occupies on one line.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

/// Cut `text` to `max_width` columns, ending with `ellipsis` when cut.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(text) <= max_width {
        return text.to_string();
    }

    let target_width = max_width.saturating_sub(display_width(ellipsis));
    if target_width == 0 {
        return ellipsis.chars().take(max_width).collect();
    }

    let mut truncated = String::with_capacity(text.len());
    let mut current_width = 0;
    for grapheme in text.graphemes(true) {
        let width = grapheme_width(grapheme);
        if current_width + width > target_width {
            break;
        }
        truncated.push_str(grapheme);
        current_width += width;
    }
    truncated.push_str(ellipsis);
    truncated
}

/// Word-wrap `text` to `width` columns.
///
/// Explicit newlines are kept, runs of spaces between words collapse to one,
/// and words wider than `width` are split at grapheme boundaries. Blank
/// source lines come out as empty strings.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for source_line in text.lines() {
        let mut current = String::new();
        let mut current_width = 0;

        for word in source_line.split_whitespace() {
            let word_width = display_width(word);
            let separator = usize::from(!current.is_empty());

            if current_width + separator + word_width <= width {
                if separator == 1 {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += separator + word_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }

            if word_width <= width {
                current.push_str(word);
                current_width = word_width;
                continue;
            }

            for grapheme in word.graphemes(true) {
                let grapheme_cols = grapheme_width(grapheme);
                if current_width + grapheme_cols > width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push_str(grapheme);
                current_width += grapheme_cols;
            }
        }

        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::{display_width, truncate_to_width, wrap_text};

    #[test]
    fn wide_and_emoji_graphemes_count_two_columns() {
        assert_eq!(display_width("hi"), 2);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width("😀"), 2);
        assert_eq!(display_width("e\u{301}"), 1);
    }

    #[test]
    fn truncate_keeps_short_text_and_cuts_long_text() {
        assert_eq!(truncate_to_width("short", 10, "…"), "short");
        assert_eq!(truncate_to_width("Quarterly report", 10, "…"), "Quarterly…");
        assert_eq!(truncate_to_width("日本語テキスト", 7, "…"), "日本語…");
        assert_eq!(truncate_to_width("anything", 0, "…"), "");
    }

    #[test]
    fn wrap_breaks_on_words_within_width() {
        assert_eq!(
            wrap_text("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn wrap_keeps_newlines_and_splits_long_words() {
        assert_eq!(
            wrap_text("abcdefghij\n\nok", 4),
            vec!["abcd", "efgh", "ij", "", "ok"]
        );
    }

    #[test]
    fn wrap_of_empty_text_is_one_empty_line() {
        assert_eq!(wrap_text("", 20), vec![String::new()]);
    }
}
