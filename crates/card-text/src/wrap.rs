//! Line wrapping and spacing-aware measurement

/// Width of `text` with `letter_spacing` added between characters
///
/// Spacing is applied `chars - 1` times, so a single character or an empty
/// string measures exactly as the base width.
pub fn measure_with_spacing(text: &str, letter_spacing: f32, measure: impl Fn(&str) -> f32) -> f32 {
    let base = measure(text);
    if letter_spacing == 0.0 {
        return base;
    }
    match text.chars().count() {
        0 => base,
        n => base + (n - 1) as f32 * letter_spacing,
    }
}

/// Split text into lines
///
/// The text is first split on `\n`; an empty paragraph becomes one empty line.
/// Without a positive `max_width` each paragraph is a line. Otherwise lines
/// are filled greedily one character at a time: when adding a character would
/// push a non-empty line past `max_width`, the line is committed and the
/// character starts the next one. A character wider than `max_width` still
/// gets a line of its own, so wrapping always makes progress.
pub fn wrap_text(
    text: &str,
    max_width: Option<f32>,
    letter_spacing: f32,
    measure: impl Fn(&str) -> f32,
) -> Vec<String> {
    let Some(max_width) = max_width.filter(|w| *w > 0.0) else {
        return text.split('\n').map(str::to_string).collect();
    };

    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for ch in paragraph.chars() {
            let mut candidate = current.clone();
            candidate.push(ch);

            let width = measure_with_spacing(&candidate, letter_spacing, &measure);
            if width > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            } else {
                current = candidate;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mono(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    #[test]
    fn test_measure_without_spacing() {
        assert_eq!(measure_with_spacing("abc", 0.0, mono), 30.0);
    }

    #[test]
    fn test_measure_with_spacing() {
        assert_eq!(measure_with_spacing("abc", 2.0, mono), 34.0);
        assert_eq!(measure_with_spacing("a", 2.0, mono), 10.0);
        assert_eq!(measure_with_spacing("", 2.0, mono), 0.0);
    }

    #[test]
    fn test_no_wrap_keeps_paragraphs() {
        let lines = wrap_text("first line\nsecond", None, 0.0, mono);
        assert_eq!(lines, vec!["first line", "second"]);
    }

    #[test]
    fn test_zero_width_means_no_wrap() {
        let lines = wrap_text("abcdef", Some(0.0), 0.0, mono);
        assert_eq!(lines, vec!["abcdef"]);
    }

    #[test]
    fn test_wrap_by_character() {
        let lines = wrap_text("abcdefg", Some(30.0), 0.0, mono);
        assert_eq!(lines, vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_wrap_counts_letter_spacing() {
        // "abc" = 30 + 2*5 = 40 > 35, "ab" = 20 + 5 = 25
        let lines = wrap_text("abcd", Some(35.0), 5.0, mono);
        assert_eq!(lines, vec!["ab", "cd"]);
    }

    #[test]
    fn test_wrap_keeps_blank_lines() {
        let lines = wrap_text("ab\n\ncd", Some(100.0), 0.0, mono);
        assert_eq!(lines, vec!["ab", "", "cd"]);
    }

    #[test]
    fn test_wrap_narrower_than_one_char_makes_progress() {
        let lines = wrap_text("abc", Some(1.0), 0.0, mono);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_wrap_cjk_without_spaces() {
        let lines = wrap_text("名片生成器测试", Some(30.0), 0.0, mono);
        assert_eq!(lines, vec!["名片生", "成器测", "试"]);
    }

    #[test]
    fn test_wrapped_lines_fit() {
        let text = "The quick brown fox jumps over the lazy dog";
        for max in [15.0, 42.0, 77.0, 130.0] {
            for line in wrap_text(text, Some(max), 1.5, mono) {
                if line.chars().count() > 1 {
                    assert!(measure_with_spacing(&line, 1.5, mono) <= max, "{line:?} > {max}");
                }
            }
        }
    }
}
