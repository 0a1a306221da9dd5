//! Text wrapping for text labels
//!
//! Text is measured with fixed-advance metrics: every grapheme cluster is
//! one column wide and columns are `advance + spacing` apart. Wrapping is
//! greedy at word boundaries and falls back to breaking between graphemes
//! for words wider than the line. Explicit newlines are hard breaks.
//!
//! Wrapping already-wrapped text at the same width returns it unchanged.

use unicode_segmentation::UnicodeSegmentation;

/// How many graphemes fit in `max_width`
///
/// Returns `None` when wrapping is disabled (non-positive or non-finite
/// width). At least one grapheme always fits.
pub fn columns_for_width(max_width: f32, advance: f32, spacing: f32) -> Option<usize> {
    if !max_width.is_finite() || max_width <= 0.0 {
        return None;
    }
    let pitch = advance + spacing;
    if pitch <= 0.0 {
        return None;
    }
    let columns = ((max_width + spacing) / pitch).floor() as usize;
    Some(columns.max(1))
}

/// Wrap text at word boundaries into lines of at most `max_columns` graphemes
///
/// Returns an empty `Vec` for empty input.
pub fn wrap_words(text: &str, max_columns: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }
    let max_columns = max_columns.max(1);

    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        wrap_line(raw_line, max_columns, &mut lines);
    }
    lines
}

/// Wrap `text` and join the lines back with `\n`
pub fn wrap_to_string(text: &str, max_columns: Option<usize>) -> String {
    match max_columns {
        Some(columns) => wrap_words(text, columns).join("\n"),
        None => text.to_string(),
    }
}

fn wrap_line(line: &str, max_columns: usize, lines: &mut Vec<String>) {
    let first = lines.len();
    let mut current = String::new();
    let mut current_width = 0usize;

    for segment in line.split_word_bounds() {
        let segment_width = segment.graphemes(true).count();

        if current_width + segment_width > max_columns {
            if current_width > 0 {
                let finished = current.trim_end();
                if !finished.is_empty() {
                    lines.push(finished.to_string());
                }
                current.clear();
                current_width = 0;
            }

            // Whitespace that caused the break is dropped
            if segment.chars().all(char::is_whitespace) {
                continue;
            }

            if segment_width > max_columns {
                break_graphemes(segment, max_columns, lines, &mut current, &mut current_width);
                continue;
            }
        }

        current.push_str(segment);
        current_width += segment_width;
    }

    // An empty source line still produces one (empty) line
    if !current.is_empty() || lines.len() == first {
        lines.push(current);
    }
}

fn break_graphemes(
    segment: &str,
    max_columns: usize,
    lines: &mut Vec<String>,
    current: &mut String,
    current_width: &mut usize,
) {
    for grapheme in segment.graphemes(true) {
        if *current_width + 1 > max_columns && !current.is_empty() {
            lines.push(std::mem::take(current));
            *current_width = 0;
        }
        current.push_str(grapheme);
        *current_width += 1;
    }
}
