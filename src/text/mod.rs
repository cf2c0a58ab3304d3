//! # Text Layout
//!
//! Line breaking and height measurement for cell text.
//!
//! Breaking is greedy: characters are added to the current line until the
//! next one would overflow, then the line ends at the last UAX#14 break
//! opportunity. A word wider than the whole column is force-broken at the
//! character that overflows.

use crate::style::TextStyle;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Width of the line, excluding trailing spaces.
    pub width: f64,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count()`. Each entry is the break
/// opportunity *before* that character position. Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields the byte offset that starts the next segment.
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        let mut char_idx = 0;
        for (byte_idx, _) in text.char_indices() {
            map[byte_idx] = char_idx;
            char_idx += 1;
        }
        map[text.len()] = char_idx;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextLayout;

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break a string into lines that fit within `max_width`.
    ///
    /// Empty text yields a single empty line.
    pub fn break_into_lines(&self, text: &str, max_width: f64, style: &TextStyle) -> Vec<BrokenLine> {
        if text.is_empty() {
            return vec![BrokenLine {
                text: String::new(),
                width: 0.0,
            }];
        }

        let metrics = style.font.metrics();
        let chars: Vec<char> = text.chars().collect();
        let char_widths: Vec<f64> = chars
            .iter()
            .map(|ch| {
                if is_newline(*ch) {
                    0.0
                } else {
                    metrics.char_width(*ch, style.font_size)
                }
            })
            .collect();
        let break_opps = compute_break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut last_break_point: Option<usize> = None;

        for (i, &ch) in chars.iter().enumerate() {
            let char_width = char_widths[i];

            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        // Drop the newline that caused the break.
                        let end = if is_newline(chars[i - 1]) { i - 1 } else { i };
                        lines.push(self.make_line(&chars[line_start..end], &char_widths[line_start..end]));
                        line_start = i;
                        line_width = 0.0;
                        last_break_point = None;
                    }
                    Some(BreakOpportunity::Allowed) => {
                        last_break_point = Some(i - 1);
                    }
                    None => {}
                }
            }

            if is_newline(ch) {
                continue;
            }

            if line_width + char_width > max_width && line_start < i {
                if let Some(bp) = last_break_point.filter(|bp| *bp >= line_start) {
                    let break_at = bp + 1;
                    lines.push(self.make_line(&chars[line_start..break_at], &char_widths[line_start..break_at]));
                    line_start = break_at;
                    last_break_point = None;

                    // The carried word has no break opportunity left, so if
                    // it is still too wide it is force-broken.
                    line_width = 0.0;
                    for j in line_start..=i {
                        if line_width + char_widths[j] > max_width && line_start < j {
                            lines.push(self.make_line(&chars[line_start..j], &char_widths[line_start..j]));
                            line_start = j;
                            line_width = 0.0;
                        }
                        line_width += char_widths[j];
                    }
                    continue;
                }

                // No break opportunity on this line: force a break here.
                lines.push(self.make_line(&chars[line_start..i], &char_widths[line_start..i]));
                line_start = i;
                line_width = char_width;
                last_break_point = None;
                continue;
            }

            line_width += char_width;
        }

        if line_start < chars.len() {
            let end = if is_newline(chars[chars.len() - 1]) {
                chars.len() - 1
            } else {
                chars.len()
            };
            lines.push(self.make_line(&chars[line_start..end], &char_widths[line_start..end]));
        }

        lines
    }

    /// Height the text occupies when wrapped to `max_width`. Empty text has
    /// no height.
    pub fn measure_height(&self, text: &str, max_width: f64, style: &TextStyle) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        self.break_into_lines(text, max_width, style).len() as f64 * style.line_height()
    }

    fn make_line(&self, chars: &[char], widths: &[f64]) -> BrokenLine {
        let mut effective_width: f64 = widths.iter().sum();

        // Trailing spaces don't count toward the line's width.
        let mut i = chars.len();
        while i > 0 && chars[i - 1] == ' ' {
            i -= 1;
            effective_width -= widths[i];
        }

        BrokenLine {
            text: chars.iter().filter(|ch| !is_newline(**ch)).collect(),
            width: effective_width,
        }
    }
}
