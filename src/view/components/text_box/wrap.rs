use crate::font::BitmapFont;
use glam::Vec3;
use std::rc::Rc;

/// A span of text sharing one color and font, as written to a text box.
#[derive(Debug, Clone)]
pub(crate) struct Run {
    pub color: Vec3,
    pub text: String,
    pub font: Rc<BitmapFont>,
    /// The run ends its line.
    pub newline: bool,
}

/// A run, or a piece of one, placed on a wrapped line at offset `x`.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    pub color: Vec3,
    pub text: String,
    pub font: Rc<BitmapFont>,
    pub x: i32,
}

pub(crate) type Line = Vec<Segment>;

/// Number of leading characters whose advances fit in `available` pixels.
fn fitting_chars(font: &BitmapFont, chars: &[char], available: i32) -> usize {
    let mut used = 0;
    chars
        .iter()
        .take_while(|&&c| {
            used += font.char_width(c);
            used <= available
        })
        .count()
}

/// Resumable greedy word wrap into lines at most `width - 2 * padding`
/// pixels wide.
///
/// Closed lines are never revisited, so appending a run only wraps that run.
/// A run that does not fit is split at the last space or tab that still
/// fits; the continuation loses its leading whitespace. A word with no such
/// break moves to a fresh line, and a word too long for an empty line is
/// hard-broken at the last fitting character. Every pass either consumes a
/// character or closes a non-empty line, so wrapping always terminates.
#[derive(Debug, Default)]
pub(crate) struct Wrapper {
    limit: i32,
    /// Pen position on the open line.
    x: i32,
    /// The last line still accepts segments.
    open: bool,
}

impl Wrapper {
    pub fn new(width: i32, padding: i32) -> Self {
        Self {
            limit: width - padding * 2,
            x: 0,
            open: false,
        }
    }

    fn push(&mut self, lines: &mut Vec<Line>, run: &Run, text: String) {
        let width = run.font.text_width(&text);
        if !self.open {
            lines.push(Line::new());
            self.open = true;
        }
        if let Some(line) = lines.last_mut() {
            line.push(Segment {
                color: run.color,
                text,
                font: Rc::clone(&run.font),
                x: self.x,
            });
        }
        self.x += width;
    }

    fn close(&mut self) {
        self.open = false;
        self.x = 0;
    }

    pub fn append(&mut self, lines: &mut Vec<Line>, run: &Run) {
        if self.x + run.font.text_width(&run.text) <= self.limit {
            self.push(lines, run, run.text.clone());
            if run.newline {
                self.close();
            }
            return;
        }

        let mut remaining: Vec<char> = run.text.chars().collect();
        while !remaining.is_empty() {
            let fit = fitting_chars(&run.font, &remaining, self.limit - self.x);
            if fit >= remaining.len() {
                self.push(lines, run, remaining.drain(..).collect());
                break;
            }

            let split = match (1..=fit).rev().find(|&i| matches!(remaining[i], ' ' | '\t')) {
                Some(split) => split,
                None if self.open => {
                    self.close();
                    continue;
                }
                None => fit.max(1),
            };
            self.push(lines, run, remaining.drain(..split).collect());
            self.close();

            let blank = remaining.iter().take_while(|c| c.is_whitespace()).count();
            remaining.drain(..blank);
        }
        if run.newline {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Line, Run, Wrapper};
    use crate::font::fixed_width_font;
    use glam::Vec3;

    fn runs(parts: &[(&str, bool)]) -> Vec<Run> {
        // 7px advance + 1px gap = 8px per character.
        let font = fixed_width_font(7, 16);
        parts
            .iter()
            .map(|&(text, newline)| Run {
                color: Vec3::ONE,
                text: text.to_string(),
                font: font.clone(),
                newline,
            })
            .collect()
    }

    fn wrap_runs(runs: &[Run], width: i32, padding: i32) -> Vec<Line> {
        let mut wrapper = Wrapper::new(width, padding);
        let mut lines = Vec::new();
        for run in runs {
            wrapper.append(&mut lines, run);
        }
        lines
    }

    fn texts(lines: &[Line]) -> Vec<Vec<&str>> {
        lines
            .iter()
            .map(|line| line.iter().map(|segment| segment.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn short_runs_share_a_line_until_a_newline() {
        let lines = wrap_runs(&runs(&[("ab", false), ("cd", true), ("ef", true)]), 100, 0);
        assert_eq!(texts(&lines), [vec!["ab", "cd"], vec!["ef"]]);
        assert_eq!(lines[0][1].x, 16);
    }

    #[test]
    fn breaks_at_the_last_fitting_space() {
        // 10 characters fit in 80px.
        let lines = wrap_runs(&runs(&[("hello big world", true)]), 80, 0);
        assert_eq!(texts(&lines), [vec!["hello big"], vec!["world"]]);
    }

    #[test]
    fn padding_narrows_the_line() {
        let lines = wrap_runs(&runs(&[("hello big world", true)]), 96, 8);
        assert_eq!(texts(&lines), [vec!["hello big"], vec!["world"]]);
    }

    #[test]
    fn long_word_hard_breaks_and_terminates() {
        let word = "a".repeat(20);
        let lines = wrap_runs(&runs(&[(&word, true)]), 50, 0);
        assert_eq!(
            texts(&lines),
            [vec!["aaaaaa"], vec!["aaaaaa"], vec!["aaaaaa"], vec!["aa"]]
        );
    }

    #[test]
    fn box_narrower_than_a_glyph_still_terminates() {
        let lines = wrap_runs(&runs(&[("abc", true)]), 4, 0);
        assert_eq!(texts(&lines), [vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn unbreakable_word_moves_to_a_fresh_line() {
        let lines = wrap_runs(&runs(&[("abcd", false), ("efghijkl", true)]), 80, 0);
        assert_eq!(texts(&lines), [vec!["abcd"], vec!["efghijkl"]]);
    }

    #[test]
    fn continuation_without_newline_keeps_the_line_open() {
        let lines = wrap_runs(&runs(&[("aaa bbb ccc", false), ("d", true)]), 64, 0);
        assert_eq!(texts(&lines), [vec!["aaa bbb"], vec!["ccc", "d"]]);
        assert_eq!(lines[1][1].x, 24);
    }

    #[test]
    fn appending_continues_the_open_line() {
        let all = runs(&[("aaa bbb ccc", false), ("d", true), ("efghijkl", false), ("x", true)]);
        let mut wrapper = Wrapper::new(64, 0);
        let mut lines = Vec::new();
        wrapper.append(&mut lines, &all[0]);
        assert_eq!(texts(&lines), [vec!["aaa bbb"], vec!["ccc"]]);

        for run in &all[1..] {
            wrapper.append(&mut lines, run);
        }
        assert_eq!(
            texts(&lines),
            [vec!["aaa bbb"], vec!["ccc", "d"], vec!["efghijkl"], vec!["x"]]
        );
        assert_eq!(lines[1][1].x, 24);
    }
}
