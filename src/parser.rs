//! Extraction of steps and questions from raw model output.
//!
//! Model output comes with no format guarantee, so both parsers scan line by
//! line and only emit records whose every line matched. A malformed record is
//! dropped whole; it never shifts or corrupts the records around it. Leading
//! and trailing prose is ignored, as are the numbers in `Step N:` and `Qn:`
//! markers: records come out in the order they appear.

use std::str::Lines;

use crate::roadmap::{McqQuestion, OPTION_LETTERS, RoadmapStep};

const DESCRIPTION_MARKER: &str = "Description:";
const CORRECT_MARKER: &str = "Correct:";

/// Parses every well-formed `Step N:` / `Description:` pair in `text`.
pub fn parse_steps(text: &str) -> Vec<RoadmapStep> {
    Steps::new(text).collect()
}

/// Parses every well-formed six-line question block in `text`.
pub fn parse_questions(text: &str) -> Vec<McqQuestion> {
    Questions::new(text).collect()
}

/// Lazily yields the steps found in a piece of text.
///
/// A `Step N: <title>` line opens a step. Blank lines after it are skipped;
/// the next non-blank line must be `Description: <description>` or the step
/// is abandoned. Title and description must both be non-empty.
pub struct Steps<'a> {
    lines: Lines<'a>,
}

impl<'a> Steps<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
        }
    }
}

impl Iterator for Steps<'_> {
    type Item = RoadmapStep;

    fn next(&mut self) -> Option<RoadmapStep> {
        let mut pending_title: Option<&str> = None;

        for line in self.lines.by_ref() {
            if let Some(title) = pending_title.take() {
                if line.trim().is_empty() {
                    pending_title = Some(title);
                    continue;
                }
                if let Some(description) = marker_value(line, DESCRIPTION_MARKER) {
                    return Some(RoadmapStep {
                        title: title.to_string(),
                        description: description.to_string(),
                    });
                }
                // Not a description: the pending step is dropped, but this line
                // may open the next one.
            }

            pending_title = numbered_marker(line, "Step", true);
        }

        None
    }
}

/// Lazily yields the questions found in a piece of text.
///
/// A block is six contiguous lines: `Qn: <question>`, `A) ..` through `D) ..`
/// and `Correct: <A|B|C|D>`. Any other line inside a block discards it and is
/// then re-examined as the possible start of the next block.
pub struct Questions<'a> {
    lines: Lines<'a>,
}

impl<'a> Questions<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
        }
    }
}

impl Iterator for Questions<'_> {
    type Item = McqQuestion;

    fn next(&mut self) -> Option<McqQuestion> {
        let mut pending: Option<PendingQuestion<'_>> = None;

        for line in self.lines.by_ref() {
            if let Some(mut block) = pending.take() {
                match block.accept(line) {
                    Accept::Continue => {
                        pending = Some(block);
                        continue;
                    }
                    Accept::Complete(question) => return Some(question),
                    Accept::Reject => {}
                }
            }

            pending = numbered_marker(line, "Q", false).map(PendingQuestion::new);
        }

        None
    }
}

/// A question block whose first lines have matched.
struct PendingQuestion<'a> {
    question: &'a str,
    options: Vec<&'a str>,
}

enum Accept {
    Continue,
    Complete(McqQuestion),
    Reject,
}

impl<'a> PendingQuestion<'a> {
    fn new(question: &'a str) -> Self {
        Self {
            question,
            options: Vec::with_capacity(OPTION_LETTERS.len()),
        }
    }

    fn accept(&mut self, line: &'a str) -> Accept {
        if let Some(&letter) = OPTION_LETTERS.get(self.options.len()) {
            return match option_value(line, letter) {
                Some(option) => {
                    self.options.push(option);
                    Accept::Continue
                }
                None => Accept::Reject,
            };
        }

        match correct_letter(line) {
            Some(letter) => Accept::Complete(McqQuestion {
                question: self.question.to_string(),
                options: self.options.iter().map(|o| o.to_string()).collect(),
                correct_answer: letter.to_string(),
            }),
            None => Accept::Reject,
        }
    }
}

/// Matches `<keyword><digits>:<value>` and returns the trimmed value.
///
/// With `spaced`, at least one whitespace character must separate the keyword
/// from the digits (`Step 1:`); otherwise they are adjacent (`Q1:`).
fn numbered_marker<'a>(line: &'a str, keyword: &str, spaced: bool) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix(keyword)?;
    let number = if spaced {
        let trimmed = rest.trim_start();
        if trimmed.len() == rest.len() {
            return None;
        }
        trimmed
    } else {
        rest
    };

    let after_digits = number.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() == number.len() {
        return None;
    }

    non_empty(after_digits.strip_prefix(':')?.trim())
}

/// Matches `<marker><value>` and returns the trimmed, non-empty value.
fn marker_value<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    non_empty(line.trim_start().strip_prefix(marker)?.trim())
}

/// Matches `<letter>) <option>`.
fn option_value(line: &str, letter: char) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(letter)?.strip_prefix(')')?;
    non_empty(rest.trim())
}

/// Matches `Correct: <letter>`, where the letter stands alone (`B`, `B)`, `B.`).
fn correct_letter(line: &str) -> Option<char> {
    let rest = line.trim_start().strip_prefix(CORRECT_MARKER)?.trim_start();
    let mut chars = rest.chars();
    let letter = chars.next().filter(|c| OPTION_LETTERS.contains(c))?;

    match chars.next() {
        Some(c) if c.is_alphanumeric() => None,
        _ => Some(letter),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}
