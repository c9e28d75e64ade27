//! Markdown serialization (sheet grid → Markdown)
//!
//! Walks a grid top to bottom once the [`ColumnLayout`] is known. Rows above the
//! environment frame row are summary text, the frame row yields the environment block, the
//! header row is skipped and every row below is a viewpoint or a test item.
//!
//! Cell content is written back with the markers of its field. Bullet glyphs become the
//! field marker, cell indentation of 2/4/6 spaces becomes nested list indentation of
//! 4/8/12 spaces, and an unmarked line is a soft break continuing the line before it.
//!
//! Only the first test environment is written back. The environment block lists its name
//! alone and only its intention column decides whether the notes checkboxes are ticked.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use super::layout::ColumnLayout;
use super::parser::BULLET;
use crate::common::grid::{cell, Grid};
use crate::error::{CellAddress, Position, TranscodeError, Warning, WarningKind};
use crate::grammar::Grammar;
use crate::ir::nodes::{ColumnKey, Transcoded};

static NUMBER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+. *").expect("number marker pattern is valid"));
static UNCHECKED_BOX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^- \[\s\] ").expect("checkbox pattern is valid"));

const CHECKED_BOX: &str = "- [x] ";
const HORIZONTAL_RULE: &str = "---";

/// Identifies the sheet being written.
#[derive(Debug, Clone, Copy)]
pub struct SheetContext<'a> {
    pub name: &'a str,
    /// 1-based position of the sheet in its workbook, encoded as title marker repetitions
    pub position: usize,
    pub category: &'a str,
}

/// Serialize a sheet grid to Markdown text, one `\n` after every line.
pub fn serialize_test_sheet(
    grid: &Grid,
    grammar: &Grammar,
    context: &SheetContext<'_>,
) -> Result<Transcoded<String>, TranscodeError> {
    let Transcoded { output, warnings } = serialize_to_lines(grid, grammar, context)?;
    let mut text = String::new();
    for line in output {
        text.push_str(&line);
        text.push('\n');
    }
    Ok(Transcoded {
        output: text,
        warnings,
    })
}

/// Serialize a sheet grid to Markdown lines.
pub fn serialize_to_lines(
    grid: &Grid,
    grammar: &Grammar,
    context: &SheetContext<'_>,
) -> Result<Transcoded<Vec<String>>, TranscodeError> {
    let layout = ColumnLayout::resolve(grid, grammar)?;
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);

    let mut writer = SheetWriter {
        grammar,
        layout,
        width,
        lines: vec![
            context.category.to_string(),
            grammar.write_marks().title.repeat(context.position),
        ],
        warnings: Vec::new(),
    };

    let mut prev_is_item = false;
    for (r, row) in grid.iter().enumerate() {
        let mut is_item = false;
        if r < writer.layout.frame_row() {
            writer.summary_row(r, row);
        } else if r == writer.layout.frame_row() {
            writer.frame_row(r, row);
        } else if r > writer.layout.header_row() {
            is_item = !cell(row, writer.layout.column(ColumnKey::Number)).is_empty();
            writer.table_row(r, row, is_item, prev_is_item)?;
        }
        prev_is_item = is_item;
    }

    tracing::debug!(
        sheet = context.name,
        lines = writer.lines.len(),
        warnings = writer.warnings.len(),
        "serialized sheet to markdown"
    );

    Ok(Transcoded {
        output: writer.lines,
        warnings: writer.warnings,
    })
}

struct SheetWriter<'g> {
    grammar: &'g Grammar,
    layout: ColumnLayout,
    width: usize,
    lines: Vec<String>,
    warnings: Vec<Warning>,
}

impl SheetWriter<'_> {
    fn unexpected(&mut self, r: usize, c: usize, text: &str) {
        self.warnings.push(Warning::new(
            WarningKind::UnexpectedCell,
            Position::cell(r, c),
            text,
        ));
    }

    fn summary_row(&mut self, r: usize, row: &[String]) {
        let mut summary = String::new();
        for c in self.layout.origin()..self.width {
            let text = cell(row, c);
            if text.is_empty() {
                continue;
            }
            if summary.is_empty() {
                summary = text.trim_end_matches('\n').to_string();
            } else {
                self.unexpected(r, c, text);
            }
        }
        if !summary.is_empty() {
            self.lines.push(summary);
        }
    }

    fn frame_row(&mut self, r: usize, row: &[String]) {
        let mut names = Vec::new();
        for c in self.layout.origin()..self.width {
            let text = cell(row, c);
            if self.layout.intention_columns().contains(&c) {
                names.push(text.to_string());
            } else if !text.is_empty() {
                self.unexpected(r, c, text);
            }
        }

        if let Some(first) = names.into_iter().next() {
            let frame = &self.grammar.write_marks().test_env_frame;
            self.lines.push(String::new());
            self.lines.push(frame.clone());
            self.lines.push(first);
            self.lines.push(frame.clone());
            self.lines.push(String::new());
        }
    }

    fn table_row(
        &mut self,
        r: usize,
        row: &[String],
        is_item: bool,
        prev_is_item: bool,
    ) -> Result<(), TranscodeError> {
        let layout = &self.layout;
        let (mandatory, optional, viewpoint_level) = if is_item {
            (
                vec![
                    layout.column(ColumnKey::Number),
                    layout.column(ColumnKey::Steps),
                    layout.column(ColumnKey::Expected),
                ],
                vec![
                    layout.column(ColumnKey::Environment),
                    layout.column(ColumnKey::Precondition),
                    layout.column(ColumnKey::Notes),
                ],
                None,
            )
        } else {
            let level = (1..=6u8)
                .find(|level| !cell(row, layout.column(ColumnKey::Level(*level))).is_empty())
                .ok_or(TranscodeError::MissingViewpoint { row: r + 1 })?;
            (
                vec![layout.column(ColumnKey::Level(level))],
                vec![layout.column(ColumnKey::Environment)],
                Some(usize::from(level)),
            )
        };

        if is_item && prev_is_item {
            let separator = self.grammar.write_marks().test_rows.lv6.clone();
            self.lines.push(separator);
        }

        let omitted = is_item
            && cell(row, self.layout.first_intention_column())
                == self.grammar.intention_words().omission_word;

        for c in self.layout.origin()..=self.layout.column(ColumnKey::Notes) {
            let text = cell(row, c);
            if mandatory.contains(&c) {
                if text.is_empty() {
                    return Err(TranscodeError::EmptyMandatoryCell {
                        cell: CellAddress::new(r, c),
                    });
                }
                self.render_cell(r, c, text, viewpoint_level, false)?;
            } else if optional.contains(&c) {
                self.render_cell(r, c, text, viewpoint_level, omitted)?;
            } else if !text.is_empty() {
                self.unexpected(r, c, text);
            }
        }

        let intention = self.layout.first_intention_column();
        if is_item && cell(row, intention).is_empty() {
            return Err(TranscodeError::EmptyMandatoryCell {
                cell: CellAddress::new(r, intention),
            });
        }
        Ok(())
    }

    fn render_cell(
        &mut self,
        r: usize,
        c: usize,
        text: &str,
        viewpoint_level: Option<usize>,
        omitted: bool,
    ) -> Result<(), TranscodeError> {
        let marks = &self.grammar.write_marks().test_rows;
        let key = self.column_key(c);

        if let Some(level) = viewpoint_level {
            if key == Some(ColumnKey::Environment) {
                self.lines.push(format!("{}{text}", marks.level(level)));
            }
            return Ok(());
        }

        let (caption, mark, nested_bullet) = match key {
            Some(ColumnKey::Environment) => (
                &marks.environment_caption,
                &marks.environment,
                &marks.environment,
            ),
            Some(ColumnKey::Precondition) => (
                &marks.precondition_caption,
                &marks.precondition,
                &marks.precondition,
            ),
            Some(ColumnKey::Steps) => (&marks.steps_caption, &marks.steps, &marks.expected),
            Some(ColumnKey::Expected) => {
                (&marks.expected_caption, &marks.expected, &marks.expected)
            }
            Some(ColumnKey::Notes) => (&marks.notes_caption, &marks.notes, &marks.expected),
            _ => return Ok(()),
        };
        let marks = CellMarks {
            mark,
            nested_bullet,
            nested_number: &marks.steps,
        };

        let mut lines = remap_cell(text, &marks, CellAddress::new(r, c))?;
        if key == Some(ColumnKey::Notes) && omitted {
            for line in &mut lines {
                *line = UNCHECKED_BOX
                    .replace(line.as_str(), CHECKED_BOX)
                    .into_owned();
            }
        }
        if lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }

        self.lines.push(caption.clone());
        self.lines.extend(lines);
        if key == Some(ColumnKey::Notes) {
            self.lines.push(HORIZONTAL_RULE.to_string());
            self.lines.push(String::new());
        }
        Ok(())
    }

    fn column_key(&self, c: usize) -> Option<ColumnKey> {
        [
            ColumnKey::Number,
            ColumnKey::Environment,
            ColumnKey::Precondition,
            ColumnKey::Steps,
            ColumnKey::Expected,
            ColumnKey::Notes,
        ]
        .into_iter()
        .find(|key| self.layout.column(*key) == c)
    }
}

/// Markers used when writing one cell back.
struct CellMarks<'a> {
    mark: &'a str,
    nested_bullet: &'a str,
    nested_number: &'a str,
}

/// Indentation of a nested entry inside a cell, if it is one of the supported depths.
fn nested_indent(line: &str) -> Option<(usize, &str)> {
    let rest = line.trim_start_matches(' ');
    let indent = line.len() - rest.len();
    matches!(indent, 2 | 4 | 6).then_some((indent, rest))
}

/// Rewrite one cell's text into Markdown list lines.
fn remap_cell(
    text: &str,
    marks: &CellMarks<'_>,
    address: CellAddress,
) -> Result<Vec<String>, TranscodeError> {
    if text.split('\n').all(|line| line.trim().is_empty()) {
        return Ok(vec![marks.mark.to_string()]);
    }

    let mut out: Vec<String> = Vec::new();
    let mut anchor: Option<usize> = None;

    for line in text.split('\n') {
        let line = line.trim_end();
        let nested = nested_indent(line);

        if let Some(rest) = line.strip_prefix(BULLET) {
            out.push(format!("{}{rest}", marks.mark));
        } else if let Some((indent, rest)) =
            nested.and_then(|(indent, rest)| Some((indent, rest.strip_prefix(BULLET)?)))
        {
            out.push(format!(
                "{}{}{rest}",
                " ".repeat(indent * 2),
                marks.nested_bullet
            ));
        } else if line.starts_with(|ch: char| ch.is_ascii_digit()) {
            out.push(
                NUMBER_MARKER
                    .replace(line, NoExpand(marks.mark))
                    .into_owned(),
            );
        } else if let Some((indent, rest)) =
            nested.filter(|(_, rest)| rest.starts_with(|ch: char| ch.is_ascii_digit()))
        {
            let prefix = format!("{}{}", " ".repeat(indent * 2), marks.nested_number);
            out.push(NUMBER_MARKER.replace(rest, NoExpand(&prefix)).into_owned());
        } else if line.is_empty() {
            out.push(String::new());
            continue;
        } else {
            let Some(idx) = anchor else {
                return Err(TranscodeError::OrphanContinuation {
                    cell: address,
                    text: line.to_string(),
                });
            };
            out[idx].push_str("  ");
            out.push(line.to_string());
        }
        anchor = Some(out.len() - 1);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEPS: CellMarks<'static> = CellMarks {
        mark: "1. ",
        nested_bullet: "- ",
        nested_number: "1. ",
    };
    const EXPECTED: CellMarks<'static> = CellMarks {
        mark: "- ",
        nested_bullet: "- ",
        nested_number: "1. ",
    };

    fn remap(text: &str, marks: &CellMarks<'_>) -> Vec<String> {
        remap_cell(text, marks, CellAddress::new(0, 0)).unwrap()
    }

    #[test]
    fn test_remap_numbers_become_placeholders() {
        assert_eq!(
            remap("1. a\n2. b\n  1. x\n  2. y\n3. c\n", &STEPS),
            vec!["1. a", "1. b", "    1. x", "    1. y", "1. c", ""]
        );
    }

    #[test]
    fn test_remap_bullets_and_nesting() {
        assert_eq!(
            remap("・top\n  ・mid\n    ・deep\n      ・deeper", &EXPECTED),
            vec![
                "- top",
                "    - mid",
                "        - deep",
                "            - deeper",
            ]
        );
    }

    #[test]
    fn test_remap_soft_break_marks_the_previous_line() {
        assert_eq!(
            remap("・top\n  wrapped\n\n・next", &EXPECTED),
            vec!["- top  ", "  wrapped", "", "- next"]
        );
    }

    #[test]
    fn test_remap_blank_lines_do_not_anchor_continuations() {
        assert_eq!(remap("・a\n\ntail", &EXPECTED), vec!["- a  ", "", "tail"]);
    }

    #[test]
    fn test_remap_orphan_continuation() {
        let err = remap_cell("wrapped\n・a", &EXPECTED, CellAddress::new(6, 10)).unwrap_err();
        assert_eq!(
            err,
            TranscodeError::OrphanContinuation {
                cell: CellAddress::new(6, 10),
                text: "wrapped".to_string(),
            }
        );
    }

    #[test]
    fn test_remap_blank_cell_is_a_bare_marker() {
        assert_eq!(remap("", &EXPECTED), vec!["- "]);
        assert_eq!(remap(" \n\n", &EXPECTED), vec!["- "]);
    }

    #[test]
    fn test_nested_indent_depths() {
        assert_eq!(nested_indent("  ・a"), Some((2, "・a")));
        assert_eq!(nested_indent("      1. a"), Some((6, "1. a")));
        assert_eq!(nested_indent("   ・a"), None);
        assert_eq!(nested_indent("・a"), None);
    }
}
