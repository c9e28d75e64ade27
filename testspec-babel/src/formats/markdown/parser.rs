//! Markdown parsing (Markdown → row table)
//!
//! A single pass over the document lines, driven by the region the scanner is in:
//!
//!     Free ──title──▶ Summary ──frame──▶ EnvironmentFrame ──frame──▶ Summary
//!                        │
//!                        └──viewpoint──▶ TestItems ──title──▶ Summary
//!
//! The title check and the frame toggle apply in every region, everything else depends on
//! the region. Inside the test item region each line runs through an ordered cascade of
//! rules: field markers, captions and separators, blank lines, nested list entries, soft
//! break continuations, and finally a warning for anything left over.
//!
//! A test item accumulates in a draft row and is flushed whenever the next viewpoint
//! heading (or the end of the document) is reached. Flushing checks that steps and
//! expected results are both present; an item with content but without one of them
//! aborts the conversion.

use once_cell::sync::Lazy;
use regex::Regex;

use super::renumber::ListRenumberer;
use crate::error::{Position, TranscodeError, Warning, WarningKind};
use crate::grammar::Grammar;
use crate::ir::counter::ItemCounter;
use crate::ir::nodes::{ColumnKey, Completeness, Row, TestSpec, Transcoded};

/// Glyph that prefixes every bullet entry inside a cell.
pub const BULLET: &str = "・";

static EMPTY_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^・[ \n]*$").expect("empty bullet pattern is valid"));
static NESTED_BULLET_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^( {4})+[-+*] ").expect("nested bullet pattern is valid"));
static LEADING_INDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^( {4})+").expect("indent pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Free,
    Summary,
    EnvironmentFrame,
    TestItems,
}

/// Two trailing spaces on a list line let the next unmarked line continue it.
#[derive(Debug, Clone, Copy, Default)]
struct SoftBreak {
    pending: bool,
    indent: usize,
}

/// What a line inside the test item region turned out to be.
enum ItemLine {
    Field(ColumnKey),
    Ignored,
    Blank,
    Nested(NestedEntry),
    Continuation,
    Unrecognized,
}

#[derive(Clone, Copy)]
enum NestedKind {
    Bullet,
    Number,
}

#[derive(Clone, Copy)]
struct NestedEntry {
    kind: NestedKind,
    depth: usize,
}

/// Parse a Markdown test specification into its row table.
///
/// `sheet_name` is recorded on the result as-is; validate it with
/// [`crate::batch::sheet_name_from_path`] first when it comes from a file name.
pub fn parse_test_spec(
    source: &str,
    sheet_name: &str,
    grammar: &Grammar,
) -> Result<Transcoded<TestSpec>, TranscodeError> {
    let mut session = ParseSession::new(grammar);
    for (idx, line) in source.lines().enumerate() {
        session.feed(idx + 1, line)?;
    }
    let (mut spec, warnings) = session.finish()?;
    spec.sheet_name = sheet_name.to_string();

    tracing::debug!(
        sheet = sheet_name,
        rows = spec.rows.len(),
        warnings = warnings.len(),
        "parsed markdown test specification"
    );

    Ok(Transcoded {
        output: spec,
        warnings,
    })
}

struct ParseSession<'g> {
    grammar: &'g Grammar,
    region: Region,
    title_seen: bool,
    prev_line: String,
    spec: TestSpec,
    draft: Row,
    counter: ItemCounter,
    numbers: ListRenumberer,
    active: Option<ColumnKey>,
    prev_depth: usize,
    soft_break: SoftBreak,
    prev_viewpoint_level: usize,
    warnings: Vec<Warning>,
}

impl<'g> ParseSession<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        ParseSession {
            grammar,
            region: Region::Free,
            title_seen: false,
            prev_line: String::new(),
            spec: TestSpec::default(),
            draft: Row::default(),
            counter: ItemCounter::new(),
            numbers: ListRenumberer::new(grammar.numbering_depths()),
            active: None,
            prev_depth: 0,
            soft_break: SoftBreak::default(),
            prev_viewpoint_level: 0,
            warnings: Vec::new(),
        }
    }

    fn feed(&mut self, line_no: usize, line: &str) -> Result<(), TranscodeError> {
        let before = self.region;
        self.classify(line_no, line)?;
        if self.region != before {
            tracing::debug!(line = line_no, from = ?before, to = ?self.region, "region change");
        }
        self.prev_line = line.to_string();
        Ok(())
    }

    fn classify(&mut self, line_no: usize, line: &str) -> Result<(), TranscodeError> {
        if self.grammar.title().is_match(line) {
            self.region = Region::Summary;
            self.title_seen = true;
            self.spec.category = self.prev_line.trim().to_string();
        } else if self.grammar.test_env_frame().is_match(line) {
            self.region = match self.region {
                Region::Summary => Region::EnvironmentFrame,
                Region::EnvironmentFrame => Region::Summary,
                other => other,
            };
        } else if self.region == Region::Free {
            // memo area before the title
        } else if line.starts_with('#') {
            self.enter_viewpoint(line_no, line)?;
        } else {
            match self.region {
                Region::Summary => self.spec.summary.push(line.to_string()),
                Region::EnvironmentFrame => {
                    let name = line.trim();
                    if !name.is_empty() {
                        self.spec.environments.push(name.to_string());
                    }
                }
                _ => self.item_line(line_no, line),
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<(TestSpec, Vec<Warning>), TranscodeError> {
        if !self.title_seen {
            return Err(TranscodeError::MissingTitle);
        }
        self.flush(Position::EndOfDocument)?;
        Ok((self.spec, self.warnings))
    }

    fn intention_count(&self) -> usize {
        self.draft.intentions.len()
    }

    fn has_duplicate_environments(&self) -> bool {
        let envs = &self.spec.environments;
        envs.iter()
            .enumerate()
            .any(|(idx, name)| envs[..idx].contains(name))
    }

    fn enter_viewpoint(&mut self, line_no: usize, line: &str) -> Result<(), TranscodeError> {
        if self.region == Region::EnvironmentFrame || self.has_duplicate_environments() {
            return Err(TranscodeError::UnclosedEnvironmentFrame {
                position: Position::line(line_no),
            });
        }
        if self.region == Region::Summary {
            if self.spec.environments.is_empty() {
                self.spec.environments.push(String::new());
            }
            let count = self.spec.environments.len();
            self.draft.intentions.resize(count, String::new());
        }

        self.soft_break = SoftBreak::default();
        self.active = None;
        self.prev_depth = 0;
        self.numbers.reset();
        self.region = Region::TestItems;

        let Some(level) = (1..=6).find(|level| self.grammar.level(*level).is_match(line)) else {
            return Ok(());
        };

        self.flush(Position::line(line_no))?;

        let heading = self.grammar.level(level).replace(line, "");
        let heading = heading.trim_start();
        if level == 6 && heading.trim_end_matches(' ').is_empty() {
            // a bare level 6 marker only separates two items
            return Ok(());
        }

        let mut row = Row::with_intentions(self.intention_count());
        row.environment = heading.to_string();
        // viewpoint levels are 1..=6 so the cast is lossless
        self.push_row(ColumnKey::Level(level as u8), row);

        if level >= self.prev_viewpoint_level + 2 {
            self.warnings.push(Warning::new(
                WarningKind::ViewpointLevelSkipped,
                Position::line(line_no),
                line.trim_end(),
            ));
        }
        self.prev_viewpoint_level = level;
        Ok(())
    }

    /// Appends the pending test item if it is complete.
    fn flush(&mut self, position: Position) -> Result<(), TranscodeError> {
        match self.draft.completeness() {
            Completeness::Complete => {
                let count = self.intention_count();
                let item = std::mem::replace(&mut self.draft, Row::with_intentions(count));
                self.push_row(ColumnKey::Number, item);
                Ok(())
            }
            Completeness::Empty => {
                let count = self.intention_count();
                self.draft = Row::with_intentions(count);
                Ok(())
            }
            Completeness::Inconsistent => Err(TranscodeError::InconsistentItem { position }),
        }
    }

    fn push_row(&mut self, mark: ColumnKey, mut row: Row) {
        if let Some(value) = self.counter.take(mark) {
            if let Some(cell) = row.field_mut(mark) {
                *cell = value.to_string();
            }
        }
        row.mark = mark;
        self.spec.rows.push(row);
    }

    fn classify_item(&self, line: &str) -> ItemLine {
        for key in ColumnKey::CONTENT_FIELDS {
            let Some(marker) = self.grammar.field(key) else {
                continue;
            };
            if !marker.is_match(line) {
                continue;
            }
            if key == ColumnKey::Expected && self.is_notes_line(line) {
                continue;
            }
            return ItemLine::Field(key);
        }

        if self.grammar.caption().is_match(line) || self.grammar.separator().is_match(line) {
            ItemLine::Ignored
        } else if line.is_empty() {
            ItemLine::Blank
        } else if self.grammar.nested_line().is_match(line) {
            match self.nested_entry(line) {
                Some(entry) => ItemLine::Nested(entry),
                None => ItemLine::Ignored,
            }
        } else if self.soft_break.pending {
            ItemLine::Continuation
        } else {
            ItemLine::Unrecognized
        }
    }

    fn is_notes_line(&self, line: &str) -> bool {
        self.grammar
            .field(ColumnKey::Notes)
            .is_some_and(|notes| notes.is_match(line))
    }

    fn nested_entry(&self, line: &str) -> Option<NestedEntry> {
        let bullets = self
            .grammar
            .nested_points()
            .iter()
            .map(|re| (NestedKind::Bullet, re));
        let numbers = self
            .grammar
            .nested_numbers()
            .iter()
            .map(|re| (NestedKind::Number, re));

        let per_kind = |(idx, (kind, re)): (usize, (NestedKind, &Regex))| {
            re.is_match(line).then_some(NestedEntry {
                kind,
                depth: idx + 1,
            })
        };

        bullets
            .enumerate()
            .find_map(per_kind)
            .or_else(|| numbers.enumerate().find_map(per_kind))
    }

    fn item_line(&mut self, line_no: usize, line: &str) {
        let mut cell = match self.classify_item(line) {
            ItemLine::Field(key) => self.start_field(key, line),
            ItemLine::Ignored => String::new(),
            ItemLine::Blank => {
                if self.active.is_some() {
                    "\n".to_string()
                } else {
                    String::new()
                }
            }
            ItemLine::Nested(entry) => self.nested_cell(entry, line),
            ItemLine::Continuation => {
                let indent = self.soft_break.indent + 2;
                format!("{}{}\n", " ".repeat(indent), line.trim_start())
            }
            ItemLine::Unrecognized => {
                self.warnings.push(Warning::new(
                    WarningKind::UnrecognizedLine,
                    Position::line(line_no),
                    line,
                ));
                String::new()
            }
        };

        let Some(active) = self.active else {
            return;
        };

        if cell.ends_with("  \n") {
            self.soft_break.pending = true;
            cell = format!("{}\n", cell.trim_end());
        } else if cell != "\n" {
            self.soft_break = SoftBreak::default();
        }

        if EMPTY_BULLET.is_match(&cell) || cell.is_empty() {
            return;
        }
        if let Some(field) = self.draft.field_mut(active) {
            field.push_str(&cell);
        }
    }

    fn start_field(&mut self, key: ColumnKey, line: &str) -> String {
        let previous = self.active.replace(key);

        if key == ColumnKey::Steps {
            if previous != Some(ColumnKey::Steps) {
                self.numbers.reset();
            }
            self.numbers.renumber(0, self.prev_depth);
            self.prev_depth = 0;
            return format!("{}\n", self.numbers.convert(line, 0));
        }

        self.numbers.reset();
        match key {
            ColumnKey::Expected => self.seed_intentions(),
            ColumnKey::Notes => self.apply_omission(line),
            _ => {}
        }

        let Some(marker) = self.grammar.field(key) else {
            return String::new();
        };
        let rest = marker.replace(line, "");
        let rest = rest.trim_start();
        if rest.is_empty() {
            BULLET.to_string()
        } else {
            format!("{BULLET}{rest}\n")
        }
    }

    fn seed_intentions(&mut self) {
        let inclusion = &self.grammar.intention_words().inclusion_word;
        for intention in self.draft.intentions.iter_mut().filter(|i| i.is_empty()) {
            intention.clone_from(inclusion);
        }
    }

    /// `- [x] ` omits the item for every environment, `- [x] NAME` for the last
    /// environment whose name prefixes the rest of the line.
    fn apply_omission(&mut self, line: &str) {
        const CHECKED: &str = "- [x] ";
        let Some(rest) = line.strip_prefix(CHECKED) else {
            return;
        };
        let omission = &self.grammar.intention_words().omission_word;
        let named = self
            .spec
            .environments
            .iter()
            .rposition(|name| rest.starts_with(name.as_str()));

        match named {
            Some(idx) => {
                if let Some(intention) = self.draft.intentions.get_mut(idx) {
                    intention.clone_from(omission);
                }
            }
            None => {
                for intention in &mut self.draft.intentions {
                    intention.clone_from(omission);
                }
            }
        }
    }

    fn nested_cell(&mut self, entry: NestedEntry, line: &str) -> String {
        self.numbers.renumber(entry.depth, self.prev_depth);

        let body = match entry.kind {
            NestedKind::Bullet => {
                format!("{BULLET}{}", NESTED_BULLET_MARKER.replace(line, ""))
            }
            NestedKind::Number => {
                let converted = self.numbers.convert(line, entry.depth);
                LEADING_INDENT.replace(&converted, "").into_owned()
            }
        };

        let indent = self.grammar.nested_indent(entry.depth);
        self.soft_break.indent = indent;
        self.prev_depth = entry.depth;
        format!("{}{body}\n", " ".repeat(indent))
    }
}
