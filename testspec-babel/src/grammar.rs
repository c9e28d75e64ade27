//! Configurable Markdown dialect
//!
//!     Every marker the transcoder reads or writes is data, not code. A [`GrammarSpec`] is the
//!     serde-facing description (it deserializes from the `[markdown]` table of the config
//!     file and its `Default` is the built-in dialect); a [`Grammar`] is the compiled form
//!     with every read marker turned into a start-anchored regex.
//!
//!     Read markers are matched at the beginning of a line only, so a pattern such as `+ `
//!     behaves exactly like `^\+ `. Write markers are emitted verbatim.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GrammarError;
use crate::ir::nodes::ColumnKey;

/// Display names of the table header, left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub mark: String,
    pub lv1: String,
    pub lv2: String,
    pub lv3: String,
    pub lv4: String,
    pub lv5: String,
    pub lv6: String,
    pub number: String,
    pub environment: String,
    pub precondition: String,
    pub steps: String,
    pub expected: String,
    pub notes: String,
}

impl ColumnNames {
    /// The twelve header cells from the first viewpoint level through notes.
    pub fn header(&self) -> [&str; 12] {
        [
            &self.lv1,
            &self.lv2,
            &self.lv3,
            &self.lv4,
            &self.lv5,
            &self.lv6,
            &self.number,
            &self.environment,
            &self.precondition,
            &self.steps,
            &self.expected,
            &self.notes,
        ]
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            mark: "MARK".into(),
            lv1: "1".into(),
            lv2: "2".into(),
            lv3: "3".into(),
            lv4: "4".into(),
            lv5: "5".into(),
            lv6: "6".into(),
            number: "番号".into(),
            environment: "環境".into(),
            precondition: "準備".into(),
            steps: "手順".into(),
            expected: "確認".into(),
            notes: "備考".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultAreaNames {
    pub test_intention: String,
}

impl Default for ResultAreaNames {
    fn default() -> Self {
        ResultAreaNames {
            test_intention: "実施判定".into(),
        }
    }
}

/// Patterns recognized while reading Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadMarks {
    pub title: String,
    pub lv1: String,
    pub lv2: String,
    pub lv3: String,
    pub lv4: String,
    pub lv5: String,
    pub lv6: String,
    pub test_env_frame: String,
    pub environment: String,
    pub precondition: String,
    pub steps: String,
    pub expected: String,
    pub notes: String,
    pub caption: String,
    pub separator: String,
}

impl Default for ReadMarks {
    fn default() -> Self {
        ReadMarks {
            title: "^=+".into(),
            lv1: "^# ".into(),
            lv2: "^## ".into(),
            lv3: "^### ".into(),
            lv4: "^#### ".into(),
            lv5: "^##### ".into(),
            lv6: "^###### ".into(),
            test_env_frame: "^```".into(),
            environment: r"^\+ ".into(),
            precondition: r"^\* ".into(),
            steps: r"^[0-9]+\. ".into(),
            expected: "^- ".into(),
            notes: r"^- \[[ xX]\] ".into(),
            caption: "^> ".into(),
            separator: "^---".into(),
        }
    }
}

/// Nested list patterns, one entry per depth starting at depth 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedMarks {
    pub points_list_lv: Vec<String>,
    pub number_list_lv: Vec<String>,
}

impl Default for NestedMarks {
    fn default() -> Self {
        NestedMarks {
            points_list_lv: vec![
                r"^ {4}[-+*] ".into(),
                r"^ {8}[-+*] ".into(),
                r"^ {12}[-+*] ".into(),
            ],
            number_list_lv: vec![
                r"^ {4}[0-9]+\. ".into(),
                r"^ {8}[0-9]+\. ".into(),
                r"^ {12}[0-9]+\. ".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxMarks {
    pub nested: NestedMarks,
    /// Cell indentation, in spaces, for nesting depths 1, 2, 3...
    pub nested_list_indent_lv: Vec<usize>,
}

impl Default for AuxMarks {
    fn default() -> Self {
        AuxMarks {
            nested: NestedMarks::default(),
            nested_list_indent_lv: vec![2, 4, 6],
        }
    }
}

/// Words written into the test-intention columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentionWords {
    pub inclusion_word: String,
    pub omission_word: String,
}

impl Default for IntentionWords {
    fn default() -> Self {
        IntentionWords {
            inclusion_word: "実施".into(),
            omission_word: "省略".into(),
        }
    }
}

/// Markers emitted in front of test item content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMarks {
    pub lv1: String,
    pub lv2: String,
    pub lv3: String,
    pub lv4: String,
    pub lv5: String,
    pub lv6: String,
    pub environment: String,
    pub precondition: String,
    pub steps: String,
    pub expected: String,
    pub notes: String,
    pub environment_caption: String,
    pub precondition_caption: String,
    pub steps_caption: String,
    pub expected_caption: String,
    pub notes_caption: String,
}

impl RowMarks {
    /// Heading marker for a viewpoint level (1-6).
    pub fn level(&self, level: usize) -> &str {
        match level {
            1 => &self.lv1,
            2 => &self.lv2,
            3 => &self.lv3,
            4 => &self.lv4,
            5 => &self.lv5,
            _ => &self.lv6,
        }
    }
}

impl Default for RowMarks {
    fn default() -> Self {
        RowMarks {
            lv1: "# ".into(),
            lv2: "## ".into(),
            lv3: "### ".into(),
            lv4: "#### ".into(),
            lv5: "##### ".into(),
            lv6: "###### ".into(),
            environment: "+ ".into(),
            precondition: "* ".into(),
            steps: "1. ".into(),
            expected: "- ".into(),
            notes: "- [ ] ".into(),
            environment_caption: "> 環境".into(),
            precondition_caption: "> 準備".into(),
            steps_caption: "> 手順".into(),
            expected_caption: "> 確認".into(),
            notes_caption: "> 備考".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteMarks {
    pub title: String,
    pub test_env_frame: String,
    pub test_rows: RowMarks,
}

impl Default for WriteMarks {
    fn default() -> Self {
        WriteMarks {
            title: "=".into(),
            test_env_frame: "```".into(),
            test_rows: RowMarks::default(),
        }
    }
}

/// Serializable description of the Markdown dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarSpec {
    pub col_name: ColumnNames,
    pub col_name_res_area: ResultAreaNames,
    pub mark_for_read: ReadMarks,
    pub aux_mark: AuxMarks,
    pub test_intention: IntentionWords,
    pub mark_for_write: WriteMarks,
}

/// Lines inside the test item region that start a nested list entry at all.
const NESTED_LINE: &str = r"^( {4})+([0-9]+\. |- |\+ |\* )";

/// Compiled dialect used by the parser and serializer.
#[derive(Debug, Clone)]
pub struct Grammar {
    spec: GrammarSpec,
    title: Regex,
    levels: Vec<Regex>,
    test_env_frame: Regex,
    environment: Regex,
    precondition: Regex,
    steps: Regex,
    expected: Regex,
    notes: Regex,
    caption: Regex,
    separator: Regex,
    nested_line: Regex,
    nested_points: Vec<Regex>,
    nested_numbers: Vec<Regex>,
}

fn anchored(field: &str, pattern: &str) -> Result<Regex, GrammarError> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| GrammarError::InvalidPattern {
        field: field.to_string(),
        source,
    })
}

fn anchored_all(field: &str, patterns: &[String]) -> Result<Vec<Regex>, GrammarError> {
    patterns
        .iter()
        .enumerate()
        .map(|(idx, pattern)| anchored(&format!("{field}[{idx}]"), pattern))
        .collect()
}

impl Grammar {
    pub fn new(spec: GrammarSpec) -> Result<Self, GrammarError> {
        let read = &spec.mark_for_read;
        let nested = &spec.aux_mark.nested;

        let depth = nested.points_list_lv.len().max(nested.number_list_lv.len());
        let indents = spec.aux_mark.nested_list_indent_lv.len();
        if indents < depth {
            return Err(GrammarError::IndentTableTooShort {
                indents,
                patterns: depth,
            });
        }

        let levels = [
            ("mark_for_read.lv1", &read.lv1),
            ("mark_for_read.lv2", &read.lv2),
            ("mark_for_read.lv3", &read.lv3),
            ("mark_for_read.lv4", &read.lv4),
            ("mark_for_read.lv5", &read.lv5),
            ("mark_for_read.lv6", &read.lv6),
        ]
        .into_iter()
        .map(|(field, pattern)| anchored(field, pattern))
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Grammar {
            title: anchored("mark_for_read.title", &read.title)?,
            levels,
            test_env_frame: anchored("mark_for_read.test_env_frame", &read.test_env_frame)?,
            environment: anchored("mark_for_read.environment", &read.environment)?,
            precondition: anchored("mark_for_read.precondition", &read.precondition)?,
            steps: anchored("mark_for_read.steps", &read.steps)?,
            expected: anchored("mark_for_read.expected", &read.expected)?,
            notes: anchored("mark_for_read.notes", &read.notes)?,
            caption: anchored("mark_for_read.caption", &read.caption)?,
            separator: anchored("mark_for_read.separator", &read.separator)?,
            nested_line: anchored("nested line", NESTED_LINE)?,
            nested_points: anchored_all("aux_mark.nested.points_list_lv", &nested.points_list_lv)?,
            nested_numbers: anchored_all("aux_mark.nested.number_list_lv", &nested.number_list_lv)?,
            spec,
        })
    }

    pub fn spec(&self) -> &GrammarSpec {
        &self.spec
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.spec.col_name
    }

    pub fn write_marks(&self) -> &WriteMarks {
        &self.spec.mark_for_write
    }

    pub fn intention_words(&self) -> &IntentionWords {
        &self.spec.test_intention
    }

    pub fn title(&self) -> &Regex {
        &self.title
    }

    pub fn test_env_frame(&self) -> &Regex {
        &self.test_env_frame
    }

    /// Heading pattern for a viewpoint level (1-6).
    pub fn level(&self, level: usize) -> &Regex {
        &self.levels[level.clamp(1, 6) - 1]
    }

    /// Item field pattern, for the five content fields.
    pub fn field(&self, key: ColumnKey) -> Option<&Regex> {
        match key {
            ColumnKey::Environment => Some(&self.environment),
            ColumnKey::Precondition => Some(&self.precondition),
            ColumnKey::Steps => Some(&self.steps),
            ColumnKey::Expected => Some(&self.expected),
            ColumnKey::Notes => Some(&self.notes),
            _ => None,
        }
    }

    pub fn caption(&self) -> &Regex {
        &self.caption
    }

    pub fn separator(&self) -> &Regex {
        &self.separator
    }

    pub fn nested_line(&self) -> &Regex {
        &self.nested_line
    }

    pub fn nested_points(&self) -> &[Regex] {
        &self.nested_points
    }

    pub fn nested_numbers(&self) -> &[Regex] {
        &self.nested_numbers
    }

    /// Cell indentation for a nesting depth (1-based).
    pub fn nested_indent(&self, depth: usize) -> usize {
        self.spec
            .aux_mark
            .nested_list_indent_lv
            .get(depth.saturating_sub(1))
            .copied()
            .unwrap_or(0)
    }

    /// Number of ordered list depths the renumberer has to track (top level included).
    pub fn numbering_depths(&self) -> usize {
        1 + self.nested_numbers.len()
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar::new(GrammarSpec::default()).expect("built-in grammar patterns are valid")
    }
}

impl TryFrom<GrammarSpec> for Grammar {
    type Error = GrammarError;

    fn try_from(spec: GrammarSpec) -> Result<Self, Self::Error> {
        Grammar::new(spec)
    }
}
