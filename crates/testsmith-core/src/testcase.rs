// ABOUTME: Structured manual test case records and the strict line-prefix parser that builds them.
// ABOUTME: Guarantees a fixed nine-field shape for display rendering and CSV export.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Column labels, in export order. Each doubles as the line prefix (plus `:`) the parser recognizes.
pub const TEST_CASE_COLUMNS: [&str; 9] = [
    "Test Case ID",
    "Description",
    "Test Steps",
    "Test Data Set 1",
    "Test Data Set 2",
    "Test Data Set 3",
    "Test Data Set 4",
    "Test Data Set 5",
    "Expected Result",
];

static BLOCK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("block separator regex is valid"));

/// One manual test case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(rename = "Test Case ID")]
    pub id: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Test Steps")]
    pub steps: String,
    #[serde(rename = "Test Data Set 1")]
    pub data_set_1: String,
    #[serde(rename = "Test Data Set 2")]
    pub data_set_2: String,
    #[serde(rename = "Test Data Set 3")]
    pub data_set_3: String,
    #[serde(rename = "Test Data Set 4")]
    pub data_set_4: String,
    #[serde(rename = "Test Data Set 5")]
    pub data_set_5: String,
    #[serde(rename = "Expected Result")]
    pub expected_result: String,
}

impl TestCase {
    /// The canned record returned when generation or parsing yields nothing.
    pub fn fallback() -> Self {
        Self {
            id: "TC_001".to_string(),
            description: "Default test case - generation failed".to_string(),
            steps: "1. Check system response\n2. Verify expected behavior".to_string(),
            data_set_1: "Sample data 1".to_string(),
            data_set_2: "Sample data 2".to_string(),
            data_set_3: "Sample data 3".to_string(),
            data_set_4: "Sample data 4".to_string(),
            data_set_5: "Sample data 5".to_string(),
            expected_result: "System behaves as expected".to_string(),
        }
    }

    /// Field values in `TEST_CASE_COLUMNS` order.
    pub fn to_row(&self) -> [&str; 9] {
        [
            &self.id,
            &self.description,
            &self.steps,
            &self.data_set_1,
            &self.data_set_2,
            &self.data_set_3,
            &self.data_set_4,
            &self.data_set_5,
            &self.expected_result,
        ]
    }

    pub fn data_sets(&self) -> [&str; 5] {
        [
            &self.data_set_1,
            &self.data_set_2,
            &self.data_set_3,
            &self.data_set_4,
            &self.data_set_5,
        ]
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Id => &mut self.id,
            Field::Description => &mut self.description,
            Field::Steps => &mut self.steps,
            Field::DataSet(1) => &mut self.data_set_1,
            Field::DataSet(2) => &mut self.data_set_2,
            Field::DataSet(3) => &mut self.data_set_3,
            Field::DataSet(4) => &mut self.data_set_4,
            Field::DataSet(_) => &mut self.data_set_5,
            Field::Expected => &mut self.expected_result,
        }
    }
}

/// Placeholder written into data variants the model left out.
pub fn missing_data_placeholder(index: usize) -> String {
    format!("Missing concrete test data set {index}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Description,
    Steps,
    DataSet(usize),
    Expected,
}

impl Field {
    fn from_column(index: usize) -> Self {
        match index {
            0 => Field::Id,
            1 => Field::Description,
            2 => Field::Steps,
            3..=7 => Field::DataSet(index - 2),
            _ => Field::Expected,
        }
    }
}

/// Match a field prefix line, returning the field and the rest of the line.
fn match_prefix(line: &str) -> Option<(Field, &str)> {
    TEST_CASE_COLUMNS
        .iter()
        .enumerate()
        .find_map(|(index, label)| {
            line.strip_prefix(label)
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|rest| (Field::from_column(index), rest.trim()))
        })
}

/// Parse model output into test cases.
///
/// Blank-line-delimited blocks become records. A prefix line switches the
/// current field and its remainder becomes the field's first line; any other
/// non-empty line is appended to the current field. Records without an id are
/// dropped, and empty data variants are filled with a placeholder. May return
/// an empty list; callers substitute [`TestCase::fallback`].
pub fn parse_test_cases(content: &str) -> Vec<TestCase> {
    let content = content.trim();
    if content.is_empty() {
        return Vec::new();
    }

    BLOCK_SEPARATOR
        .split(content)
        .filter_map(parse_block)
        .collect()
}

fn parse_block(block: &str) -> Option<TestCase> {
    let mut case = TestCase::default();
    let mut current: Option<Field> = None;

    for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some((field, rest)) = match_prefix(line) {
            current = Some(field);
            if !rest.is_empty() {
                append_line(case.field_mut(field), rest);
            }
        } else if let Some(field) = current {
            append_line(case.field_mut(field), line);
        }
    }

    if case.id.is_empty() {
        return None;
    }

    for index in 1..=5 {
        let slot = case.field_mut(Field::DataSet(index));
        if slot.is_empty() {
            *slot = missing_data_placeholder(index);
        }
    }
    Some(case)
}

fn append_line(target: &mut String, line: &str) {
    if !target.is_empty() {
        target.push('\n');
    }
    target.push_str(line);
}

/// Render records as label/value blocks separated by blank lines.
pub fn render_for_display(cases: &[TestCase]) -> String {
    if cases.is_empty() {
        return "No test cases generated.".to_string();
    }

    let mut out = String::new();
    for case in cases {
        out.push_str(&format!("Test Case ID: {}\n", case.id));
        out.push_str(&format!("Description: {}\n", case.description));
        out.push_str(&format!("Test Steps:\n{}\n", case.steps));
        for (index, data) in case.data_sets().iter().enumerate() {
            out.push_str(&format!("Test Data Set {}:\n{}\n", index + 1, data));
        }
        out.push_str(&format!("Expected Result:\n{}\n\n", case.expected_result));
    }
    out
}
