//! Bounding-box label records.
//!
//! A label file sits next to its image with the same stem and a `.txt`
//! extension. Each non-blank line is one record:
//!
//! ```text
//! <class_id> <center_x> <center_y> <width> <height>
//! ```
//!
//! Coordinates are normalized to the image size. `class_id` indexes into
//! [`CLASS_NAMES`].

mod heuristic;

pub use heuristic::{guess_class, KEYWORD_TABLE};

use std::fmt;
use std::num::IntErrorKind;

/// Ordered class names. The index of a name is its `class_id`.
pub const CLASS_NAMES: [&str; 5] = ["plastic", "paper", "metal", "glass", "organic"];

/// Default number of classes, matching [`CLASS_NAMES`].
pub const DEFAULT_NUM_CLASSES: usize = CLASS_NAMES.len();

/// Number of whitespace-separated fields in a record.
pub const FIELD_COUNT: usize = 5;

/// Extension used by label files.
pub const LABEL_EXTENSION: &str = "txt";

/// One parsed line of a label file.
///
/// Parsing is permissive: a record may hold a negative class id or
/// coordinates outside `[0, 1]`, so that the validator can report them
/// instead of failing to parse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelRecord {
    pub class_id: i64,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl LabelRecord {
    pub fn new(class_id: i64, center_x: f64, center_y: f64, width: f64, height: f64) -> Self {
        Self {
            class_id,
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// The four coordinate fields paired with their names, in file order.
    pub fn coords(&self) -> [(&'static str, f64); 4] {
        [
            ("center_x", self.center_x),
            ("center_y", self.center_y),
            ("width", self.width),
            ("height", self.height),
        ]
    }
}

/// Records are written with six decimal digits, one per line.
impl fmt::Display for LabelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.center_x, self.center_y, self.width, self.height
        )
    }
}

/// Why a single line could not be turned into a [`LabelRecord`].
#[derive(Clone, Debug, PartialEq)]
pub enum LineError {
    /// The line does not have exactly [`FIELD_COUNT`] fields.
    FieldCount { found: usize },
    /// A field is not a valid number.
    InvalidNumber {
        field: &'static str,
        raw: String,
    },
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::FieldCount { found } => {
                write!(f, "expected {} values, found {}", FIELD_COUNT, found)
            }
            LineError::InvalidNumber { field, raw } => {
                write!(f, "invalid {field} '{raw}'; expected a number")
            }
        }
    }
}

/// Parse one line of a label file.
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_label_line(line: &str) -> Result<Option<LabelRecord>, LineError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let found = trimmed.split_whitespace().count();
    if found != FIELD_COUNT {
        return Err(LineError::FieldCount { found });
    }

    let mut tokens = trimmed.split_whitespace();
    let mut next = || tokens.next().unwrap_or_default();

    let class_id = parse_class_token(next())?;

    let center_x = parse_f64_token(next(), "center_x")?;
    let center_y = parse_f64_token(next(), "center_y")?;
    let width = parse_f64_token(next(), "width")?;
    let height = parse_f64_token(next(), "height")?;

    Ok(Some(LabelRecord {
        class_id,
        center_x,
        center_y,
        width,
        height,
    }))
}

/// Fuzz-only entrypoint for single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) {
    let _ = parse_label_line(input);
}

/// Integers too large for `i64` saturate, so they still reach the class
/// range check instead of failing as unparsable.
fn parse_class_token(raw: &str) -> Result<i64, LineError> {
    match raw.parse::<i64>() {
        Ok(class_id) => Ok(class_id),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(LineError::InvalidNumber {
                field: "class_id",
                raw: raw.to_string(),
            }),
        },
    }
}

fn parse_f64_token(raw: &str, field: &'static str) -> Result<f64, LineError> {
    raw.parse::<f64>().map_err(|_| LineError::InvalidNumber {
        field,
        raw: raw.to_string(),
    })
}

/// Render records as label file content, one line each.
pub fn to_label_string(records: &[LabelRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out
}
