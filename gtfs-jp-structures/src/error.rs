//! Module for the error management
//!
//! Two levels of failure exist: an [Error] aborts the whole operation, while a [Diagnostic]
//! only reports a row or a table that was left out of the materialized feed.
use crate::schema::{ColumnType, TableName};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Specific line from a CSV file that could not be read
#[derive(Debug)]
pub struct LineError {
    /// Headers of the CSV file
    pub headers: Vec<String>,
    /// Values of the line that could not be parsed
    pub values: Vec<String>,
}

/// An error that can occur when processing GTFS-JP data.
#[derive(Error, Debug)]
pub enum Error {
    /// The given location is neither a local file, a local directory nor a remote url
    #[error("Could not find feed at {0}")]
    PathNotFound(String),
    /// The single attempt to download the remote archive failed
    #[error("impossible to fetch '{url}'")]
    FetchFailed {
        /// The url that was requested
        url: String,
        /// The initial error of the transport
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The feed was configured with a value outside of its allowed set
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A table could not be read as a sequence of rows
    #[error("impossible to decode table '{table}': {reason}")]
    TableDecode {
        /// The table that could not be decoded
        table: TableName,
        /// Description of the structural problem
        reason: String,
        /// The line that could not be parsed by the csv library
        line_in_error: Option<LineError>,
    },
    /// Writing the feed failed, nothing was promoted to the destination
    #[error("impossible to export feed to '{}'", path.display())]
    ExportFailed {
        /// Requested destination
        path: PathBuf,
        /// The initial error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Generic Input/Output error while reading a file
    #[error("impossible to read file")]
    IO(#[from] std::io::Error),
    /// Impossible to read a file
    #[error("impossible to read '{file_name}'")]
    NamedFileIO {
        /// The file name that could not be read
        file_name: String,
        /// The inital error that caused the unability to read the file
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Error when trying to unzip the feed archive
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

/// A cell whose text could not be coerced to the type declared for its column
#[derive(Debug, Clone, PartialEq)]
pub struct CellError {
    /// Header of the column
    pub column: &'static str,
    /// Text found in the file
    pub value: String,
    /// Type declared for the column
    pub expected: ColumnType,
}

/// Why a row or a table was left out of the materialized feed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Issue {
    /// A required value is null
    #[error("missing required value")]
    MissingValue,
    /// The value does not fit its column
    #[error("'{value}' is not a valid {expected}")]
    InvalidValue {
        /// Text of the value
        value: String,
        /// What was expected instead
        expected: String,
    },
    /// A foreign key does not match any row of the referenced table
    #[error("references unknown {target} '{value}'")]
    UnresolvedReference {
        /// Referenced table
        target: TableName,
        /// Key that was looked for
        value: String,
    },
    /// Another row of the table already has the same key
    #[error("duplicate key ({0})")]
    DuplicateKey(String),
    /// The whole table could not be decoded and is considered absent
    #[error("table could not be decoded: {0}")]
    TableDecode(String),
}

/// A row that cannot become a record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Column at fault, None when the problem spans several columns
    pub field: Option<&'static str>,
    /// What went wrong
    pub issue: Issue,
}

impl FieldError {
    /// A required column is null
    pub fn missing(field: &'static str) -> Self {
        Self {
            field: Some(field),
            issue: Issue::MissingValue,
        }
    }

    /// A column holds a value outside of what it accepts
    pub fn invalid(field: &'static str, issue: Issue) -> Self {
        Self {
            field: Some(field),
            issue,
        }
    }
}

impl From<CellError> for FieldError {
    fn from(e: CellError) -> Self {
        Self {
            field: Some(e.column),
            issue: e.into(),
        }
    }
}

impl From<CellError> for Issue {
    fn from(e: CellError) -> Self {
        Issue::InvalidValue {
            value: e.value,
            expected: e.expected.to_string(),
        }
    }
}

/// A problem found while materializing a feed
///
/// Diagnostics never abort the reading, they are returned alongside the feed so that the
/// completeness of the data can be checked
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The table where the problem was found
    pub table: TableName,
    /// Index of the data row in the file (the header is not counted), None for a whole table
    pub row: Option<usize>,
    /// Column at fault, None for a whole table or a whole key
    pub field: Option<&'static str>,
    /// What went wrong
    pub issue: Issue,
}

impl Diagnostic {
    /// A whole table was dropped
    pub fn table(table: TableName, reason: impl Into<String>) -> Self {
        Self {
            table,
            row: None,
            field: None,
            issue: Issue::TableDecode(reason.into()),
        }
    }

    /// A single row was dropped
    pub fn row(table: TableName, row: usize, field: Option<&'static str>, issue: Issue) -> Self {
        Self {
            table,
            row: Some(row),
            field,
            issue,
        }
    }

    /// True if the diagnostic concerns a whole table
    pub fn is_table_level(&self) -> bool {
        self.row.is_none()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.table)?;
        if let Some(row) = self.row {
            write!(f, " row {}", row)?;
        }
        if let Some(field) = self.field {
            write!(f, " [{}]", field)?;
        }
        write!(f, ": {}", self.issue)
    }
}
