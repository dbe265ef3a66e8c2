use crate::cleaners::clean_column_names;
use crate::error::{CellError, LineError};
use crate::schema::{Column, ColumnType, TableName};
use crate::Error;
use log::debug;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Cells holding one of those tokens are null, whatever the type of their column
pub const NULL_TOKENS: [&str; 5] = ["", " ", "nan", "NaN", "null"];

const BOM: &[u8] = &[0xef, 0xbb, 0xbf];

static NULL: Value = Value::Null;

/// A typed cell of a parsed table
///
/// Every column type is nullable: a missing integer stays a missing integer and is never promoted to a float.
#[derive(Debug, Clone)]
pub enum Value {
    /// The cell held a null token
    Null,
    /// Text cell
    Str(String),
    /// 32 bits integer cell
    Int32(i32),
    /// 16 bits integer cell
    Int16(i16),
    /// Float cell, always finite
    Float(f64),
}

impl Value {
    /// Coerces the text of a cell to the given column type, None if the text does not fit
    pub fn parse(raw: &str, column_type: ColumnType) -> Option<Value> {
        if is_null_token(raw) {
            return Some(Value::Null);
        }
        match column_type {
            ColumnType::Str => Some(Value::Str(raw.to_owned())),
            ColumnType::Int32 => raw.trim().parse().ok().map(Value::Int32),
            ColumnType::Int16 => raw.trim().parse().ok().map(Value::Int16),
            ColumnType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float),
        }
    }

    /// True for [Value::Null]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Rounds a float value to `ndigits` decimals, other values are unchanged
    pub fn rounded(&self, ndigits: usize) -> String {
        match self {
            Value::Float(f) => format!("{:.*}", ndigits, f),
            v => v.to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Str(_) => 1,
            Value::Int32(_) => 2,
            Value::Int16(_) => 3,
            Value::Float(_) => 4,
        }
    }
}

/// True if the cell must be read as null
pub fn is_null_token(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw)
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        v.map_or(Value::Null, Value::Str)
    }
}

impl From<Option<i32>> for Value {
    fn from(v: Option<i32>) -> Self {
        v.map_or(Value::Null, Value::Int32)
    }
}

impl From<Option<i16>> for Value {
    fn from(v: Option<i16>) -> Self {
        v.map_or(Value::Null, Value::Int16)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Value::Null, Value::Float)
    }
}

// Floats are compared by their total order so that rows can be sorted and hashed.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
            (Value::Int16(a), Value::Int16(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Str(s) => s.hash(state),
            Value::Int32(i) => i.hash(state),
            Value::Int16(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Str(s) => write!(f, "{}", s),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int16(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

/// A parsed row, or the first cell of the row that could not be coerced
pub type RawRow = Result<Vec<Value>, CellError>;

/// A table parsed according to its canonical schema, before any validation
#[derive(Debug, Clone)]
pub struct RawTable {
    /// The parsed table
    pub table: TableName,
    /// Cleaned headers, as found in the file
    pub headers: Vec<String>,
    /// Canonical columns found in the file; the values of each row are in the same order
    pub columns: Vec<&'static Column>,
    /// The rows in file order
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no data row
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column)
    }

    /// Read access to the values of one row
    pub fn view<'a>(&'a self, values: &'a [Value]) -> RowView<'a> {
        RowView {
            table: self,
            values,
        }
    }
}

/// Read access by column name to the values of a row
pub struct RowView<'a> {
    table: &'a RawTable,
    values: &'a [Value],
}

impl<'a> RowView<'a> {
    /// Value of the column, [Value::Null] if the column is not in the file
    pub fn get(&self, column: &str) -> &'a Value {
        self.table
            .position(column)
            .and_then(|i| self.values.get(i))
            .unwrap_or(&NULL)
    }
}

/// Parses the table files of a feed into [RawTable]
///
/// The parser holds no state, the tables can be parsed independently from each other.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableParser;

impl TableParser {
    /// Parses a table file
    ///
    /// Returns None if the table must be considered absent: the file is empty or only has a header.
    pub fn parse_file(&self, table: TableName, path: &Path) -> Option<Result<RawTable, Error>> {
        let file_name = table.file_name();
        let size = match std::fs::metadata(path) {
            Ok(m) => m.len(),
            Err(e) => {
                return Some(Err(Error::NamedFileIO {
                    file_name,
                    source: Box::new(e),
                }))
            }
        };
        if size == 0 {
            debug!("{} is empty, the table is absent", file_name);
            return None;
        }
        File::open(path)
            .map_err(|e| Error::NamedFileIO {
                file_name,
                source: Box::new(e),
            })
            .and_then(|f| self.parse_reader(table, f))
            .transpose()
    }

    /// Parses a table from any reader
    ///
    /// Structural problems (invalid csv, rows longer than the header, duplicated columns) make
    /// the whole table fail. A cell that does not fit the type of its column only fails its row.
    pub fn parse_reader<R: Read>(
        &self,
        table: TableName,
        reader: R,
    ) -> Result<Option<RawTable>, Error> {
        let mut reader = BufReader::new(reader);
        if reader.fill_buf()?.starts_with(BOM) {
            reader.consume(BOM.len());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let headers = clean_column_names(
            reader
                .headers()
                .map_err(|e| decode_error(table, e.to_string(), None))?
                .iter(),
        );

        let mut seen = FxHashSet::default();
        if let Some(duplicate) = headers.iter().find(|h| !seen.insert(h.as_str())) {
            return Err(decode_error(
                table,
                format!("column '{}' appears twice", duplicate),
                None,
            ));
        }

        let schema = table.schema();
        let mut positions = Vec::new();
        for (i, header) in headers.iter().enumerate() {
            match schema.columns.iter().find(|c| c.name == header.as_str()) {
                Some(column) => positions.push((i, column)),
                None => debug!("column '{}' of {} is not part of the schema", header, table),
            }
        }

        let mut rec = csv::StringRecord::new();
        let mut rows = Vec::new();
        while reader
            .read_record(&mut rec)
            .map_err(|e| decode_error(table, e.to_string(), None))?
        {
            if rec.len() > headers.len() {
                return Err(decode_error(
                    table,
                    format!("expected {} fields, found {}", headers.len(), rec.len()),
                    Some(LineError {
                        headers: headers.clone(),
                        values: rec.iter().map(String::from).collect(),
                    }),
                ));
            }
            let row: RawRow = positions
                .iter()
                .map(|(i, column)| {
                    let raw = rec.get(*i).unwrap_or("");
                    Value::parse(raw, column.column_type).ok_or_else(|| CellError {
                        column: column.name,
                        value: raw.to_owned(),
                        expected: column.column_type,
                    })
                })
                .collect();
            rows.push(row);
        }

        if rows.is_empty() {
            debug!("{} has no data row, the table is absent", table);
            return Ok(None);
        }
        Ok(Some(RawTable {
            table,
            headers,
            columns: positions.into_iter().map(|(_, c)| c).collect(),
            rows,
        }))
    }
}

fn decode_error(table: TableName, reason: String, line_in_error: Option<LineError>) -> Error {
    Error::TableDecode {
        table,
        reason,
        line_in_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(table: TableName, content: &str) -> Result<Option<RawTable>, Error> {
        TableParser.parse_reader(table, content.as_bytes())
    }

    #[rstest]
    #[case("")]
    #[case(" ")]
    #[case("nan")]
    #[case("NaN")]
    #[case("null")]
    fn null_tokens_are_null_in_every_column(#[case] token: &str) {
        for column_type in [
            ColumnType::Str,
            ColumnType::Int32,
            ColumnType::Int16,
            ColumnType::Float,
        ] {
            assert_eq!(Some(Value::Null), Value::parse(token, column_type));
        }
    }

    #[test]
    fn other_texts_are_not_null() {
        assert_eq!(
            Some(Value::Str("NULL".to_owned())),
            Value::parse("NULL", ColumnType::Str)
        );
        assert_eq!(Some(Value::Int32(7)), Value::parse(" 7", ColumnType::Int32));
        assert_eq!(None, Value::parse("NAN", ColumnType::Float));
        assert_eq!(None, Value::parse("inf", ColumnType::Float));
        assert_eq!(None, Value::parse("40000", ColumnType::Int16));
    }

    #[test]
    fn strips_bom_and_cleans_headers() {
        let table = parse(
            TableName::Calendar,
            "\u{feff} service_id ,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
             s1,1,1,1,1,1,0,0,20240101,20241231\n",
        )
        .unwrap()
        .unwrap();
        assert_eq!("service_id", table.headers[0]);
        let values = table.rows[0].as_ref().unwrap();
        let row = table.view(values);
        assert_eq!(&Value::Str("s1".to_owned()), row.get("service_id"));
        assert_eq!(&Value::Int32(1), row.get("monday"));
        assert_eq!(&Value::Int32(0), row.get("sunday"));
    }

    #[test]
    fn missing_integer_stays_integer() {
        let table = parse(
            TableName::Transfers,
            "from_stop_id,to_stop_id,transfer_type,min_transfer_time\na,b,2,\na,c,2,120\n",
        )
        .unwrap()
        .unwrap();
        let first = table.rows[0].as_ref().unwrap();
        let second = table.rows[1].as_ref().unwrap();
        assert_eq!(&Value::Null, table.view(first).get("min_transfer_time"));
        assert_eq!(&Value::Int16(120), table.view(second).get("min_transfer_time"));
    }

    #[test]
    fn header_only_is_absent() {
        assert!(parse(TableName::Stops, "stop_id,stop_name\n").unwrap().is_none());
    }

    #[test]
    fn bad_cell_fails_only_its_row() {
        let table = parse(
            TableName::Calendar,
            "service_id,monday\ns1,yes\ns2,1\n",
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            Err(CellError {
                column: "monday",
                value: "yes".to_owned(),
                expected: ColumnType::Int32
            }),
            table.rows[0]
        );
        assert!(table.rows[1].is_ok());
    }

    #[test]
    fn long_rows_fail_the_table() {
        let res = parse(TableName::OfficeJp, "office_id,office_name\no1,a,extra\n");
        assert!(matches!(res, Err(Error::TableDecode { table: TableName::OfficeJp, .. })));
    }

    #[test]
    fn duplicated_columns_fail_the_table() {
        let res = parse(TableName::OfficeJp, "office_id, office_id\no1,o2\n");
        assert!(matches!(res, Err(Error::TableDecode { .. })));
    }

    #[test]
    fn unknown_columns_are_dropped() {
        let table = parse(TableName::OfficeJp, "office_id,color,office_name\no1,red,Main\n")
            .unwrap()
            .unwrap();
        assert_eq!(2, table.columns.len());
        let values = table.rows[0].as_ref().unwrap();
        assert_eq!(&Value::Str("Main".to_owned()), table.view(values).get("office_name"));
        assert_eq!(&Value::Null, table.view(values).get("color"));
    }
}
