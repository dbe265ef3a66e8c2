//! Typed access to the columns of a parsed row, used to build the records
use crate::error::{FieldError, Issue};
use crate::serde_helpers::{parse_date, parse_time};
use crate::table_parser::{RowView, Value};
use chrono::NaiveDate;

pub(crate) fn text(row: &RowView, column: &'static str) -> Option<String> {
    match row.get(column) {
        Value::Str(s) => Some(s.clone()),
        _ => None,
    }
}

pub(crate) fn required_text(row: &RowView, column: &'static str) -> Result<String, FieldError> {
    text(row, column).ok_or_else(|| FieldError::missing(column))
}

pub(crate) fn text_or(row: &RowView, column: &'static str, default: &str) -> String {
    text(row, column).unwrap_or_else(|| default.to_owned())
}

pub(crate) fn int32(row: &RowView, column: &'static str) -> Option<i32> {
    match row.get(column) {
        Value::Int32(i) => Some(*i),
        _ => None,
    }
}

pub(crate) fn required_int32(row: &RowView, column: &'static str) -> Result<i32, FieldError> {
    int32(row, column).ok_or_else(|| FieldError::missing(column))
}

pub(crate) fn int16(row: &RowView, column: &'static str) -> Option<i16> {
    match row.get(column) {
        Value::Int16(i) => Some(*i),
        _ => None,
    }
}

pub(crate) fn required_int16(row: &RowView, column: &'static str) -> Result<i16, FieldError> {
    int16(row, column).ok_or_else(|| FieldError::missing(column))
}

pub(crate) fn float(row: &RowView, column: &'static str) -> Option<f64> {
    match row.get(column) {
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

pub(crate) fn required_float(row: &RowView, column: &'static str) -> Result<f64, FieldError> {
    float(row, column).ok_or_else(|| FieldError::missing(column))
}

/// A 0/1 flag such as the days of a calendar
pub(crate) fn required_flag(row: &RowView, column: &'static str) -> Result<i32, FieldError> {
    match required_int32(row, column)? {
        v @ (0 | 1) => Ok(v),
        v => Err(FieldError::invalid(
            column,
            Issue::InvalidValue {
                value: v.to_string(),
                expected: "0 or 1".to_owned(),
            },
        )),
    }
}

pub(crate) fn date(row: &RowView, column: &'static str) -> Result<Option<NaiveDate>, FieldError> {
    text(row, column)
        .map(|s| parse_date(&s).map_err(|issue| FieldError::invalid(column, issue)))
        .transpose()
}

pub(crate) fn required_date(row: &RowView, column: &'static str) -> Result<NaiveDate, FieldError> {
    date(row, column)?.ok_or_else(|| FieldError::missing(column))
}

pub(crate) fn time(row: &RowView, column: &'static str) -> Result<Option<u32>, FieldError> {
    text(row, column)
        .map(|s| parse_time(&s).map_err(|issue| FieldError::invalid(column, issue)))
        .transpose()
}

pub(crate) fn required_time(row: &RowView, column: &'static str) -> Result<u32, FieldError> {
    time(row, column)?.ok_or_else(|| FieldError::missing(column))
}
