//! Row decoding helpers and path normalization shared by the query modules.

use std::{
    path::{Component, Path, PathBuf},
    str::FromStr,
};

use jiff::Timestamp;
use rusqlite::{types::Type, Row};
use serde::de::DeserializeOwned;

use crate::error::{PipelineError, Result};

/// Reads a TEXT column holding an RFC 3339 timestamp.
pub(crate) fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(idx)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads a nullable TEXT column holding an RFC 3339 timestamp.
pub(crate) fn optional_timestamp_column(
    row: &Row,
    idx: usize,
) -> rusqlite::Result<Option<Timestamp>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| {
            s.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

/// Reads a TEXT column holding one of the status enumerations.
pub(crate) fn enum_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// Reads a TEXT column holding a JSON document.
pub(crate) fn json_column<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads an INTEGER id column.
pub(crate) fn id_column(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(idx)? as u64)
}

/// Normalizes a suite file path so that `./tests/a.spec.ts` and
/// `tests/x/../a.spec.ts` address the same registered file.
///
/// Only "." and ".." components are resolved; the path does not need to
/// exist. Separators are always written as `/`.
pub(crate) fn normalize_file_path(file_path: &str) -> Result<String> {
    let trimmed = file_path.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::invalid_input("file_path").with_reason("must not be empty"));
    }

    let normalized = Path::new(trimmed)
        .components()
        .fold(PathBuf::new(), |mut acc, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    acc.pop();
                }
                other => acc.push(other),
            }
            acc
        });

    let parts: Vec<String> = normalized
        .components()
        .map(|c| match c {
            Component::RootDir => String::new(),
            other => other.as_os_str().to_string_lossy().into_owned(),
        })
        .collect();

    // A leading RootDir maps to "" so the join keeps the leading slash
    let joined = parts.join("/");
    if joined.is_empty() || joined == "/" {
        return Err(PipelineError::invalid_input("file_path")
            .with_reason(format!("'{file_path}' does not name a file")));
    }
    Ok(joined)
}

/// Last component of a file path, used as the default display name.
pub(crate) fn file_name_of(file_path: &str) -> String {
    file_path
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(file_path)
        .to_string()
}
