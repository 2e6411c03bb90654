//! Delimited-text table IO.
//!
//! Every table is read with schema inference disabled: all columns arrive as
//! `String` and the stages that need numbers parse them explicitly. Writes go
//! to a sibling temporary file first and are renamed into place, so a
//! half-written artifact is never mistaken for a finished one.

use crate::error::{DataError, Result};
use polars::prelude::*;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Default field separator of the claim extracts.
pub const DEFAULT_SEPARATOR: u8 = b';';

/// Convert a user supplied separator into the single byte polars expects.
pub fn separator_byte(separator: char) -> Result<u8> {
    u8::try_from(separator)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(DataError::InvalidSeparator(separator))
}

/// Read a delimited-text table with every column typed as `String`.
///
/// # Arguments
/// * `path` - File to read
/// * `separator` - Field separator
/// * `n_threads` - Cap on the reader's internal threads (`None` lets polars decide)
pub fn read_table(path: &Path, separator: u8, n_threads: Option<usize>) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_n_threads(n_threads)
        .map_parse_options(|opts| {
            opts.with_separator(separator)
                .with_encoding(CsvEncoding::LossyUtf8)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Write a table atomically, creating parent directories as needed.
pub fn write_table(df: &mut DataFrame, path: &Path, separator: u8) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_sibling(path);
    let mut file = File::create(&tmp_path)?;
    let written = CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator)
        .finish(df);

    if let Err(source) = written {
        drop(file);
        let _ = fs::remove_file(&tmp_path);
        return Err(DataError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    file.sync_all()?;
    drop(file);
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    #[case(';', b';')]
    #[case(',', b',')]
    #[case('\t', b'\t')]
    #[case('|', b'|')]
    fn test_separator_byte(#[case] input: char, #[case] expected: u8) {
        assert_eq!(separator_byte(input).unwrap(), expected);
    }

    #[test]
    fn test_separator_rejects_non_ascii() {
        assert!(matches!(
            separator_byte('§'),
            Err(DataError::InvalidSeparator('§'))
        ));
    }

    #[test]
    fn test_temp_sibling() {
        let tmp = temp_sibling(Path::new("out/final_data.csv"));
        assert_eq!(tmp, PathBuf::from("out/final_data.csv.tmp"));
    }

    #[test]
    fn test_read_keeps_values_as_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("claims.csv");
        fs::write(&path, "D_OCORR;INDENIZ;REGIAO\n20200115;100.5;35\n20200116;;SP\n").unwrap();

        let df = read_table(&path, b';', Some(1)).unwrap();
        assert_eq!(df.height(), 2);
        for column in df.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }

        let dates = df.column("D_OCORR").unwrap().str().unwrap();
        assert_eq!(dates.get(0), Some("20200115"));
        let amounts = df.column("INDENIZ").unwrap().str().unwrap();
        assert_eq!(amounts.get(1), None);
    }

    #[test]
    fn test_read_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let err = read_table(&dir.path().join("absent.csv"), b';', None).unwrap_err();
        assert!(matches!(err, DataError::Read { .. }));
    }

    #[test]
    fn test_write_creates_parents_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let mut df = DataFrame::new(vec![
            Series::new("a".into(), vec!["x", "y"]).into(),
            Series::new("b".into(), vec![1.5, 2.0]).into(),
        ])
        .unwrap();

        write_table(&mut df, &path, b';').unwrap();

        assert!(path.exists());
        assert!(!temp_sibling(&path).exists());
        let reread = read_table(&path, b';', None).unwrap();
        assert_eq!(reread.height(), 2);
        assert_eq!(reread.get_column_names().len(), 2);
    }
}
