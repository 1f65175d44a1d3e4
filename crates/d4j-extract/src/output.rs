//! JSON / JSONL serialization of record sequences.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::errors::ExtractorResult;

/// Write a record sequence as a pretty JSON array or as one record per line,
/// to `out` when given and to stdout otherwise.
pub fn write_records<T: Serialize>(
    records: &[T],
    out: Option<&Path>,
    jsonl: bool,
) -> ExtractorResult<()> {
    match out {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            emit(records, &mut writer, jsonl)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            emit(records, &mut stdout.lock(), jsonl)?;
        }
    }
    Ok(())
}

/// Write one per-bug diff artifact as a pretty JSON array.
pub fn write_artifact<T: Serialize>(path: &Path, records: &[T]) -> ExtractorResult<()> {
    write_records(records, Some(path), false)
}

fn emit<T: Serialize, W: Write>(records: &[T], writer: &mut W, jsonl: bool) -> ExtractorResult<()> {
    if jsonl {
        for record in records {
            serde_json::to_writer(&mut *writer, record)?;
            writer.write_all(b"\n")?;
        }
    } else {
        serde_json::to_writer_pretty(&mut *writer, &records)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
