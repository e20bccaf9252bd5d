//! Binary policy snapshot.
//!
//! Layout, all integers and floats little-endian:
//!
//! ```text
//! u64 entry_count
//! entry_count times:
//!     u64  key_length
//!     [u8] key            (board encoding, ASCII digits)
//!     f64  values[9]      (index i => cell x = i % 3, y = i / 3)
//! ```
//!
//! There is no header or checksum, so every length is checked against the
//! bytes actually left before anything is read.

use std::{
    collections::HashMap,
    fs,
    io::{BufWriter, Cursor, Read, Write},
    path::Path,
};

use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use tempfile::NamedTempFile;

use crate::{
    Error, Result,
    q_learning::q_table::{ActionValues, QTable},
    tictactoe::BOARD_CELLS,
};

const WORD: u64 = size_of::<u64>() as u64;
const ROW_BYTES: u64 = (BOARD_CELLS * size_of::<f64>()) as u64;

/// Write every row of `table`, ordered by key
pub fn write_snapshot<W: Write>(writer: &mut W, table: &QTable) -> std::io::Result<()> {
    writer.write_u64::<LE>(table.len() as u64)?;
    for (key, row) in table.sorted_entries() {
        writer.write_u64::<LE>(key.len() as u64)?;
        writer.write_all(key.as_bytes())?;
        for &value in row {
            writer.write_f64::<LE>(value)?;
        }
    }
    Ok(())
}

/// Parse a complete snapshot held in memory.
///
/// # Errors
///
/// Returns [`Error::MalformedSnapshot`] when a declared length runs past the
/// end of the buffer, a key is not UTF-8 or repeats, a value is not finite,
/// or bytes remain after the last entry.
pub fn read_snapshot(bytes: &[u8]) -> Result<HashMap<String, ActionValues>> {
    let total = bytes.len() as u64;
    let mut cursor = Cursor::new(bytes);
    let remaining = |cursor: &Cursor<&[u8]>| total - cursor.position();

    if remaining(&cursor) < WORD {
        return Err(Error::malformed(0, "truncated entry count"));
    }
    let count = read_u64(&mut cursor)?;

    // Every entry takes at least a length word and nine values
    let min_entry = WORD + ROW_BYTES;
    if count > remaining(&cursor) / min_entry {
        return Err(Error::malformed(
            cursor.position(),
            format!(
                "declares {count} entries but only {} bytes remain",
                remaining(&cursor)
            ),
        ));
    }

    let mut entries = HashMap::with_capacity(count as usize);
    for index in 0..count {
        let offset = cursor.position();
        if remaining(&cursor) < WORD {
            return Err(Error::malformed(
                offset,
                format!("truncated key length for entry {index}"),
            ));
        }
        let key_len = read_u64(&mut cursor)?;
        if key_len > remaining(&cursor) {
            return Err(Error::malformed(
                cursor.position(),
                format!(
                    "key length {key_len} exceeds remaining {} bytes",
                    remaining(&cursor)
                ),
            ));
        }

        let key_offset = cursor.position();
        let mut key = vec![0u8; key_len as usize];
        cursor
            .read_exact(&mut key)
            .map_err(|e| Error::malformed(key_offset, e.to_string()))?;
        let key = String::from_utf8(key)
            .map_err(|_| Error::malformed(key_offset, "key is not valid UTF-8"))?;

        if remaining(&cursor) < ROW_BYTES {
            return Err(Error::malformed(
                cursor.position(),
                format!(
                    "fewer than {BOARD_CELLS} values for key '{key}': {} bytes remain",
                    remaining(&cursor)
                ),
            ));
        }
        let mut row = [0.0; BOARD_CELLS];
        for slot in row.iter_mut() {
            let value_offset = cursor.position();
            let value = cursor
                .read_f64::<LE>()
                .map_err(|e| Error::malformed(value_offset, e.to_string()))?;
            if !value.is_finite() {
                return Err(Error::malformed(
                    value_offset,
                    format!("non-finite value {value} for key '{key}'"),
                ));
            }
            *slot = value;
        }

        if entries.insert(key, row).is_some() {
            return Err(Error::malformed(key_offset, "duplicate key"));
        }
    }

    let trailing = remaining(&cursor);
    if trailing > 0 {
        return Err(Error::malformed(
            cursor.position(),
            format!("{trailing} trailing bytes after {count} entries"),
        ));
    }
    Ok(entries)
}

fn read_u64(cursor: &mut Cursor<&[u8]>) -> Result<u64> {
    let offset = cursor.position();
    cursor
        .read_u64::<LE>()
        .map_err(|e| Error::malformed(offset, e.to_string()))
}

/// Write `table` to `path`, replacing any existing file in one rename.
///
/// The snapshot is written to a temporary file beside `path` first, so a
/// failure leaves the previous file untouched.
pub fn save_snapshot(path: impl AsRef<Path>, table: &QTable) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| Error::io("create temporary file in", dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write_snapshot(&mut writer, table).map_err(|e| Error::io("write", path, e))?;
        writer.flush().map_err(|e| Error::io("write", path, e))?;
    }
    tmp.persist(path)
        .map_err(|e| Error::io("replace", path, e.error))?;

    log::info!("saved {} policy entries to {}", table.len(), path.display());
    Ok(())
}

/// Read and validate the snapshot at `path`
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<HashMap<String, ActionValues>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::io("read", path, e))?;
    let entries = read_snapshot(&bytes)?;
    log::info!("loaded {} policy entries from {}", entries.len(), path.display());
    Ok(entries)
}
