//! Line-delimited JSON event tables with random row access.
//!
//! A table is indexed once by line offsets; afterwards any row can be fetched
//! by number without holding the file in memory. [`TableChain`] concatenates
//! several tables into one logical row space.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use hs_core::{Error, Result};

/// Row-addressable storage of raw JSON lines.
pub trait Table: Send {
    /// Number of rows.
    fn len(&self) -> usize;

    /// Whether the table has no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw text of row `index`.
    fn line(&mut self, index: usize) -> Result<String>;
}

/// An NDJSON file on disk. Blank lines are not rows.
#[derive(Debug)]
pub struct JsonlTable {
    path: PathBuf,
    reader: BufReader<File>,
    /// `(byte offset, byte length)` of every row, newline excluded.
    spans: Vec<(u64, usize)>,
}

impl JsonlTable {
    /// Open `path` and index its rows.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::Config(format!("opening table {}: {e}", path.display())))?;
        let mut reader = BufReader::new(file);

        let mut spans = Vec::new();
        let mut offset = 0u64;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                break;
            }
            let body = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
            let body = body.strip_suffix(b"\r").unwrap_or(body);
            if !body.iter().all(u8::is_ascii_whitespace) {
                spans.push((offset, body.len()));
            }
            offset += n as u64;
        }
        tracing::debug!(path = %path.display(), rows = spans.len(), "indexed table");
        Ok(Self { path: path.to_path_buf(), reader, spans })
    }

    /// Path the table was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Table for JsonlTable {
    fn len(&self) -> usize {
        self.spans.len()
    }

    fn line(&mut self, index: usize) -> Result<String> {
        let &(offset, len) = self.spans.get(index).ok_or_else(|| out_of_range(index, self.len()))?;
        self.reader.seek(SeekFrom::Start(offset))?;
        let mut bytes = vec![0u8; len];
        self.reader.read_exact(&mut bytes)?;
        String::from_utf8(bytes).map_err(|e| Error::FieldRead {
            row: index,
            field: "row".into(),
            reason: format!("{} in {}", e.utf8_error(), self.path.display()),
        })
    }
}

/// Rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    lines: Vec<String>,
}

impl MemoryTable {
    /// Table from pre-serialized JSON lines.
    pub fn from_lines(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { lines: lines.into_iter().map(Into::into).collect() }
    }

    /// Append a row by serializing `row`.
    pub fn push<T: serde::Serialize>(&mut self, row: &T) -> Result<()> {
        self.lines.push(serde_json::to_string(row)?);
        Ok(())
    }
}

impl Table for MemoryTable {
    fn len(&self) -> usize {
        self.lines.len()
    }

    fn line(&mut self, index: usize) -> Result<String> {
        self.lines.get(index).cloned().ok_or_else(|| out_of_range(index, self.lines.len()))
    }
}

fn out_of_range(index: usize, len: usize) -> Error {
    Error::Config(format!("row {index} out of range ({len} rows)"))
}

/// Several tables read as one, rows numbered consecutively.
pub struct TableChain {
    tables: Vec<Box<dyn Table>>,
    /// `cum_len[i]` = rows in tables `0..i`; length `tables.len() + 1`.
    cum_len: Vec<usize>,
}

impl TableChain {
    /// Chain already-open tables in order.
    pub fn new(tables: Vec<Box<dyn Table>>) -> Self {
        let mut cum_len = Vec::with_capacity(tables.len() + 1);
        cum_len.push(0);
        let mut total = 0;
        for t in &tables {
            total += t.len();
            cum_len.push(total);
        }
        Self { tables, cum_len }
    }

    /// Open and chain NDJSON files. Every path must exist.
    pub fn open(paths: &[PathBuf]) -> Result<Self> {
        let tables = paths
            .iter()
            .map(|p| JsonlTable::open(p).map(|t| Box::new(t) as Box<dyn Table>))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(tables))
    }

    /// Total rows across all tables.
    pub fn len(&self) -> usize {
        self.cum_len.last().copied().unwrap_or(0)
    }

    /// Whether the chain has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of chained tables.
    pub fn n_tables(&self) -> usize {
        self.tables.len()
    }

    /// `(table, local row)` of global row `index`.
    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.len() {
            return None;
        }
        // Last table whose start is <= index; empty tables share a start.
        let t = self.cum_len.partition_point(|&start| start <= index) - 1;
        Some((t, index - self.cum_len[t]))
    }

    /// Raw text of global row `index`.
    pub fn line(&mut self, index: usize) -> Result<String> {
        let (t, local) = self.locate(index).ok_or_else(|| out_of_range(index, self.len()))?;
        self.tables[t].line(local)
    }
}

impl std::fmt::Debug for TableChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableChain")
            .field("tables", &self.tables.len())
            .field("rows", &self.len())
            .finish()
    }
}
