//! CSV file storage.
//!
//! Reads a table from a source file and writes it to a destination file,
//! which may be the same path. Writes go through a temporary file in the
//! destination directory and are renamed into place, so a failed write never
//! leaves a truncated table behind.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::table::{Cell, Table};
use crate::error::{StoreError, StoreResult};
use crate::traits::store::RowStore;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV-backed row store.
#[derive(Debug, Clone)]
pub struct CsvStore {
    source: PathBuf,
    destination: PathBuf,
}

impl CsvStore {
    /// Read from `source`, write to `destination`.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Read and write the same file.
    pub fn in_place(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(path.clone(), path)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    fn destination_dir(&self) -> &Path {
        match self.destination.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn unwritable(&self, source: io::Error) -> StoreError {
        StoreError::Unwritable {
            path: self.destination.clone(),
            source,
        }
    }
}

/// Decode file bytes: BOM stripped, UTF-8 with a Latin-1 fallback.
pub fn decode_text(bytes: &[u8], path: &Path) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Table is not valid UTF-8, decoding as Latin-1"
            );
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Parse CSV text into a table. Short rows are padded with nulls.
pub fn parse_csv(text: &str) -> StoreResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record?;
        if record.len() > table.columns().len() {
            warn!(
                line = record.position().map(|p| p.line()),
                cells = record.len(),
                columns = table.columns().len(),
                "Row is wider than the header, extra cells dropped"
            );
        }
        table.push_row(record.iter().map(Cell::parse).collect());
    }

    Ok(table)
}

/// Render a table as UTF-8 CSV with a leading BOM.
pub fn render_csv(table: &Table) -> StoreResult<Vec<u8>> {
    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(Cell::render))?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

impl RowStore for CsvStore {
    fn load(&self) -> StoreResult<Table> {
        let bytes = fs::read(&self.source).map_err(|source| StoreError::Unreadable {
            path: self.source.clone(),
            source,
        })?;

        let table = parse_csv(&decode_text(&bytes, &self.source))?;
        info!(
            path = %self.source.display(),
            rows = table.len(),
            columns = table.columns().len(),
            "Loaded table"
        );
        Ok(table)
    }

    fn probe_writable(&self) -> StoreResult<()> {
        if !self.destination.exists() {
            // Nothing to lock yet; the directory must accept new files.
            NamedTempFile::new_in(self.destination_dir()).map_err(|e| self.unwritable(e))?;
            return Ok(());
        }

        let file: File = OpenOptions::new()
            .append(true)
            .open(&self.destination)
            .map_err(|e| self.unwritable(e))?;

        // Lock released when `file` is dropped.
        FileExt::try_lock_exclusive(&file).map_err(|source| StoreError::Locked {
            path: self.destination.clone(),
            source,
        })?;

        Ok(())
    }

    fn persist(&self, table: &Table) -> StoreResult<()> {
        self.probe_writable()?;

        let bytes = render_csv(table)?;
        let mut tmp = NamedTempFile::new_in(self.destination_dir()).map_err(|e| self.unwritable(e))?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.destination)
            .map_err(|e| self.unwritable(e.error))?;

        debug!(
            path = %self.destination.display(),
            rows = table.len(),
            "Persisted table"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.destination.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fields::{FieldKey, FieldValue};
    use crate::types::result::ExtractionResult;
    use tempfile::TempDir;

    const KEY: &str = "Article URL";

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_load_strips_bom_and_pads_rows() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "in.csv",
            b"\xEF\xBB\xBFArticle URL,Title,number_of_lists\nhttps://a.test,Big Day,4\nhttps://b.test\n",
        );

        let table = CsvStore::in_place(&path).load().unwrap();

        assert_eq!(table.columns(), &[KEY, "Title", "number_of_lists"]);
        assert_eq!(table.cell(0, "number_of_lists"), Some(&Cell::Integer(4)));
        assert_eq!(table.cell(1, "Title"), Some(&Cell::Null));
        assert_eq!(table.cell(1, "number_of_lists"), Some(&Cell::Null));
    }

    #[test]
    fn test_load_latin1_fallback() {
        let dir = TempDir::new().unwrap();
        // "Grünfink" with ü encoded as a single Latin-1 byte.
        let path = write(&dir, "in.csv", b"Article URL,Bird\nhttps://a.test,Gr\xFCnfink\n");

        let table = CsvStore::in_place(&path).load().unwrap();
        assert_eq!(table.cell(0, "Bird"), Some(&Cell::Text("Grünfink".into())));
    }

    #[test]
    fn test_load_missing_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::in_place(dir.path().join("absent.csv"));
        assert!(matches!(store.load(), Err(StoreError::Unreadable { .. })));
    }

    #[test]
    fn test_persist_writes_bom_and_preserves_unicode() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "in.csv", b"Article URL,Notes\nhttps://a.test,\"a, b\"\n");
        let destination = dir.path().join("out.csv");
        let store = CsvStore::new(&source, &destination);

        let mut table = store.load().unwrap();
        table.ensure_columns(FieldKey::columns());
        let result = ExtractionResult::all_missing().with(
            FieldKey::BirdSpeciesMentioned,
            FieldValue::List(vec!["Grünfink".into()]),
        );
        table.merge(KEY, "https://a.test", &result).unwrap();
        store.persist(&table).unwrap();

        let bytes = fs::read(&destination).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("Article URL,Notes,number_of_birders,"));
        assert!(text.contains("\"a, b\""));
        assert!(text.contains(r#""[""Grünfink""]""#));

        // Source untouched, destination reloads to the same table.
        assert_eq!(fs::read(&source).unwrap(), b"Article URL,Notes\nhttps://a.test,\"a, b\"\n");
        let reloaded = CsvStore::in_place(&destination).load().unwrap();
        assert_eq!(reloaded.columns(), table.columns());
        assert_eq!(
            reloaded.cell(0, "bird_species_mentioned"),
            table.cell(0, "bird_species_mentioned")
        );
    }

    #[test]
    fn test_probe_detects_lock_and_persist_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "table.csv", b"Article URL\nhttps://a.test\n");
        let store = CsvStore::in_place(&path);
        store.probe_writable().unwrap();

        let holder = File::open(&path).unwrap();
        FileExt::lock_exclusive(&holder).unwrap();

        assert!(matches!(
            store.probe_writable(),
            Err(StoreError::Locked { .. })
        ));
        let table = store.load().unwrap();
        assert!(matches!(store.persist(&table), Err(StoreError::Locked { .. })));
        assert_eq!(fs::read(&path).unwrap(), b"Article URL\nhttps://a.test\n");

        drop(holder);
        store.probe_writable().unwrap();
    }

    #[test]
    fn test_probe_new_destination_checks_directory() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path().join("in.csv"), dir.path().join("new.csv"));
        store.probe_writable().unwrap();
        assert!(!dir.path().join("new.csv").exists());

        let store = CsvStore::new("in.csv", dir.path().join("missing-dir").join("out.csv"));
        assert!(matches!(
            store.probe_writable(),
            Err(StoreError::Unwritable { .. })
        ));
    }
}
