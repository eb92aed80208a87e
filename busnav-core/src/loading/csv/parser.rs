use std::fs::File;
use std::path::Path;

use log::warn;

use crate::Error;

/// Reads every row of a headed CSV file, skipping (and logging) rows that
/// do not deserialize into `T`
pub fn deserialize_csv_file<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(Error::Csv(e)),
            Err(e) => {
                skipped += 1;
                log::trace!("Skipping row in {}: {e}", path.display());
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} malformed rows in {}", path.display());
    }
    Ok(rows)
}
