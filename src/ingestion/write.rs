//! Write functions - persist flattened rows to the intermediate CSV files

use crate::error::Result;
use crate::ingestion::types::{FlattenedFoods, Table, TableRow};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write rows to a CSV file
/// The header is always written, even when there are no rows
pub fn write_rows<R: TableRow>(path: &Path, rows: &[R]) -> Result<()> {
    info!("Writing {} rows to {:?}", rows.len(), path);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(R::TABLE.columns())?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the three intermediate files into `dir`
pub fn write_all(dir: &Path, data: &FlattenedFoods) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let food_path = dir.join(Table::Food.file_name());
    let portions_path = dir.join(Table::Portions.file_name());
    let nutrients_path = dir.join(Table::Nutrients.file_name());

    write_rows(&food_path, &data.foods)?;
    write_rows(&portions_path, &data.portions)?;
    write_rows(&nutrients_path, &data.nutrients)?;

    Ok(vec![food_path, portions_path, nutrients_path])
}
