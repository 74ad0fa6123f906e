//! Load functions - push the intermediate files into the remote tables in batches

use crate::error::Result;
use crate::ingestion::parse::{read_foods, read_nutrients, read_portions};
use crate::ingestion::sink::TableSink;
use crate::ingestion::types::{LoadStats, Table, TableRow};
use crate::ingestion::utils::batches;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Insert rows into their table, one call per contiguous batch
/// The first failed batch aborts; earlier batches stay inserted
pub async fn load_table<R: TableRow>(
    sink: &dyn TableSink,
    rows: &[R],
    batch_size: usize,
) -> Result<LoadStats> {
    let table = R::TABLE;
    let total = batches(rows, batch_size).len();
    let mut stats = LoadStats::default();

    for (idx, batch) in batches(rows, batch_size).enumerate() {
        info!("{}: batch {}/{} ({} rows)", table, idx + 1, total, batch.len());

        let values = batch
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<Value>, _>>()?;

        sink.insert_batch(table, &values).await?;

        stats.batches += 1;
        stats.rows += batch.len();
    }

    info!("{} loaded: {}", table, stats);

    Ok(stats)
}

/// Load food, then portions, then nutrients from `dir`
/// Each file is read only when its turn comes
pub async fn load_all(sink: &dyn TableSink, dir: &Path, batch_size: usize) -> Result<LoadStats> {
    let mut stats = LoadStats::default();

    for table in Table::ALL {
        let path = dir.join(table.file_name());
        info!("Importing {} from {:?}...", table, path);

        let table_stats = match table {
            Table::Food => load_table(sink, &read_foods(&path)?, batch_size).await?,
            Table::Portions => load_table(sink, &read_portions(&path)?, batch_size).await?,
            Table::Nutrients => load_table(sink, &read_nutrients(&path)?, batch_size).await?,
        };

        stats += table_stats;
    }

    info!("Load complete: {}", stats);

    Ok(stats)
}
