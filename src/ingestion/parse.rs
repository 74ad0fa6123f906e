//! Parse functions - flatten FDC records into rows, read rows back from CSV

use crate::error::{IngestError, Result};
use crate::ingestion::types::{FlattenedFoods, FoodRecord, FoodRow, NutrientRow, PortionRow};
use crate::ingestion::utils::{measure_unit_text, or_zero, parse_decimal_or_zero, parse_int};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Flatten one food record into 1 food row plus its portion and nutrient rows
pub fn flatten_food(food: &FoodRecord, out: &mut FlattenedFoods) {
    let fdc_id = food.fdc_id;

    out.foods.push(FoodRow {
        fdc_id,
        description_en: food.description.clone().unwrap_or_default(),
        description_de: String::new(), // German translation filled in later, outside this pipeline
    });

    for portion in food.food_portions.iter().flatten() {
        out.portions.push(PortionRow {
            fdc_id,
            measure_unit_id: measure_unit_text(&portion.measure_unit),
            amount: or_zero(portion.amount),
            gram_weight: or_zero(portion.gram_weight),
        });
    }

    for nutrient in food.food_nutrients.iter().flatten() {
        out.nutrients.push(NutrientRow {
            fdc_id,
            nutrient_id: nutrient.nutrient_id.unwrap_or(0),
            amount: or_zero(nutrient.amount),
        });
    }
}

/// Flatten all fetched records, preserving input order
pub fn flatten_foods(foods: &[FoodRecord]) -> FlattenedFoods {
    let mut out = FlattenedFoods::default();
    for food in foods {
        flatten_food(food, &mut out);
    }

    info!(
        "Flattened {} foods into {} portions and {} nutrients",
        out.foods.len(),
        out.portions.len(),
        out.nutrients.len()
    );

    out
}

/// food_data.csv row as text
#[derive(Debug, Deserialize)]
struct FoodCsvRow {
    fdc_id: String,
    description_en: String,
    description_de: String,
}

/// portions_data.csv row as text
#[derive(Debug, Deserialize)]
struct PortionCsvRow {
    fdc_id: String,
    measure_unit_id: String,
    amount: String,
    gram_weight: String,
}

/// nutrients_data.csv row as text
#[derive(Debug, Deserialize)]
struct NutrientCsvRow {
    fdc_id: String,
    nutrient_id: String,
    amount: String,
}

/// Position of a CSV record, for error reporting
struct RowContext<'a> {
    file: &'a Path,
    line: u64,
}

impl RowContext<'_> {
    fn error(&self, field: &'static str, value: &str) -> IngestError {
        IngestError::Parse {
            file: self.file.to_path_buf(),
            line: self.line,
            field,
            value: value.to_string(),
        }
    }

    fn int(&self, field: &'static str, raw: &str) -> Result<i64> {
        parse_int(raw).ok_or_else(|| self.error(field, raw))
    }

    fn int_or_zero(&self, field: &'static str, raw: &str) -> Result<i64> {
        if raw.trim().is_empty() {
            return Ok(0);
        }
        self.int(field, raw)
    }

    fn decimal_or_zero(&self, field: &'static str, raw: &str) -> Result<Decimal> {
        parse_decimal_or_zero(raw).ok_or_else(|| self.error(field, raw))
    }
}

/// Read a CSV by header name and coerce each record
/// The first bad record aborts the read
fn read_csv<R, T, F>(path: &Path, coerce: F) -> Result<Vec<T>>
where
    R: for<'de> Deserialize<'de>,
    F: Fn(R, &RowContext) -> Result<T>,
{
    info!("Reading {:?}", path);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut record = csv::StringRecord::new();
    let mut rows = Vec::new();

    while reader.read_record(&mut record)? {
        let raw: R = record.deserialize(Some(&headers))?;
        let ctx = RowContext {
            file: path,
            // Quoted fields may span lines, so use where the record starts
            line: record.position().map(|pos| pos.line()).unwrap_or_default(),
        };
        rows.push(coerce(raw, &ctx)?);
    }

    info!("Read {} rows from {:?}", rows.len(), path);

    Ok(rows)
}

pub fn read_foods(path: &Path) -> Result<Vec<FoodRow>> {
    read_csv(path, |row: FoodCsvRow, ctx| {
        Ok(FoodRow {
            fdc_id: ctx.int("fdc_id", &row.fdc_id)?,
            description_en: row.description_en,
            description_de: row.description_de,
        })
    })
}

pub fn read_portions(path: &Path) -> Result<Vec<PortionRow>> {
    read_csv(path, |row: PortionCsvRow, ctx| {
        Ok(PortionRow {
            fdc_id: ctx.int("fdc_id", &row.fdc_id)?,
            measure_unit_id: row.measure_unit_id,
            amount: ctx.decimal_or_zero("amount", &row.amount)?,
            gram_weight: ctx.decimal_or_zero("gram_weight", &row.gram_weight)?,
        })
    })
}

pub fn read_nutrients(path: &Path) -> Result<Vec<NutrientRow>> {
    read_csv(path, |row: NutrientCsvRow, ctx| {
        Ok(NutrientRow {
            fdc_id: ctx.int("fdc_id", &row.fdc_id)?,
            nutrient_id: ctx.int_or_zero("nutrient_id", &row.nutrient_id)?,
            amount: ctx.decimal_or_zero("amount", &row.amount)?,
        })
    })
}
