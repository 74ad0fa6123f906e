//! Core data types for the ingestion pipeline
//! Pure data structures with no behavior

use crate::ingestion::utils::falsy_decimal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Food record as returned by the FDC `foods/list` endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecord {
    pub fdc_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub food_portions: Option<Vec<PortionEntry>>,
    #[serde(default)]
    pub food_nutrients: Option<Vec<NutrientEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortionEntry {
    // String, number or {"id": ..} object depending on the data type
    #[serde(default)]
    pub measure_unit: Value,
    #[serde(default, deserialize_with = "falsy_decimal")]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "falsy_decimal")]
    pub gram_weight: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientEntry {
    #[serde(default)]
    pub nutrient_id: Option<i64>,
    #[serde(default, deserialize_with = "falsy_decimal")]
    pub amount: Option<Decimal>,
}

/// Row of `food_data.csv` / `fdc_food`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodRow {
    pub fdc_id: i64,
    pub description_en: String,
    pub description_de: String,
}

/// Row of `portions_data.csv` / `fdc_portions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortionRow {
    pub fdc_id: i64,
    pub measure_unit_id: String,
    pub amount: Decimal,
    pub gram_weight: Decimal,
}

/// Row of `nutrients_data.csv` / `fdc_nutrients`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientRow {
    pub fdc_id: i64,
    pub nutrient_id: i64,
    pub amount: Decimal,
}

/// Remote tables and their intermediate files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Food,
    Portions,
    Nutrients,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Food, Table::Portions, Table::Nutrients];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Food => "fdc_food",
            Table::Portions => "fdc_portions",
            Table::Nutrients => "fdc_nutrients",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Table::Food => "food_data.csv",
            Table::Portions => "portions_data.csv",
            Table::Nutrients => "nutrients_data.csv",
        }
    }

    /// Header order of the file, also the insert column list
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Food => &["fdc_id", "description_en", "description_de"],
            Table::Portions => &["fdc_id", "measure_unit_id", "amount", "gram_weight"],
            Table::Nutrients => &["fdc_id", "nutrient_id", "amount"],
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Flat row kinds that map onto one table
pub trait TableRow: Serialize {
    const TABLE: Table;
}

impl TableRow for FoodRow {
    const TABLE: Table = Table::Food;
}

impl TableRow for PortionRow {
    const TABLE: Table = Table::Portions;
}

impl TableRow for NutrientRow {
    const TABLE: Table = Table::Nutrients;
}

/// The three row sequences produced by one fetch run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FlattenedFoods {
    pub foods: Vec<FoodRow>,
    pub portions: Vec<PortionRow>,
    pub nutrients: Vec<NutrientRow>,
}

/// Fetch run statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchStats {
    pub pages: u32,
    pub foods: usize,
    pub portions: usize,
    pub nutrients: usize,
}

impl std::fmt::Display for FetchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pages: {}, foods: {}, portions: {}, nutrients: {}",
            self.pages, self.foods, self.portions, self.nutrients
        )
    }
}

/// Load statistics for one table or a whole run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub batches: usize,
    pub rows: usize,
}

impl std::ops::AddAssign for LoadStats {
    fn add_assign(&mut self, other: Self) {
        self.batches += other.batches;
        self.rows += other.rows;
    }
}

impl std::fmt::Display for LoadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "batches: {}, rows: {}", self.batches, self.rows)
    }
}
