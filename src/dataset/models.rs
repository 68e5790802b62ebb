use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DIET_TYPE_COLUMN: &str = "Diet_type";
pub const RECIPE_NAME_COLUMN: &str = "Recipe_name";
pub const CUISINE_TYPE_COLUMN: &str = "Cuisine_type";
pub const PROTEIN_COLUMN: &str = "Protein(g)";
pub const CARBS_COLUMN: &str = "Carbs(g)";
pub const FAT_COLUMN: &str = "Fat(g)";

pub const REQUIRED_COLUMNS: &[&str] = &[
    DIET_TYPE_COLUMN,
    RECIPE_NAME_COLUMN,
    PROTEIN_COLUMN,
    CARBS_COLUMN,
    FAT_COLUMN,
];

pub const NUMERIC_COLUMNS: &[&str] = &[PROTEIN_COLUMN, CARBS_COLUMN, FAT_COLUMN];

pub const DEFAULT_CUISINE: &str = "american";
pub const UNKNOWN_RECIPE: &str = "Unknown";

/// One row of the source table, after missing-value handling.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeRecord {
    pub diet_type: String,
    pub recipe_name: Option<String>,
    pub cuisine_type: Option<String>,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    /// Every other column of the row, keyed by its header name.
    pub passthrough: BTreeMap<String, Option<String>>,
}

impl RecipeRecord {
    /// The row as a JSON object keyed by the source header names.
    pub fn to_raw_row(&self) -> Map<String, Value> {
        let mut row = Map::new();
        for (column, value) in self.passthrough.iter() {
            row.insert(column.clone(), optional_string(value));
        }
        row.insert(DIET_TYPE_COLUMN.to_owned(), Value::from(self.diet_type.clone()));
        row.insert(
            RECIPE_NAME_COLUMN.to_owned(),
            optional_string(&self.recipe_name),
        );
        row.insert(
            CUISINE_TYPE_COLUMN.to_owned(),
            optional_string(&self.cuisine_type),
        );
        row.insert(PROTEIN_COLUMN.to_owned(), Value::from(self.protein_g));
        row.insert(CARBS_COLUMN.to_owned(), Value::from(self.carbs_g));
        row.insert(FAT_COLUMN.to_owned(), Value::from(self.fat_g));
        row
    }
}

fn optional_string(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::from(s.clone()),
        None => Value::Null,
    }
}

/// What happened while a table was loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_dropped: usize,
    /// Number of imputed cells per numeric column among the kept rows, in
    /// column order.
    pub imputed_cells: Vec<(String, usize)>,
}

/// The in-memory snapshot of the dataset a single operation works on.
#[derive(Clone, Debug, Default)]
pub struct Table {
    pub records: Vec<RecipeRecord>,
    pub report: LoadReport,
}

impl Table {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Mean macronutrients of one diet type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DietSummary {
    #[serde(rename = "Diet_type")]
    pub diet_type: String,
    #[serde(rename = "Protein")]
    pub mean_protein: f64,
    #[serde(rename = "Carbs")]
    pub mean_carbs: f64,
    #[serde(rename = "Fat")]
    pub mean_fat: f64,
    #[serde(rename = "recipes")]
    pub recipe_count: usize,
}

impl DietSummary {
    /// Copy with every mean rounded to 2 decimals, for external exposure.
    pub fn rounded(&self) -> DietSummary {
        DietSummary {
            diet_type: self.diet_type.clone(),
            mean_protein: round_to(self.mean_protein, 2),
            mean_carbs: round_to(self.mean_carbs, 2),
            mean_fat: round_to(self.mean_fat, 2),
            recipe_count: self.recipe_count,
        }
    }

    pub fn macros(&self) -> DietMacros {
        DietMacros {
            diet_type: self.diet_type.clone(),
            protein: round_to(self.mean_protein, 2),
            carbs: round_to(self.mean_carbs, 2),
            fat: round_to(self.mean_fat, 2),
        }
    }
}

/// Average macros of a diet type, as stored in a snapshot file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DietMacros {
    #[serde(rename = "Diet_type")]
    pub diet_type: String,
    #[serde(rename = "Protein(g)")]
    pub protein: f64,
    #[serde(rename = "Carbs(g)")]
    pub carbs: f64,
    #[serde(rename = "Fat(g)")]
    pub fat: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopProteinEntry {
    pub recipe: String,
    pub protein: f64,
    pub carbs: f64,
}

/// Display projection of a recipe, as listed by the recipes endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecipeView {
    #[serde(rename = "Recipe_name")]
    pub recipe_name: String,
    #[serde(rename = "Diet_type")]
    pub diet_type: String,
    #[serde(rename = "Cuisine_type")]
    pub cuisine_type: String,
    #[serde(rename = "Protein")]
    pub protein: f64,
    #[serde(rename = "Carbs")]
    pub carbs: f64,
    #[serde(rename = "Fat")]
    pub fat: f64,
}

/// Statistics over a (possibly filtered) set of recipes.
/// Means are `None` when the set is empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecipeStatistics {
    pub total_recipes: usize,
    pub avg_protein: Option<f64>,
    pub avg_carbs: Option<f64>,
    pub avg_fat: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ClusterBuckets {
    pub high_protein: Vec<String>,
    pub high_carb: Vec<String>,
    pub balanced: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub rows: Vec<RecipeRecord>,
    pub total_records: usize,
    pub total_pages: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MacroRatios {
    pub diet_type: String,
    pub recipe_name: Option<String>,
    pub protein_to_carbs: Option<f64>,
    pub carbs_to_fat: Option<f64>,
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
