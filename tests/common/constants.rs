//! Shared constants for end-to-end tests
//!
//! When the fixture dataset changes, update only this file and
//! `fixtures.rs`.

// ============================================================================
// Fixture Dataset
// ============================================================================

/// Seven usable recipes over four diet types, plus one row without a diet
/// type that the loader drops. Quinoa Bowl has no protein value and Cheese
/// Plate no fat value, both get imputed.
pub const ALL_DIETS_CSV: &str = "\
Diet_type,Recipe_name,Cuisine_type,Protein(g),Carbs(g),Fat(g),Extraction_day,Extraction_time
paleo,Bone Broth,american,95.5,10,20,2022-10-16,17:20:09
vegan,Lentil Stew,indian,30,220.4,12,2022-10-16,17:20:09
keto,Bacon Eggs,,120,5,80,2022-10-16,17:20:09
paleo,Grilled Salmon,mediterranean,88.24,4,30,2022-10-16,17:20:09
vegan,Quinoa Bowl,,,250,15,2022-10-16,17:20:09
keto,Cheese Plate,french,60,2,,2022-10-16,17:20:09
dash,Oatmeal,american,10,190,6,2022-10-16,17:20:09
,Mystery Dish,american,40,40,40,2022-10-16,17:20:09
";

pub const TOTAL_RECORDS: u64 = 7;

/// Diet types in order of first appearance.
pub const DIET_TYPES: [&str; 4] = ["paleo", "vegan", "keto", "dash"];

pub const PALEO_MEAN_PROTEIN: f64 = 91.87;
pub const VEGAN_MEAN_CARBS: f64 = 235.2;
pub const VEGAN_MEAN_PROTEIN: f64 = 46.7;
pub const KETO_MEAN_FAT: f64 = 54.5;

/// Imputed value of the Quinoa Bowl protein cell: mean of every valid
/// protein value, including the dropped row.
pub const IMPUTED_PROTEIN: f64 = 443.74 / 7.0;

/// Source has every required column but Fat(g).
pub const MISSING_FAT_CSV: &str = "\
Diet_type,Recipe_name,Cuisine_type,Protein(g),Carbs(g)
keto,Bacon Eggs,american,120,5
";

pub const HEADER_ONLY_CSV: &str =
    "Diet_type,Recipe_name,Cuisine_type,Protein(g),Carbs(g),Fat(g)\n";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// HTTP request timeout (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server readiness (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
