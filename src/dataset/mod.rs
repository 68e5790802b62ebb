mod aggregate;
mod error;
mod loader;
mod models;
mod snapshot;
mod source;

pub use aggregate::{
    bucket, highest_protein_diet, list_recipes, macro_ratios, most_common_cuisine, page,
    summarize, top_protein, top_protein_per_diet, DEFAULT_PAGE, DEFAULT_PER_PAGE,
    DEFAULT_RECIPES_LIMIT, DEFAULT_TOP_PROTEIN_LIMIT, HIGH_CARB_THRESHOLD,
    HIGH_PROTEIN_THRESHOLD,
};
pub use error::{DatasetError, DatasetResult};
pub use loader::{load_table_from_bytes, load_table_from_path, load_table_from_reader};
pub use models::{
    round_to, ClusterBuckets, DietMacros, DietSummary, LoadReport, MacroRatios, Page,
    RecipeRecord, RecipeStatistics, RecipeView, Table, TopProteinEntry,
};
pub use snapshot::{load_with_fallback, AnalysisInput, Snapshot};
pub use source::{BlobLocation, DataSource};
