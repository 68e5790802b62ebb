use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli_style;

use cli_style::{
    get_styles, print_info, print_key_value_highlight, print_section_header, print_success,
    print_warning, TableBuilder,
};
use nutrition_insights_server::config::DEFAULT_CSV_PATH;
use nutrition_insights_server::dataset::{
    self, AnalysisInput, BlobLocation, DataSource, DietMacros, Snapshot, Table,
};

const DEFAULT_SNAPSHOT_PATH: &str = "simulated_nosql/nutrition_results.json";
const TOP_PER_DIET: usize = 5;
const RATIO_SAMPLE_ROWS: usize = 5;

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints insights about the dataset. Falls back to the averages of a
    /// snapshot when the CSV is missing.
    Analyze {
        #[clap(long, value_parser = parse_path, default_value = DEFAULT_CSV_PATH)]
        csv: PathBuf,

        /// Snapshot used when the CSV cannot be found.
        #[clap(long, value_parser = parse_path, default_value = DEFAULT_SNAPSHOT_PATH)]
        json: PathBuf,
    },

    /// Computes the per-diet averages and writes them as a snapshot file.
    Snapshot {
        #[clap(long, value_parser = parse_path, conflicts_with = "blob_url")]
        csv: Option<PathBuf>,

        /// Full url of the dataset blob: {endpoint}/{container}/{blob}.
        #[clap(long)]
        blob_url: Option<String>,

        #[clap(long, requires = "blob_url")]
        blob_sas_token: Option<String>,

        #[clap(long, value_parser = parse_path, default_value = DEFAULT_SNAPSHOT_PATH)]
        out: PathBuf,
    },
}

fn fmt_f64(value: f64) -> String {
    format!("{:.2}", value)
}

fn fmt_ratio(value: Option<f64>) -> String {
    value.map(fmt_f64).unwrap_or_else(|| "n/a".to_owned())
}

fn print_macros_table(title: &str, macros: &[DietMacros]) {
    print_section_header(title);
    let mut table = TableBuilder::new(&["Diet_type", "Protein(g)", "Carbs(g)", "Fat(g)"]);
    for m in macros {
        table.add_row(vec![
            m.diet_type.clone(),
            fmt_f64(m.protein),
            fmt_f64(m.carbs),
            fmt_f64(m.fat),
        ]);
    }
    table.print();
}

fn print_recipe_insights(table: &Table) {
    let summaries = dataset::summarize(table);
    let macros: Vec<DietMacros> = summaries.iter().map(|s| s.macros()).collect();
    print_macros_table("Average Macronutrients per Diet Type (from CSV)", &macros);

    print_section_header("Top 5 Protein-Rich Recipes per Diet Type");
    let mut top = TableBuilder::new(&["Diet_type", "Recipe_name", "Protein(g)", "Cuisine_type"]);
    for record in dataset::top_protein_per_diet(table, TOP_PER_DIET) {
        top.add_row(vec![
            record.diet_type.clone(),
            record.recipe_name.clone().unwrap_or_default(),
            fmt_f64(record.protein_g),
            record.cuisine_type.clone().unwrap_or_default(),
        ]);
    }
    top.print();

    if let Some(best) = dataset::highest_protein_diet(&summaries) {
        println!();
        print_key_value_highlight(
            "Diet type with highest protein content",
            &format!("{} ({:.2} g)", best.diet_type, best.mean_protein),
        );
    }

    print_section_header("Most Common Cuisines per Diet Type");
    let mut cuisines = TableBuilder::new(&["Diet_type", "Cuisine_type"]);
    for (diet_type, cuisine) in dataset::most_common_cuisine(table) {
        cuisines.add_row(vec![diet_type, cuisine.unwrap_or_else(|| "-".to_owned())]);
    }
    cuisines.print();

    print_section_header("Sample of New Metrics");
    let mut ratios = TableBuilder::new(&[
        "Diet_type",
        "Recipe_name",
        "Protein_to_Carbs_ratio",
        "Carbs_to_Fat_ratio",
    ]);
    for row in dataset::macro_ratios(table).into_iter().take(RATIO_SAMPLE_ROWS) {
        ratios.add_row(vec![
            row.diet_type,
            row.recipe_name.unwrap_or_default(),
            fmt_ratio(row.protein_to_carbs),
            fmt_ratio(row.carbs_to_fat),
        ]);
    }
    if ratios.is_empty() {
        print_warning("No rows to sample");
    } else {
        ratios.print();
    }
}

async fn analyze(csv: &Path, json: &Path) -> Result<()> {
    let input = dataset::load_with_fallback(csv, json)
        .await
        .context("Failed to load the dataset or its snapshot")?;
    match input {
        AnalysisInput::Recipes(table) => {
            if table.report.rows_dropped > 0 {
                print_warning(&format!(
                    "Dropped {} rows without a diet type",
                    table.report.rows_dropped
                ));
            }
            print_recipe_insights(&table);
        }
        AnalysisInput::Averages(snapshot) => {
            print_info(&format!("CSV not found at '{}'", csv.display()));
            print_info("Falling back to snapshot results for average macros");
            print_macros_table(
                "Average Macronutrients per Diet Type (from snapshot)",
                snapshot.average_macros(),
            );
        }
    }
    Ok(())
}

async fn snapshot(source: DataSource, out: &Path) -> Result<()> {
    print_info(&format!("Loading {}", source.describe()));
    let table = source
        .load()
        .await
        .with_context(|| format!("Failed to load {}", source.describe()))?;

    let snapshot = Snapshot::from_table(&table, &source.source_name());
    snapshot.write(out)?;
    print_success(&format!("Results saved to {}", out.display()));

    print_section_header("Processing Summary");
    print_key_value_highlight(
        "Records processed",
        &snapshot.total_records_processed.to_string(),
    );
    print_macros_table("Average Macronutrients", snapshot.average_macros());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    match cli_args.command {
        Command::Analyze { csv, json } => analyze(&csv, &json).await,
        Command::Snapshot {
            csv,
            blob_url,
            blob_sas_token,
            out,
        } => {
            let source = match blob_url {
                Some(url) => DataSource::Blob(BlobLocation::parse_url(&url, blob_sas_token)?),
                None => DataSource::File(csv.unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH))),
            };
            snapshot(source, &out).await
        }
    }
}
