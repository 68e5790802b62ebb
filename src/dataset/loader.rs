use super::error::{DatasetError, DatasetResult};
use super::models::*;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

struct ColumnIndices {
    diet_type: usize,
    recipe_name: usize,
    cuisine_type: Option<usize>,
    numeric: [usize; 3],
    passthrough: Vec<(usize, String)>,
}

impl ColumnIndices {
    fn resolve(headers: &[String]) -> DatasetResult<ColumnIndices> {
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !headers.iter().any(|h| h == *required))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::Schema(missing.join(", ")));
        }

        let position = |name: &str| headers.iter().position(|h| h == name);
        // Required columns were checked above.
        let required = |name: &str| position(name).unwrap_or_default();

        let core = [
            DIET_TYPE_COLUMN,
            RECIPE_NAME_COLUMN,
            CUISINE_TYPE_COLUMN,
            PROTEIN_COLUMN,
            CARBS_COLUMN,
            FAT_COLUMN,
        ];
        let passthrough = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !core.contains(&h.as_str()))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        Ok(ColumnIndices {
            diet_type: required(DIET_TYPE_COLUMN),
            recipe_name: required(RECIPE_NAME_COLUMN),
            cuisine_type: position(CUISINE_TYPE_COLUMN),
            numeric: [
                required(PROTEIN_COLUMN),
                required(CARBS_COLUMN),
                required(FAT_COLUMN),
            ],
            passthrough,
        })
    }
}

/// A parsed row whose numeric cells may still be missing.
struct PendingRow {
    diet_type: Option<String>,
    recipe_name: Option<String>,
    cuisine_type: Option<String>,
    numeric: [Option<f64>; 3],
    passthrough: BTreeMap<String, Option<String>>,
}

fn cell(record: &csv::StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn numeric_cell(record: &csv::StringRecord, index: usize) -> Option<f64> {
    cell(record, index)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Loads a delimited table, validating its header and imputing blank or
/// unparsable numeric cells with their column mean.
pub fn load_table_from_reader<R: Read>(reader: R) -> DatasetResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(DatasetError::EmptyData(
            "no columns to parse from source".to_owned(),
        ));
    }

    let indices = ColumnIndices::resolve(&headers)?;

    let mut pending = Vec::new();
    for result in reader.records() {
        let record = result?;
        let passthrough = indices
            .passthrough
            .iter()
            .map(|(i, name)| (name.clone(), cell(&record, *i)))
            .collect();
        pending.push(PendingRow {
            diet_type: cell(&record, indices.diet_type),
            recipe_name: cell(&record, indices.recipe_name),
            cuisine_type: indices.cuisine_type.and_then(|i| cell(&record, i)),
            numeric: indices.numeric.map(|i| numeric_cell(&record, i)),
            passthrough,
        });
    }

    if pending.is_empty() {
        return Err(DatasetError::EmptyData(
            "source has no data rows".to_owned(),
        ));
    }

    let mut column_means = [0f64; 3];
    for (column, name) in NUMERIC_COLUMNS.iter().enumerate() {
        let (sum, count) = pending
            .iter()
            .filter_map(|row| row.numeric[column])
            .fold((0f64, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            return Err(DatasetError::EmptyData(format!(
                "column {} has no numeric values",
                name
            )));
        }
        column_means[column] = sum / count as f64;
    }

    let rows_read = pending.len();
    let mut imputed = [0usize; 3];
    let records: Vec<RecipeRecord> = pending
        .into_iter()
        .filter_map(|row| {
            let diet_type = row.diet_type?;
            let [protein_g, carbs_g, fat_g] = [0, 1, 2].map(|column| match row.numeric[column] {
                Some(value) => value,
                None => {
                    imputed[column] += 1;
                    column_means[column]
                }
            });
            Some(RecipeRecord {
                diet_type,
                recipe_name: row.recipe_name,
                cuisine_type: row.cuisine_type,
                protein_g,
                carbs_g,
                fat_g,
                passthrough: row.passthrough,
            })
        })
        .collect();
    let imputed_cells: Vec<(String, usize)> = NUMERIC_COLUMNS
        .iter()
        .zip(imputed)
        .map(|(name, count)| (name.to_string(), count))
        .collect();

    let rows_dropped = rows_read - records.len();
    if rows_dropped > 0 {
        warn!("Dropped {} rows without a diet type", rows_dropped);
    }
    if records.is_empty() {
        return Err(DatasetError::EmptyData(
            "no rows with a diet type".to_owned(),
        ));
    }

    for (column, count) in imputed_cells.iter().filter(|(_, count)| *count > 0) {
        debug!("Imputed {} missing cells in {}", count, column);
    }

    Ok(Table {
        records,
        report: LoadReport {
            rows_read,
            rows_dropped,
            imputed_cells,
        },
    })
}

pub fn load_table_from_bytes(bytes: &[u8]) -> DatasetResult<Table> {
    load_table_from_reader(bytes)
}

pub fn load_table_from_path(path: &Path) -> DatasetResult<Table> {
    if !path.is_file() {
        return Err(DatasetError::NotFound(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    load_table_from_reader(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Diet_type,Recipe_name,Cuisine_type,Protein(g),Carbs(g),Fat(g),Extraction_day\n";

    fn load(body: &str) -> DatasetResult<Table> {
        load_table_from_bytes(format!("{HEADER}{body}").as_bytes())
    }

    #[test]
    fn loads_records_in_source_order() {
        let table = load(
            "paleo,Bone Broth,american,10.5,2,1,2022-10-16\n\
             vegan,Tofu Bowl,asian,20,40.25,5,2022-10-16\n",
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].diet_type, "paleo");
        assert_eq!(table.records[0].recipe_name.as_deref(), Some("Bone Broth"));
        assert_eq!(table.records[1].carbs_g, 40.25);
        assert_eq!(
            table.records[1].passthrough["Extraction_day"].as_deref(),
            Some("2022-10-16")
        );
        assert_eq!(table.report.rows_dropped, 0);
    }

    #[test]
    fn missing_required_columns_is_schema_error() {
        let err = load_table_from_bytes(b"Diet_type,Recipe_name,Protein(g)\nketo,Eggs,12\n")
            .unwrap_err();
        match err {
            DatasetError::Schema(columns) => assert_eq!(columns, "Carbs(g), Fat(g)"),
            other => panic!("Unexpected error {:?}", other),
        }
    }

    #[test]
    fn header_only_source_is_empty_data() {
        let err = load("").unwrap_err();
        assert!(matches!(err, DatasetError::EmptyData(_)));
    }

    #[test]
    fn empty_source_is_empty_data() {
        let err = load_table_from_bytes(b"").unwrap_err();
        assert!(matches!(err, DatasetError::EmptyData(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_table_from_path(Path::new("/definitely/not/here/All_Diets.csv"))
            .unwrap_err();
        assert!(matches!(err, DatasetError::NotFound(_)));
    }

    #[test]
    fn imputes_blank_and_unparsable_cells_with_column_mean() {
        let table = load(
            "keto,A,,10,1,4,\n\
             keto,B,,,3,n/a,\n\
             keto,C,,30,,8,\n",
        )
        .unwrap();

        assert_eq!(table.records[1].protein_g, 20.0);
        assert_eq!(table.records[2].carbs_g, 2.0);
        assert_eq!(table.records[1].fat_g, 6.0);
        assert_eq!(
            table.report.imputed_cells,
            vec![
                ("Protein(g)".to_owned(), 1),
                ("Carbs(g)".to_owned(), 1),
                ("Fat(g)".to_owned(), 1),
            ]
        );
        // Non-numeric blanks are left alone.
        assert_eq!(table.records[0].cuisine_type, None);
    }

    #[test]
    fn rows_without_diet_type_are_dropped_but_feed_column_means() {
        let table = load(
            "keto,A,,10,1,1,\n\
             ,Orphan,,50,1,1,\n\
             keto,C,,,1,1,\n",
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.report.rows_read, 3);
        assert_eq!(table.report.rows_dropped, 1);
        assert_eq!(table.records[1].protein_g, 30.0);
    }

    #[test]
    fn imputation_report_ignores_dropped_rows() {
        let table = load(
            "keto,A,,10,1,1,\n\
             ,Orphan,,,,,\n\
             keto,C,,,1,1,\n",
        )
        .unwrap();

        assert_eq!(table.report.rows_dropped, 1);
        assert_eq!(
            table.report.imputed_cells,
            vec![
                ("Protein(g)".to_owned(), 1),
                ("Carbs(g)".to_owned(), 0),
                ("Fat(g)".to_owned(), 0),
            ]
        );
    }

    #[test]
    fn column_without_any_number_is_empty_data() {
        let err = load("keto,A,,,1,1,\nketo,B,,x,2,2,\n").unwrap_err();
        match err {
            DatasetError::EmptyData(reason) => assert!(reason.contains("Protein(g)")),
            other => panic!("Unexpected error {:?}", other),
        }
    }

    #[test]
    fn short_rows_are_treated_as_missing_cells() {
        let table = load("keto,A,,10,1,1,\nketo,B,,20\n").unwrap();
        assert_eq!(table.records[1].carbs_g, 1.0);
        assert_eq!(table.records[1].fat_g, 1.0);
    }

    #[test]
    fn cuisine_column_is_optional() {
        let table =
            load_table_from_bytes(b"Diet_type,Recipe_name,Protein(g),Carbs(g),Fat(g)\nketo,A,1,2,3\n")
                .unwrap();
        assert_eq!(table.records[0].cuisine_type, None);
        assert!(table.records[0].passthrough.is_empty());
    }
}
