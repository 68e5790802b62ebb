//! Derived views over a loaded [`Table`].
//!
//! Every function here is a pure single pass (plus a sort where noted) over
//! the records; nothing is cached between calls.

use super::error::{DatasetError, DatasetResult};
use super::models::*;
use std::collections::HashMap;

pub const DEFAULT_TOP_PROTEIN_LIMIT: usize = 5;
pub const DEFAULT_RECIPES_LIMIT: usize = 100;
pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 50;

pub const HIGH_PROTEIN_THRESHOLD: f64 = 90.0;
pub const HIGH_CARB_THRESHOLD: f64 = 200.0;

#[derive(Default)]
struct MacroAccumulator {
    protein: f64,
    carbs: f64,
    fat: f64,
    count: usize,
}

impl MacroAccumulator {
    fn add(&mut self, record: &RecipeRecord) {
        self.protein += record.protein_g;
        self.carbs += record.carbs_g;
        self.fat += record.fat_g;
        self.count += 1;
    }

    fn mean(&self, total: f64) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(total / self.count as f64)
        }
    }
}

/// Groups records by their exact `diet_type` value, in order of first
/// appearance.
fn group_indices(table: &Table) -> Vec<(&str, Vec<usize>)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (index, record) in table.records.iter().enumerate() {
        let key = record.diet_type.as_str();
        match positions.get(key) {
            Some(&group) => groups[group].1.push(index),
            None => {
                positions.insert(key, groups.len());
                groups.push((key, vec![index]));
            }
        }
    }
    groups
}

/// Mean macronutrients per diet type, at full precision.
/// Use [`DietSummary::rounded`] before exposing the values.
pub fn summarize(table: &Table) -> Vec<DietSummary> {
    group_indices(table)
        .into_iter()
        .map(|(diet_type, indices)| {
            let mut acc = MacroAccumulator::default();
            for index in indices {
                acc.add(&table.records[index]);
            }
            let count = acc.count as f64;
            DietSummary {
                diet_type: diet_type.to_owned(),
                mean_protein: acc.protein / count,
                mean_carbs: acc.carbs / count,
                mean_fat: acc.fat / count,
                recipe_count: acc.count,
            }
        })
        .collect()
}

/// Indices of the records sorted by protein, highest first. The sort is
/// stable, so ties keep their source order.
fn by_protein_desc(table: &Table, indices: &mut [usize]) {
    indices.sort_by(|a, b| {
        table.records[*b]
            .protein_g
            .total_cmp(&table.records[*a].protein_g)
    });
}

/// The `limit` highest-protein recipes of the whole table.
pub fn top_protein(table: &Table, limit: usize) -> DatasetResult<Vec<TopProteinEntry>> {
    if limit == 0 {
        return Err(DatasetError::invalid_parameter(
            "limit",
            "must be a positive integer",
        ));
    }
    let mut indices: Vec<usize> = (0..table.len()).collect();
    by_protein_desc(table, &mut indices);
    Ok(indices
        .into_iter()
        .take(limit)
        .map(|index| {
            let record = &table.records[index];
            TopProteinEntry {
                recipe: record
                    .recipe_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_RECIPE.to_owned()),
                protein: round_to(record.protein_g, 1),
                carbs: round_to(record.carbs_g, 1),
            }
        })
        .collect())
}

/// The `per_group` highest-protein recipes of every diet type, groups
/// concatenated in group order.
pub fn top_protein_per_diet(table: &Table, per_group: usize) -> Vec<&RecipeRecord> {
    group_indices(table)
        .into_iter()
        .flat_map(|(_, mut indices)| {
            by_protein_desc(table, &mut indices);
            indices.truncate(per_group);
            indices
        })
        .map(|index| &table.records[index])
        .collect()
}

/// Case-insensitive exact match on the diet type, then projection of the
/// first `limit` matches plus statistics over every match.
pub fn list_recipes(
    table: &Table,
    diet_type_filter: Option<&str>,
    limit: usize,
) -> DatasetResult<(Vec<RecipeView>, RecipeStatistics)> {
    if limit == 0 {
        return Err(DatasetError::invalid_parameter(
            "limit",
            "must be a positive integer",
        ));
    }
    let wanted = diet_type_filter
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase);
    let matches: Vec<&RecipeRecord> = table
        .records
        .iter()
        .filter(|r| match &wanted {
            Some(w) => r.diet_type.to_lowercase() == *w,
            None => true,
        })
        .collect();

    let mut acc = MacroAccumulator::default();
    for record in matches.iter() {
        acc.add(record);
    }
    let statistics = RecipeStatistics {
        total_recipes: matches.len(),
        avg_protein: acc.mean(acc.protein).map(|m| round_to(m, 2)),
        avg_carbs: acc.mean(acc.carbs).map(|m| round_to(m, 2)),
        avg_fat: acc.mean(acc.fat).map(|m| round_to(m, 2)),
    };

    let recipes = matches
        .into_iter()
        .take(limit)
        .map(|record| RecipeView {
            recipe_name: record
                .recipe_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_RECIPE.to_owned()),
            diet_type: record.diet_type.clone(),
            cuisine_type: record
                .cuisine_type
                .clone()
                .unwrap_or_else(|| DEFAULT_CUISINE.to_owned()),
            protein: round_to(record.protein_g, 1),
            carbs: round_to(record.carbs_g, 1),
            fat: round_to(record.fat_g, 1),
        })
        .collect();

    Ok((recipes, statistics))
}

/// Threshold buckets. `high_protein` and `high_carb` are independent, so a
/// diet type can be in both; `balanced` is the complement of their union.
pub fn bucket(summaries: &[DietSummary]) -> ClusterBuckets {
    let high_protein: Vec<String> = summaries
        .iter()
        .filter(|s| s.mean_protein > HIGH_PROTEIN_THRESHOLD)
        .map(|s| s.diet_type.clone())
        .collect();
    let high_carb: Vec<String> = summaries
        .iter()
        .filter(|s| s.mean_carbs > HIGH_CARB_THRESHOLD)
        .map(|s| s.diet_type.clone())
        .collect();
    let balanced = summaries
        .iter()
        .filter(|s| !high_protein.contains(&s.diet_type) && !high_carb.contains(&s.diet_type))
        .map(|s| s.diet_type.clone())
        .collect();
    ClusterBuckets {
        high_protein,
        high_carb,
        balanced,
    }
}

/// A contiguous, 1-based page of the table. Pages past the end are empty.
pub fn page(table: &Table, page_number: usize, page_size: usize) -> DatasetResult<Page> {
    if page_number == 0 {
        return Err(DatasetError::invalid_parameter("page", "must be at least 1"));
    }
    if page_size == 0 {
        return Err(DatasetError::invalid_parameter(
            "per_page",
            "must be at least 1",
        ));
    }
    let total_records = table.len();
    let total_pages = total_records.div_ceil(page_size);
    let start = (page_number - 1).saturating_mul(page_size);
    let rows = table
        .records
        .iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();
    Ok(Page {
        rows,
        total_records,
        total_pages,
    })
}

/// The diet type with the largest mean protein; the first one in group
/// order wins a tie.
pub fn highest_protein_diet(summaries: &[DietSummary]) -> Option<&DietSummary> {
    summaries.iter().fold(None, |best, s| match best {
        Some(b) if b.mean_protein >= s.mean_protein => Some(b),
        _ => Some(s),
    })
}

/// Most frequent cuisine per diet type, in group order. Ties go to the
/// alphabetically smallest cuisine.
pub fn most_common_cuisine(table: &Table) -> Vec<(String, Option<String>)> {
    group_indices(table)
        .into_iter()
        .map(|(diet_type, indices)| {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for index in indices {
                if let Some(cuisine) = table.records[index].cuisine_type.as_deref() {
                    *counts.entry(cuisine).or_default() += 1;
                }
            }
            let mode = counts
                .into_iter()
                .max_by(|(a_name, a_count), (b_name, b_count)| {
                    a_count.cmp(b_count).then_with(|| b_name.cmp(a_name))
                })
                .map(|(name, _)| name.to_owned());
            (diet_type.to_owned(), mode)
        })
        .collect()
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

pub fn macro_ratios(table: &Table) -> Vec<MacroRatios> {
    table
        .records
        .iter()
        .map(|r| MacroRatios {
            diet_type: r.diet_type.clone(),
            recipe_name: r.recipe_name.clone(),
            protein_to_carbs: ratio(r.protein_g, r.carbs_g),
            carbs_to_fat: ratio(r.carbs_g, r.fat_g),
        })
        .collect()
}
