//! Meal-plan content.
//!
//! The weekly plans (recipes, sections, day metadata) are presentation
//! content kept outside the binary in a JSON file, configured under
//! `[plan].path`. The server re-reads the file on every request, so edits
//! show up without a restart.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One themed week of meals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPlan {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub description: String,
    pub days: Vec<MealDay>,
}

/// A single day in a week plan. `id` is the day identifier history
/// entries are recorded under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealDay {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(rename = "type", default)]
    pub dish_type: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<RecipeSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_restday: bool,
}

/// A titled list within a recipe, e.g. ingredients or preparation steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSection {
    pub title: String,
    #[serde(default)]
    pub items: Vec<String>,
}

pub fn load_plan(path: &Path) -> Result<Vec<WeekPlan>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file: {}", path.display()))?;
    parse_plan(&content).with_context(|| format!("Failed to parse plan file: {}", path.display()))
}

pub fn parse_plan(content: &str) -> Result<Vec<WeekPlan>> {
    let weeks: Vec<WeekPlan> = serde_json::from_str(content)?;

    for week in &weeks {
        let mut seen = std::collections::HashSet::new();
        for day in &week.days {
            if day.id.is_empty() {
                anyhow::bail!("week {} has a day with an empty id", week.id);
            }
            if !seen.insert(day.id.as_str()) {
                anyhow::bail!("week {} lists day '{}' more than once", week.id, day.id);
            }
        }
    }

    Ok(weeks)
}
