//! CLI commands over the history store and meal plan.
//!
//! These go through the same [`HistoryService`] as the HTTP server, so an
//! entry added from the terminal is indistinguishable from one posted by
//! the client.

use anyhow::{Context, Result};
use std::sync::Arc;

use greenblog_core::models::{EntryDraft, HistoryEntry};

use crate::config::Config;
use crate::file_store::JsonFileStore;
use crate::history::HistoryService;
use crate::plan::load_plan;

fn service(config: &Config) -> HistoryService {
    HistoryService::new(Arc::new(JsonFileStore::new(&config.storage.path)))
}

/// Today's date the way the client pre-fills it, e.g. `22.02.2026`.
pub fn today_display_date() -> String {
    chrono::Local::now().format("%d.%m.%Y").to_string()
}

pub async fn run_init(config: &Config) -> Result<()> {
    let store = JsonFileStore::new(&config.storage.path);
    let created = store
        .init()
        .await
        .with_context(|| format!("Failed to initialize {}", config.storage.path.display()))?;

    if created {
        println!("History initialized at {}", config.storage.path.display());
    } else {
        println!(
            "History already exists at {} (left unchanged)",
            config.storage.path.display()
        );
    }
    Ok(())
}

pub async fn run_list(config: &Config, day: Option<&str>) -> Result<()> {
    let doc = service(config).list().await?;

    let days: Vec<(&String, &Vec<HistoryEntry>)> = match day {
        Some(day) => doc.iter().filter(|(d, _)| d.as_str() == day).collect(),
        None => doc.iter().collect(),
    };

    if days.is_empty() {
        match day {
            Some(day) => println!("No history recorded for '{}'.", day),
            None => println!("No history recorded yet."),
        }
        return Ok(());
    }

    for (day, entries) in days {
        println!("--- {} ({}) ---", day, entries.len());
        for entry in entries {
            print_entry(entry);
        }
        println!();
    }
    Ok(())
}

pub async fn run_add(config: &Config, day: &str, draft: EntryDraft) -> Result<()> {
    let entry = service(config).append(day, draft).await?;
    println!("Added entry {} to '{}':", entry.id, day);
    print_entry(&entry);
    Ok(())
}

pub fn run_plan(config: &Config) -> Result<()> {
    let plan = config
        .plan
        .as_ref()
        .context("No meal plan configured (set [plan].path)")?;
    let weeks = load_plan(&plan.path)?;

    for week in &weeks {
        println!("{} Woche {}: {} ({})", week.emoji, week.id, week.title, week.theme);
        for day in &week.days {
            let marker = if day.is_restday { " [rest]" } else { "" };
            println!("  {:<12} {:<10} {}{}", day.id, day.dish_type, day.title, marker);
        }
    }
    Ok(())
}

fn print_entry(entry: &HistoryEntry) {
    println!(
        "[{}] {} {}  {}",
        entry.id,
        entry.date,
        stars(entry.rating),
        entry.specific_name
    );
    if !entry.comment.is_empty() {
        println!("    {}", entry.comment);
    }
    if let Some(ref link) = entry.recipe_link {
        println!("    {}", link);
    }
}

/// Five-slot star bar; ratings outside 0..=5 are shown clamped.
fn stars(rating: i32) -> String {
    let filled = rating.clamp(0, 5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
