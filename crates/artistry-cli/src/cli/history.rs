//! `artistry history`: browse the persisted generation log.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use artistry_core::log::GenerationLogStore;
use artistry_types::generation::OperationKind;
use artistry_types::log::{GenerationLogEntry, GenerationLogQuery};

use super::print_json;
use crate::state::AppState;

pub struct HistoryFilter {
    pub user: Option<String>,
    pub operation: Option<OperationKind>,
    pub provider: Option<String>,
    pub failed: bool,
    pub succeeded: bool,
    pub limit: u32,
}

impl HistoryFilter {
    fn to_query(&self) -> GenerationLogQuery {
        let success = match (self.failed, self.succeeded) {
            (true, _) => Some(false),
            (false, true) => Some(true),
            (false, false) => None,
        };
        GenerationLogQuery {
            user_id: self.user.clone(),
            operation: self.operation,
            provider: self.provider.clone(),
            success,
            limit: Some(self.limit),
        }
    }
}

pub async fn history(state: &AppState, filter: HistoryFilter, json: bool) -> Result<()> {
    let entries = state.history.query(&filter.to_query()).await?;

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!();
        println!("  {} No generations recorded yet.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("When").fg(Color::White),
        Cell::new("User").fg(Color::White),
        Cell::new("Operation").fg(Color::White),
        Cell::new("Provider").fg(Color::White),
        Cell::new("Result").fg(Color::White),
        Cell::new("Duration").fg(Color::White),
    ]);

    for entry in &entries {
        table.add_row(vec![
            Cell::new(entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(&entry.user_id),
            Cell::new(entry.operation.to_string()),
            Cell::new(&entry.provider),
            outcome_cell(entry),
            Cell::new(format!("{}ms", entry.duration_ms)),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {}",
        style(format!("{} entries", entries.len())).dim()
    );
    println!();
    Ok(())
}

fn outcome_cell(entry: &GenerationLogEntry) -> Cell {
    match (entry.success, entry.cached) {
        (true, true) => Cell::new("cached").fg(Color::Cyan),
        (true, false) => Cell::new("ok").fg(Color::Green),
        (false, _) => Cell::new("degraded").fg(Color::Yellow),
    }
}
