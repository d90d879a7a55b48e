//! Service observability commands: status, quotas, cache-stats.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

use super::print_json;

/// Provider availability and liveness.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let statuses = state.service.check_service_availability().await;

    if json {
        return print_json(&statuses);
    }

    println!();
    println!(
        "  {} Artistry v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    if statuses.is_empty() {
        println!(
            "  {} No providers enabled. Add [[providers]] to {}",
            style("i").blue().bold(),
            style(state.data_dir.join("config.toml").display()).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Provider").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Capability").fg(Color::White),
        Cell::new("Configured").fg(Color::White),
        Cell::new("Healthy").fg(Color::White),
        Cell::new("Last Error").fg(Color::White),
    ]);

    for status in &statuses {
        let kind = state
            .settings
            .provider(&status.name)
            .map(|p| p.kind.to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&status.name),
            Cell::new(kind),
            Cell::new(status.capability.to_string()),
            yes_no(status.available),
            yes_no(status.healthy),
            Cell::new(status.last_error.as_deref().unwrap_or("-")),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {}",
        style(format!("Data dir: {}", state.data_dir.display())).dim()
    );
    println!();
    Ok(())
}

/// Local rate-limit windows for each provider.
pub fn quotas(state: &AppState, json: bool) -> Result<()> {
    let quotas = state.service.get_service_quotas();

    if json {
        return print_json(&quotas);
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Provider").fg(Color::White),
        Cell::new("Remaining").fg(Color::White),
        Cell::new("Limit").fg(Color::White),
        Cell::new("Window").fg(Color::White),
        Cell::new("Resets In").fg(Color::White),
    ]);
    for quota in &quotas {
        table.add_row(vec![
            Cell::new(&quota.provider),
            Cell::new(quota.remaining),
            Cell::new(quota.limit),
            Cell::new(format!("{}s", quota.window_secs)),
            Cell::new(format!("{:.1}s", quota.resets_in_ms as f64 / 1000.0)),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {}",
        style("Quotas are tracked per process.").dim()
    );
    println!();
    Ok(())
}

/// Entry counts of each operation's response cache.
pub fn cache_stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.service.get_cache_stats();

    if json {
        return print_json(&stats);
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Cache").fg(Color::White),
        Cell::new("Active").fg(Color::White),
        Cell::new("Expired").fg(Color::White),
        Cell::new("Total").fg(Color::White),
    ]);
    for (kind, stat) in &stats {
        table.add_row(vec![
            Cell::new(kind.to_string()),
            Cell::new(stat.active),
            Cell::new(stat.expired),
            Cell::new(stat.total),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {}",
        style("Caches are in-memory and per process.").dim()
    );
    println!();
    Ok(())
}

fn yes_no(value: bool) -> Cell {
    if value {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::Red)
    }
}
