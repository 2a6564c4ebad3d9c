use super::ui;
use crate::App;
use crate::core::format::format_currency;
use crate::core::trend::{TrendPoint, trend};
use crate::core::valuation::revalue_entry;
use anyhow::Result;
use comfy_table::{Cell, Table};
use futures::future::join_all;

pub async fn run(app: &App) -> Result<()> {
    let entries = app.store.list().await?;
    if entries.is_empty() {
        println!("No entries recorded yet. Use `networth record` to add one.");
        return Ok(());
    }

    let pb = ui::new_progress_bar(entries.len() as u64, true);
    pb.set_message("Valuing entries...");
    let valuations = join_all(entries.iter().map(|entry| {
        let pb = pb.clone();
        async move {
            let valuation = revalue_entry(
                &app.converter,
                &app.config.accounts,
                entry,
                &app.config.currency,
            )
            .await;
            pb.inc(1);
            valuation
        }
    }))
    .await;
    pb.finish_and_clear();

    let points: Vec<_> = valuations
        .iter()
        .map(|valuation| (valuation.date, valuation.totals.net_worth))
        .collect();
    let partial: Vec<_> = valuations
        .iter()
        .filter(|valuation| !valuation.is_fully_converted())
        .map(|valuation| valuation.date)
        .collect();

    println!(
        "\n{}",
        ui::style_text("Net worth history", ui::StyleType::Title)
    );
    println!("{}", history_table(&trend(&points), &app.config.currency));
    if !partial.is_empty() {
        let dates: Vec<_> = partial.iter().map(ToString::to_string).collect();
        println!(
            "{}",
            ui::style_text(
                &format!("! Some balances counted 1:1 on {}", dates.join(", ")),
                ui::StyleType::Warning,
            )
        );
    }
    Ok(())
}

pub(crate) fn history_table(points: &[TrendPoint], currency: &str) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Net Worth"),
        ui::header_cell("Change"),
        ui::header_cell("Change %"),
    ]);

    for point in points {
        table.add_row(vec![
            Cell::new(point.date),
            ui::amount_cell(point.net_worth, currency),
            ui::format_optional_cell(point.change, |change| format_currency(change, currency)),
            point.change_pct.map_or_else(ui::na_cell, ui::change_cell),
        ]);
    }
    table
}
