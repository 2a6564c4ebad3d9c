use super::ui;
use crate::App;
use crate::core::format::format_currency;
use crate::core::model::NetWorthEntry;
use crate::core::valuation::{EntryValuation, revalue_entry};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Table};

pub async fn run(app: &App, date: Option<NaiveDate>) -> Result<()> {
    let Some(entry) = find_entry(app, date).await? else {
        println!("No entries recorded yet. Use `networth record` to add one.");
        return Ok(());
    };

    let valuation = revalue_entry(
        &app.converter,
        &app.config.accounts,
        &entry,
        &app.config.currency,
    )
    .await;

    println!(
        "\nNet worth on {}",
        ui::style_text(&entry.date.to_string(), ui::StyleType::Title)
    );
    display_valuation(&valuation);
    Ok(())
}

/// The entry saved for `date`, or the most recent one when no date is given.
pub(crate) async fn find_entry(app: &App, date: Option<NaiveDate>) -> Result<Option<NetWorthEntry>> {
    match date {
        Some(date) => app
            .store
            .get(date)
            .await?
            .map(Some)
            .ok_or_else(|| anyhow!("No entry recorded for {date}")),
        None => app.store.latest().await,
    }
}

pub(crate) fn display_valuation(valuation: &EntryValuation) {
    println!("{}", valuation_table(valuation));
    ui::print_unconverted_notes(
        valuation
            .unconverted()
            .map(|line| (line.name.as_str(), line.currency.as_str())),
        &valuation.currency,
    );
}

pub(crate) fn valuation_table(valuation: &EntryValuation) -> Table {
    let currency = valuation.currency.as_str();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Account"),
        ui::header_cell("Type"),
        ui::header_cell("Category"),
        ui::header_cell("Balance"),
        ui::header_cell("Rate"),
        ui::header_cell(&format!("Value ({currency})")),
    ]);

    for line in &valuation.accounts {
        table.add_row(vec![
            Cell::new(&line.name),
            Cell::new(line.account_type.to_string()),
            Cell::new(&line.category),
            ui::amount_cell(line.balance, &line.currency),
            ui::rate_cell(&line.conversion),
            ui::converted_cell(&line.conversion, currency),
        ]);
    }

    let totals = &valuation.totals;
    for (label, value) in [
        ("Total Assets", totals.total_assets),
        ("Total Liabilities", totals.total_liabilities),
    ] {
        table.add_row(vec![
            Cell::new(ui::style_text(label, ui::StyleType::TotalLabel)),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
            ui::amount_cell(value, currency),
        ]);
    }
    table.add_row(vec![
        Cell::new(ui::style_text("Net Worth", ui::StyleType::TotalLabel)),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(ui::style_text(
            &format_currency(totals.net_worth, currency),
            ui::StyleType::TotalValue,
        ))
        .set_alignment(CellAlignment::Right),
    ]);
    table
}
