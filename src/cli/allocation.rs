use super::{show, ui};
use crate::App;
use crate::core::allocation::{CategoryTotal, allocation};
use crate::core::valuation::revalue_entry;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Table};

pub async fn run(app: &App, date: Option<NaiveDate>) -> Result<()> {
    let Some(entry) = show::find_entry(app, date).await? else {
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
    let breakdown = allocation(&valuation, &app.config.categories);

    println!(
        "\nAllocation on {}",
        ui::style_text(&entry.date.to_string(), ui::StyleType::Title)
    );
    let sides = [
        ("Assets", &breakdown.assets, breakdown.total_assets),
        (
            "Liabilities",
            &breakdown.liabilities,
            breakdown.total_liabilities,
        ),
    ];
    let mut printed = false;
    for (title, groups, total) in sides {
        if groups.is_empty() {
            continue;
        }
        if printed {
            ui::print_separator();
        }
        println!("\n{}", ui::style_text(title, ui::StyleType::TotalLabel));
        println!("{}", category_table(groups, total, &breakdown.currency));
        printed = true;
    }
    if !printed {
        println!("No accounts to allocate.");
    }

    ui::print_unconverted_notes(
        valuation
            .unconverted()
            .map(|line| (line.name.as_str(), line.currency.as_str())),
        &valuation.currency,
    );
    Ok(())
}

pub(crate) fn category_table(groups: &[CategoryTotal], total: f64, currency: &str) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Accounts"),
        ui::header_cell(&format!("Value ({currency})")),
        ui::header_cell("Share"),
    ]);

    for group in groups {
        table.add_row(vec![
            Cell::new(&group.category),
            Cell::new(group.accounts).set_alignment(CellAlignment::Right),
            ui::amount_cell(group.value, currency),
            Cell::new(format!("{:.2}%", group.share)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new(ui::style_text("Total", ui::StyleType::TotalLabel)),
        Cell::new(""),
        ui::amount_cell(total, currency),
        Cell::new(""),
    ]);
    table
}
