use crate::core::convert::Conversion;
use crate::core::currency::RateOrigin;
use crate::core::format::format_currency;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Warning,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned monetary amount in its own currency's format.
pub fn amount_cell(amount: f64, currency: &str) -> Cell {
    Cell::new(format_currency(amount, currency)).set_alignment(CellAlignment::Right)
}

/// Converted amount; degraded 1:1 values are shown in yellow.
pub fn converted_cell(conversion: &Conversion, currency: &str) -> Cell {
    let cell = amount_cell(conversion.value, currency);
    if conversion.is_unconverted() {
        cell.fg(Color::Yellow)
    } else {
        cell
    }
}

/// Shows the applied rate and where it came from.
pub fn rate_cell(conversion: &Conversion) -> Cell {
    match &conversion.origin {
        RateOrigin::Identity => Cell::new("-").fg(Color::DarkGrey),
        RateOrigin::Unconverted => Cell::new("unconverted").fg(Color::Yellow),
        origin => Cell::new(format!("{:.6} ({origin})", conversion.rate)),
    }
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or_else(na_cell, |v| {
        Cell::new(format_fn(v)).set_alignment(CellAlignment::Right)
    })
}

/// Creates a dimmed "N/A" cell for values that cannot be computed.
pub fn na_cell() -> Cell {
    Cell::new("N/A")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

/// Creates a cell for displaying percentage change with color coding.
pub fn change_cell(change: f64) -> Cell {
    let text = format!("{change:.2}%");
    let color = if change >= 0.0 {
        Color::Green
    } else {
        Color::Red
    };
    Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64, with_message: bool) -> ProgressBar {
    let template = if with_message {
        "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    } else {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    };

    let pb = ProgressBar::new(len);
    let bar_style = ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(bar_style);
    pb
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}

/// Prints a note for each account counted 1:1 because no rate was available.
pub fn print_unconverted_notes<'a>(
    lines: impl Iterator<Item = (&'a str, &'a str)>,
    preferred: &str,
) {
    for (name, currency) in lines {
        println!(
            "{}",
            style_text(
                &format!("! {name}: no {currency}/{preferred} rate available, counted 1:1"),
                StyleType::Warning,
            )
        );
    }
}
