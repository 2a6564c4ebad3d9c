use super::ui;
use crate::App;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use tracing::info;

/// Deletes the entry saved for `date`.
pub async fn run(app: &App, date: NaiveDate) -> Result<()> {
    if !app.store.remove(date).await? {
        bail!("No entry recorded for {date}");
    }
    info!(%date, "Removed entry");
    println!(
        "Removed entry for {}",
        ui::style_text(&date.to_string(), ui::StyleType::Title)
    );
    Ok(())
}
