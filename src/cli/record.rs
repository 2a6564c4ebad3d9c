use super::{show, ui};
use crate::App;
use crate::core::model::NetWorthEntry;
use crate::core::valuation::build_entry;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::info;

/// Parses an `ID=AMOUNT` pair from the command line.
pub fn parse_balance(input: &str) -> Result<(String, f64), String> {
    let (id, amount) = input
        .split_once('=')
        .ok_or_else(|| format!("expected ID=AMOUNT, got '{input}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing account id in '{input}'"));
    }
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| format!("invalid amount '{}' for {id}", amount.trim()))?;
    if !amount.is_finite() {
        return Err(format!("amount for {id} must be a finite number"));
    }
    Ok((id.to_string(), amount))
}

/// Values the given balances and saves them as the entry for `date` (today by
/// default). Balances already saved for that date are kept unless overridden.
pub async fn run(
    app: &App,
    date: Option<NaiveDate>,
    balances: &[(String, f64)],
) -> Result<NetWorthEntry> {
    if balances.is_empty() {
        bail!("No balances given; pass at least one --balance ID=AMOUNT");
    }
    for (id, _) in balances {
        if app.config.account(id).is_none() {
            bail!("Unknown account id: {id}");
        }
    }

    let date = date.unwrap_or_else(|| app.converter.today());
    let existing = app.store.get(date).await?;
    let balances: BTreeMap<String, f64> = balances.iter().cloned().collect();

    let (entry, valuation) = build_entry(
        &app.converter,
        &app.config.accounts,
        &balances,
        &app.config.currency,
        date,
        existing.as_ref(),
    )
    .await?;
    app.store.put(&entry).await?;
    info!(%date, net_worth = entry.net_worth, "Recorded entry");

    let verb = if existing.is_some() { "Updated" } else { "Recorded" };
    println!(
        "\n{verb} entry for {}",
        ui::style_text(&date.to_string(), ui::StyleType::Title)
    );
    show::display_valuation(&valuation);
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balance() {
        assert_eq!(
            parse_balance("checking=1200.50"),
            Ok(("checking".to_string(), 1200.5))
        );
        assert_eq!(
            parse_balance(" card = -35 "),
            Ok(("card".to_string(), -35.0))
        );
    }

    #[test]
    fn test_parse_balance_rejects_malformed_input() {
        assert!(parse_balance("checking").unwrap_err().contains("ID=AMOUNT"));
        assert!(parse_balance("=100").unwrap_err().contains("missing account id"));
        assert!(parse_balance("checking=abc").unwrap_err().contains("invalid amount"));
        assert!(parse_balance("checking=NaN").unwrap_err().contains("finite"));
        assert!(parse_balance("checking=inf").unwrap_err().contains("finite"));
    }
}
