use super::ui;
use crate::App;
use crate::core::currency::{CurrencyPair, RateOrigin, RateQuote};
use anyhow::{Result, bail};
use chrono::NaiveDate;

pub async fn run(app: &App, from: &str, to: &str, date: Option<NaiveDate>) -> Result<()> {
    if from.trim().is_empty() || to.trim().is_empty() {
        bail!("Both currency codes are required");
    }
    let pair = CurrencyPair::new(from, to);
    let date = date.unwrap_or_else(|| app.converter.today());
    let quote = app.converter.rate(&pair, date).await;
    println!("{}", describe_rate(&pair, date, &quote));
    Ok(())
}

pub(crate) fn describe_rate(pair: &CurrencyPair, date: NaiveDate, quote: &RateQuote) -> String {
    let line = format!(
        "1 {} = {:.6} {} on {date}",
        pair.base(),
        quote.rate,
        pair.quote()
    );
    match &quote.origin {
        RateOrigin::Unconverted => format!(
            "{line} {}",
            ui::style_text("(no provider available, 1:1 fallback)", ui::StyleType::Warning)
        ),
        origin => format!(
            "{line} {}",
            ui::style_text(&format!("({origin})"), ui::StyleType::Subtle)
        ),
    }
}
