//! Locale-style currency rendering for display.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grouping {
    /// 1,234,567
    Thousands,
    /// 12,34,567
    Indian,
}

#[derive(Debug, Clone, Copy)]
struct CurrencyStyle {
    symbol: &'static str,
    prefix: bool,
    spaced: bool,
    group: &'static str,
    decimal: &'static str,
    fraction_digits: usize,
    grouping: Grouping,
}

const fn prefixed(symbol: &'static str) -> CurrencyStyle {
    CurrencyStyle {
        symbol,
        prefix: true,
        spaced: false,
        group: ",",
        decimal: ".",
        fraction_digits: 2,
        grouping: Grouping::Thousands,
    }
}

const fn continental(symbol: &'static str, group: &'static str) -> CurrencyStyle {
    CurrencyStyle {
        symbol,
        prefix: false,
        spaced: true,
        group,
        decimal: ",",
        fraction_digits: 2,
        grouping: Grouping::Thousands,
    }
}

fn style_for(code: &str) -> Option<CurrencyStyle> {
    let style = match code {
        "USD" => prefixed("$"),
        "GBP" => prefixed("£"),
        "CAD" => prefixed("CA$"),
        "AUD" => prefixed("A$"),
        "NZD" => prefixed("NZ$"),
        "HKD" => prefixed("HK$"),
        "SGD" => prefixed("S$"),
        "MXN" => prefixed("MX$"),
        "CNY" => prefixed("CN¥"),
        "ILS" => prefixed("₪"),
        "JPY" => CurrencyStyle {
            fraction_digits: 0,
            ..prefixed("¥")
        },
        "KRW" => CurrencyStyle {
            fraction_digits: 0,
            ..prefixed("₩")
        },
        "INR" => CurrencyStyle {
            grouping: Grouping::Indian,
            ..prefixed("₹")
        },
        "CHF" => CurrencyStyle {
            spaced: true,
            group: "’",
            ..prefixed("CHF")
        },
        "BRL" => CurrencyStyle {
            prefix: true,
            ..continental("R$", ".")
        },
        "TRY" => CurrencyStyle {
            prefix: true,
            spaced: false,
            ..continental("₺", ".")
        },
        "ZAR" => CurrencyStyle {
            prefix: true,
            ..continental("R", " ")
        },
        "EUR" => continental("€", "."),
        "DKK" => continental("kr.", "."),
        "SEK" => continental("kr", " "),
        "NOK" => continental("kr", " "),
        "PLN" => continental("zł", " "),
        "CZK" => continental("Kč", " "),
        "HUF" => continental("Ft", " "),
        _ => return None,
    };
    Some(style)
}

fn group_digits(int_part: &str, separator: &str, grouping: Grouping) -> String {
    let digits: Vec<char> = int_part.chars().collect();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 2 * separator.len());
    for (i, ch) in digits.iter().enumerate() {
        out.push(*ch);
        let remaining = len - i - 1;
        let boundary = match grouping {
            Grouping::Thousands => remaining > 0 && remaining % 3 == 0,
            Grouping::Indian => {
                remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)
            }
        };
        if boundary {
            out.push_str(separator);
        }
    }
    out
}

fn render_number(amount: f64, style: &CurrencyStyle) -> (bool, String) {
    let fixed = format!("{:.*}", style.fraction_digits, amount.abs());
    let negative = amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };
    let mut number = group_digits(int_part, style.group, style.grouping);
    if let Some(frac) = frac_part {
        number.push_str(style.decimal);
        number.push_str(frac);
    }
    (negative, number)
}

/// Formats `amount` in the conventions of `currency_code`.
///
/// Unknown codes render as `1,234.56 XYZ`.
pub fn format_currency(amount: f64, currency_code: &str) -> String {
    let code = currency_code.trim().to_uppercase();
    if !amount.is_finite() {
        return format!("{amount} {code}");
    }

    let Some(style) = style_for(&code) else {
        let (negative, number) = render_number(amount, &prefixed(""));
        let sign = if negative { "-" } else { "" };
        return format!("{sign}{number} {code}");
    };

    let (negative, number) = render_number(amount, &style);
    let sign = if negative { "-" } else { "" };
    let space = if style.spaced { " " } else { "" };
    if style.prefix {
        format!("{sign}{}{space}{number}", style.symbol)
    } else {
        format!("{sign}{number}{space}{}", style.symbol)
    }
}
