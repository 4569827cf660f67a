use crate::api::models::CryptoSummary;

/// `$1,234.56`; negative amounts render as `-$1,234.56`.
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "-".to_string();
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // Tiny negatives round to zero and print unsigned
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}%", v),
        _ => "n/a".to_string(),
    }
}

/// One fixed-width table row for terminal output.
pub fn format_summary_row(position: usize, coin: &CryptoSummary) -> String {
    format!(
        "{:>4}  {:<28} {:>16} {:>22} {:>14}",
        position,
        format!("{} ({})", coin.name, coin.symbol.to_uppercase()),
        format_usd(coin.current_price),
        format_usd(coin.market_cap),
        format_usd(coin.price_change_24h),
    )
}

pub fn summary_header() -> String {
    format!(
        "{:>4}  {:<28} {:>16} {:>22} {:>14}",
        "#", "Name (Symbol)", "Price", "Market Cap", "24h Change"
    )
}
