//! Price display.

/// Format a price with zero decimals, comma thousands separators, and a
/// currency suffix: `6854109.6` becomes `6,854,110 EGP`.
pub fn format_price(price: f64, currency: &str) -> String {
    // `{:.0}` rounds ties to even.
    let digits = format!("{:.0}", price.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if price < 0.0 && digits != "0" { "-" } else { "" };
    if currency.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped} {currency}")
    }
}
