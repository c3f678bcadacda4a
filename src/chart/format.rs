/// Currency symbol used for cost axes and savings labels.
pub const CURRENCY_SYMBOL: &str = "$";

/// Format an amount with zero decimals and the symbol in front: `$70`,
/// `-$12`. Halves round to even (`44.5` → `$44`). Values that round to zero
/// never carry a sign.
pub fn format_currency(amount: f64) -> String {
    let digits = format!("{:.0}", amount.abs());
    let sign = if amount < 0.0 && digits != "0" { "-" } else { "" };
    format!("{sign}{CURRENCY_SYMBOL}{digits}")
}

/// Energy reading for hover text: `742 kWh`.
pub fn format_kwh(value: f64) -> String {
    format!("{value:.0} kWh")
}

/// Month under a horizontal plot position, snapping to the nearest index.
pub fn month_at(months: &[String], x: f64) -> Option<&str> {
    let index = x.round();
    if !index.is_finite() || index < 0.0 {
        return None;
    }
    months.get(index as usize).map(String::as_str)
}

/// Integer part of a value, truncated toward zero (`1234.9` → `1234`).
pub fn truncated_label(value: f64) -> String {
    format!("{}", value.trunc() as i64)
}
