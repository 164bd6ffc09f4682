//! Display formatting for figures. One abbreviation policy for every view.

/// `1234567.0` -> `1,234,567`; keeps at most `max_fraction` digits, trailing
/// zeros dropped.
pub fn group_thousands(value: f64, max_fraction: usize) -> String {
    let formatted = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), f.trim_end_matches('0').to_string()),
        None => (formatted.clone(), String::new()),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let negative = value < 0.0 && (grouped.chars().any(|c| c != '0' && c != ',') || !frac_part.is_empty());
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(&frac_part);
    }
    out
}

fn abbreviate(scaled: f64, suffix: &str) -> String {
    let formatted = format!("{:.1}", scaled);
    let trimmed = formatted.strip_suffix(".0").unwrap_or(&formatted);
    format!("{}{}", trimmed, suffix)
}

/// B/M/K abbreviation by magnitude, one decimal, `.0` dropped. Below a
/// thousand the value is grouped with up to three decimals.
pub fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000_000.0 {
        abbreviate(value / 1_000_000_000.0, "B")
    } else if magnitude >= 1_000_000.0 {
        abbreviate(value / 1_000_000.0, "M")
    } else if magnitude >= 1_000.0 {
        abbreviate(value / 1_000.0, "K")
    } else {
        group_thousands(value, 3)
    }
}

pub fn format_currency(value: f64) -> String {
    format!("${}", format_number(value))
}

/// Half-up rounding, matching how the dashboard rounds for display.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Whole dollars for table cells; a zero cell renders as `-`.
pub fn format_whole_currency(value: f64) -> String {
    if value == 0.0 {
        return "-".to_string();
    }
    format!("${}", group_thousands(round_half_up(value), 0))
}

/// Signed whole percent for YoY cells; zero renders as `-`.
pub fn format_yoy(value: f64) -> String {
    if value == 0.0 {
        return "-".to_string();
    }
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{}{}%", sign, round_half_up(value))
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}
