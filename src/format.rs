use chrono::{Datelike, NaiveDate};

const DATE_INPUT: &str = "%Y-%m-%d";

pub fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        None | Some(0) => "N/A".to_string(),
        Some(m) if m < 60 => format!("{m}m"),
        Some(m) => format!("{}h {}m", m / 60, m % 60),
    }
}

/// `2024-01-05` -> `January 5, 2024`; blank -> `TBA`; anything unparsable is echoed.
pub fn format_release_date(date: &str) -> String {
    let date = date.trim();
    if date.is_empty() {
        return "TBA".to_string();
    }
    match NaiveDate::parse_from_str(date, DATE_INPUT) {
        Ok(d) => d.format("%B %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

pub fn format_vote_average(vote_average: f64) -> String {
    format!("{vote_average:.1}")
}

pub fn year_from_date(date: &str) -> String {
    NaiveDate::parse_from_str(date.trim(), DATE_INPUT)
        .map(|d| d.year().to_string())
        .unwrap_or_default()
}

/// Thousands separators, e.g. `1234567` -> `1,234,567`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_money(value: u64) -> String {
    format!("${}", format_count(value))
}
