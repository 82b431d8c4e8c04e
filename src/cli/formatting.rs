//! Text renderings of amounts, progress and charts.

use chrono::{DateTime, Utc};
use tracker_core::{DebtStanding, WeeklySpending};
use tracker_domain::Money;

const BAR_WIDTH: usize = 24;
const SHORT_ID_LEN: usize = 8;

/// Renders a `[0, 1]` fraction as `[#####-----]  42%`.
pub fn progress_bar(progress: f64) -> String {
    let clamped = progress.clamp(0.0, 1.0);
    let filled = (clamped * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        (clamped * 100.0).round() as u32
    )
}

/// One bar per week, scaled to the largest bucket.
pub fn weekly_chart(
    spending: &WeeklySpending,
    format_amount: impl Fn(Money) -> String,
) -> Vec<String> {
    let peak = spending.peak();
    spending
        .labelled()
        .map(|(label, amount)| {
            let filled = amount
                .ratio_to(peak)
                .map(|ratio| (ratio * BAR_WIDTH as f64).round() as usize)
                .unwrap_or(0);
            format!(
                "{label:<7} {:<width$} {}",
                "█".repeat(filled),
                format_amount(amount),
                width = BAR_WIDTH
            )
        })
        .collect()
}

pub fn standing_label(standing: DebtStanding, format_amount: impl Fn(Money) -> String) -> String {
    match standing {
        DebtStanding::ToReceive(amount) => format!("To receive: {}", format_amount(amount)),
        DebtStanding::ToPay(amount) => format!("To pay: {}", format_amount(amount)),
        DebtStanding::Settled => "Settled".to_string(),
    }
}

pub fn short_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Leading characters of a backend id, enough to tell rows apart.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_is_clamped() {
        assert!(progress_bar(0.5).ends_with(" 50%"));
        assert!(progress_bar(3.0).ends_with("100%"));
        assert!(progress_bar(-1.0).starts_with("[-"));
    }

    #[test]
    fn chart_scales_to_peak() {
        let spending = WeeklySpending {
            buckets: [
                Money::from_cents(1_000),
                Money::ZERO,
                Money::from_cents(500),
                Money::ZERO,
            ],
        };
        let lines = weekly_chart(&spending, |amount| amount.to_string());
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Week 1"));
        assert_eq!(lines[0].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[2].matches('█').count(), BAR_WIDTH / 2);
        assert!(lines[1].ends_with("0.00"));
    }

    #[test]
    fn short_ids_are_truncated() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
