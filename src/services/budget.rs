use regex::Regex;
use std::sync::OnceLock;

use crate::types::itinerary::ItineraryPlan;

/// Numeric value of a free-text cost string such as "$25" or "1,200 USD".
///
/// The first number in the text wins, thousands separators included, so
/// "Approx. $25" is 25 and a range like "$20-30" takes its lower bound.
/// Text with no number at all ("Free", "Varies") counts as zero.
pub fn parse_cost(cost: &str) -> f64 {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let number =
        NUMBER.get_or_init(|| Regex::new(r"-?\d[\d,]*(?:\.\d+)?").expect("cost pattern is valid"));

    number
        .find(cost)
        .and_then(|token| token.as_str().replace(',', "").parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Sum of every event cost across all days.
pub fn itemized_total(plan: &ItineraryPlan) -> f64 {
    plan.events().map(|event| parse_cost(&event.cost)).sum()
}

/// Overwrite the model-reported total with the itemized sum and return it.
pub fn recalculate_total_budget(plan: &mut ItineraryPlan) -> f64 {
    let total = itemized_total(plan);
    plan.total_budget = format_usd(total);
    total
}

/// `$1,234.50` style formatting.
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let remainder = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{remainder:02}")
}
