use std::fmt::Write as _;

use crate::{
    schemas::CompletionSchema,
    types::{
        itinerary::{ItineraryPlan, WeatherCondition},
        trip::{BudgetLevel, TripRequest},
    },
};

/// System instruction sent with every itinerary prompt
pub const SYSTEM_INSTRUCTION: &str = "You are an expert travel planner. You reply with a single JSON object and nothing else: no Markdown, no code fences, no commentary.";

/// A named planning strategy within a budget level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetVariant {
    pub name: &'static str,
    pub focus: &'static str,
}

const LOW_VARIANTS: [BudgetVariant; 3] = [
    BudgetVariant {
        name: "Local Experience",
        focus: "street food, markets, free walking routes and neighbourhoods locals actually spend time in",
    },
    BudgetVariant {
        name: "Smart Saver",
        focus: "the lowest total cost: free attractions, public transport and set-menu lunches",
    },
    BudgetVariant {
        name: "Group Adventure",
        focus: "shared activities that get cheaper per person in a group, hostels-friendly areas and picnics",
    },
];

const MEDIUM_VARIANTS: [BudgetVariant; 3] = [
    BudgetVariant {
        name: "Balanced Explorer",
        focus: "a mix of headline attractions and quieter local spots at mid-range prices",
    },
    BudgetVariant {
        name: "Cultural Immersion",
        focus: "museums, guided history tours, regional cuisine and performances",
    },
    BudgetVariant {
        name: "Comfort Seeker",
        focus: "convenient logistics, well-rated restaurants and a relaxed pace",
    },
];

const HIGH_VARIANTS: [BudgetVariant; 3] = [
    BudgetVariant {
        name: "Luxury Escape",
        focus: "fine dining, spa time and private transfers",
    },
    BudgetVariant {
        name: "Premium Comfort",
        focus: "skip-the-line access, top-rated restaurants and boutique experiences",
    },
    BudgetVariant {
        name: "Exclusive Experience",
        focus: "private guides, chef's tables and experiences that need advance booking",
    },
];

/// Variants available for a budget level, default first
pub fn budget_variants(level: BudgetLevel) -> &'static [BudgetVariant] {
    match level {
        BudgetLevel::Low => &LOW_VARIANTS,
        BudgetLevel::Medium => &MEDIUM_VARIANTS,
        BudgetLevel::High => &HIGH_VARIANTS,
    }
}

/// Variant by name (case-insensitive), or the level's default when absent or unknown
pub fn select_variant(level: BudgetLevel, name: Option<&str>) -> &'static BudgetVariant {
    let variants = budget_variants(level);
    name.and_then(|wanted| {
        variants
            .iter()
            .find(|variant| variant.name.eq_ignore_ascii_case(wanted.trim()))
    })
    .unwrap_or(&variants[0])
}

/// Render the user prompt for one request and variant. Pure and deterministic.
pub fn build_itinerary_prompt(request: &TripRequest, variant: &BudgetVariant) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Create a detailed day-by-day trip plan.");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Trip title: {}", request.title);
    let _ = writeln!(prompt, "Budget level: {}", request.budget);
    let _ = writeln!(prompt, "Plan style: {} (focus on {})", variant.name, variant.focus);

    let tags = request.preference_tags();
    if tags.is_empty() {
        let _ = writeln!(prompt, "Preferences: none given");
    } else {
        let _ = writeln!(prompt, "Preferences: {}", tags.join(", "));
    }

    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Destinations (in travel order):");
    for destination in request.ordered_destinations() {
        let _ = writeln!(
            prompt,
            "- {}: {} to {} ({} day(s))",
            destination.name,
            destination.start_date,
            destination.end_date,
            destination.day_count()
        );
    }
    let _ = writeln!(
        prompt,
        "Total days: {}. Produce exactly one dailyItinerary entry per calendar day, numbered from 1 without gaps across all destinations.",
        request.total_days()
    );

    let _ = writeln!(prompt);
    prompt.push_str(&field_guide());
    let _ = writeln!(prompt);
    prompt.push_str(&rules());
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "JSON schema of the response:");
    let _ = writeln!(prompt, "{}", ItineraryPlan::schema().to_prompt_json());

    prompt
}

fn field_guide() -> String {
    let mut guide = String::from("Respond with one JSON object with exactly these fields:\n");
    guide.push_str("- overview: string, two or three sentences summarising the trip\n");
    guide.push_str("- totalBudget: string, total estimated cost in USD such as \"$1,250\"\n");
    guide.push_str("- weather: object for the first destination on its arrival date\n");
    guide.push_str("  - temperature: number, degrees Celsius\n");
    guide.push_str("  - condition: string, one of the allowed conditions below\n");
    guide.push_str("  - icon: string, the icon URL for the condition from the table below\n");
    guide.push_str("  - humidity: number, percent\n");
    guide.push_str("  - windSpeed: number, km/h\n");
    guide.push_str("- dailyItinerary: array of days\n");
    guide.push_str("  - date: string, YYYY-MM-DD\n");
    guide.push_str("  - dayNumber: integer starting at 1\n");
    guide.push_str("  - location: string, destination name\n");
    guide.push_str("  - events: array of events in chronological order\n");
    guide.push_str("    - name: string\n");
    guide.push_str("    - startTime: string, 24h HH:MM\n");
    guide.push_str("    - duration: string such as \"2 hours\"\n");
    guide.push_str("    - cost: string, USD amount such as \"$25\" (\"$0\" when free)\n");
    guide.push_str("    - description: string\n");
    guide.push_str("    - type: one of \"meal\", \"attraction\", \"self-guided\", \"other\"\n");
    guide.push_str("    - bookingRequired: boolean\n");
    guide.push_str("    - bookingUrl: string, optional\n");
    guide.push_str("- practicalInfo: object\n");
    guide.push_str("  - transportation: array of strings\n");
    guide.push_str("  - documentation: array of strings\n");
    guide.push_str("  - packingList: array of strings\n");
    guide
}

fn rules() -> String {
    let conditions: Vec<&str> = WeatherCondition::ALL
        .iter()
        .map(WeatherCondition::label)
        .collect();

    let mut rules = String::from("Rules:\n");
    rules.push_str("- Every day MUST include breakfast, lunch and dinner as separate events with type \"meal\" and the words \"Breakfast\", \"Lunch\" or \"Dinner\" in their names.\n");
    rules.push_str("- All costs are strings denominated in USD with a leading \"$\", even when the destination uses another currency; pick prices typical for the destination and budget level.\n");
    let _ = writeln!(
        rules,
        "- weather.condition must be exactly one of: {}.",
        conditions.join(", ")
    );
    rules.push_str("- weather.icon must be the URL for that condition:\n");
    for condition in WeatherCondition::ALL {
        let _ = writeln!(rules, "  - {} -> {}", condition.label(), condition.icon_url());
    }
    rules.push_str("- Output raw JSON only. Do not wrap it in Markdown or add any text before or after it.\n");
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::trip::Destination;

    fn austin_request() -> TripRequest {
        TripRequest::new("Weekend Getaway", BudgetLevel::Medium)
            .with_preference("live music")
            .with_preference("bbq")
            .with_destination(Destination::new(
                "Austin",
                "2024-06-01".parse().unwrap(),
                "2024-06-02".parse().unwrap(),
            ))
    }

    #[test]
    fn test_prompt_includes_request_details() {
        let request = austin_request();
        let variant = select_variant(request.budget, None);
        let prompt = build_itinerary_prompt(&request, variant);

        assert!(prompt.contains("Trip title: Weekend Getaway"));
        assert!(prompt.contains("Budget level: MEDIUM"));
        assert!(prompt.contains("Balanced Explorer"));
        assert!(prompt.contains("live music, bbq"));
        assert!(prompt.contains("- Austin: 2024-06-01 to 2024-06-02 (2 day(s))"));
        assert!(prompt.contains("Total days: 2"));
    }

    #[test]
    fn test_prompt_states_constraints() {
        let request = austin_request();
        let prompt = build_itinerary_prompt(&request, select_variant(request.budget, None));

        assert!(prompt.contains("breakfast, lunch and dinner"));
        assert!(prompt.contains("Partly Cloudy -> https://openweathermap.org/img/wn/02d@2x.png"));
        assert!(prompt.contains("Light Rain"));
        assert!(prompt.contains("USD"));
        assert!(prompt.contains("\"dailyItinerary\""));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let request = austin_request();
        let variant = select_variant(request.budget, Some("Comfort Seeker"));
        assert_eq!(
            build_itinerary_prompt(&request, variant),
            build_itinerary_prompt(&request, variant)
        );
    }

    #[test]
    fn test_variant_selection() {
        let names: Vec<&str> = budget_variants(BudgetLevel::Low)
            .iter()
            .map(|variant| variant.name)
            .collect();
        assert_eq!(names, vec!["Local Experience", "Smart Saver", "Group Adventure"]);

        assert_eq!(select_variant(BudgetLevel::Low, Some("smart saver")).name, "Smart Saver");
        assert_eq!(select_variant(BudgetLevel::High, Some("unknown")).name, "Luxury Escape");
        assert_eq!(select_variant(BudgetLevel::High, None).name, "Luxury Escape");
    }

    #[test]
    fn test_empty_preferences() {
        let mut request = austin_request();
        request.preferences.clear();
        let prompt = build_itinerary_prompt(&request, select_variant(request.budget, None));
        assert!(prompt.contains("Preferences: none given"));
    }
}
