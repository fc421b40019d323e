use chrono::NaiveDate;

use crate::{
    services::budget::recalculate_total_budget,
    types::{
        itinerary::{DayPlan, Event, EventKind, ItineraryPlan, PracticalInfo, WeatherSnapshot},
        trip::TripRequest,
    },
};

/// Opening words of every synthesized overview, so renderers can flag the plan.
pub const FALLBACK_OVERVIEW_PREFIX: &str = "Best-effort default itinerary";

struct EventTemplate {
    start_time: &'static str,
    duration: &'static str,
    cost: &'static str,
    kind: EventKind,
    name: &'static str,
    description: &'static str,
}

const PLACE: &str = "{place}";

const DAY_TEMPLATE: [EventTemplate; 5] = [
    EventTemplate {
        start_time: "08:00",
        duration: "1 hour",
        cost: "$15",
        kind: EventKind::Meal,
        name: "Breakfast at a local café in {place}",
        description: "Start the day with a relaxed breakfast at a neighbourhood café in {place}.",
    },
    EventTemplate {
        start_time: "09:30",
        duration: "2.5 hours",
        cost: "$20",
        kind: EventKind::SelfGuided,
        name: "Morning exploration of {place}",
        description: "Walk the central districts of {place} and get your bearings.",
    },
    EventTemplate {
        start_time: "12:30",
        duration: "1.5 hours",
        cost: "$25",
        kind: EventKind::Meal,
        name: "Lunch at a popular {place} restaurant",
        description: "Try regional dishes at a well-reviewed restaurant in {place}.",
    },
    EventTemplate {
        start_time: "14:30",
        duration: "3 hours",
        cost: "$30",
        kind: EventKind::Attraction,
        name: "Afternoon activity in {place}",
        description: "Visit a museum, landmark or park that {place} is known for.",
    },
    EventTemplate {
        start_time: "19:00",
        duration: "2 hours",
        cost: "$40",
        kind: EventKind::Meal,
        name: "Dinner at a recommended {place} restaurant",
        description: "End the day with dinner featuring local specialities of {place}.",
    },
];

/// The fixed five-event day for one destination and date.
pub fn fallback_day(location: &str, date: NaiveDate, day_number: u32) -> DayPlan {
    let events = DAY_TEMPLATE
        .iter()
        .map(|template| Event {
            name: template.name.replace(PLACE, location),
            start_time: template.start_time.to_string(),
            duration: template.duration.to_string(),
            cost: template.cost.to_string(),
            description: template.description.replace(PLACE, location),
            kind: template.kind,
            booking_required: false,
            booking_url: None,
        })
        .collect();

    DayPlan {
        date,
        day_number,
        location: location.to_string(),
        events,
    }
}

/// Build a complete, valid plan from the request alone. Never fails.
pub fn synthesize_fallback(request: &TripRequest) -> ItineraryPlan {
    let mut daily_itinerary = Vec::with_capacity(request.total_days());
    let mut day_number = 0u32;

    for destination in request.ordered_destinations() {
        for date in destination.dates() {
            day_number += 1;
            daily_itinerary.push(fallback_day(&destination.name, date, day_number));
        }
    }

    let mut plan = ItineraryPlan {
        overview: fallback_overview(request),
        total_budget: String::new(),
        weather: WeatherSnapshot::default(),
        daily_itinerary,
        practical_info: default_practical_info(),
    };
    recalculate_total_budget(&mut plan);
    plan
}

pub fn is_fallback_overview(overview: &str) -> bool {
    overview.starts_with(FALLBACK_OVERVIEW_PREFIX)
}

fn fallback_overview(request: &TripRequest) -> String {
    let places: Vec<&str> = request
        .ordered_destinations()
        .iter()
        .map(|destination| destination.name.as_str())
        .collect();

    format!(
        "{} for \"{}\" ({}). We could not generate a tailored plan right now, so this schedule uses a standard day of meals and sightseeing. Try generating again for personalised recommendations.",
        FALLBACK_OVERVIEW_PREFIX,
        request.title,
        places.join(" → ")
    )
}

fn default_practical_info() -> PracticalInfo {
    PracticalInfo {
        transportation: vec![
            "Research local transportation options for getting around.".to_string(),
        ],
        documentation: vec![
            "Check if you need a visa or other documentation for your destination.".to_string(),
        ],
        packing_list: vec![
            "Pack appropriate clothing for the weather at your destination.".to_string(),
        ],
    }
}
