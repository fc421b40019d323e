use crate::completion_schema;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured day-by-day itinerary returned by the completion model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[completion_schema(name = "ItineraryPlan")]
pub struct ItineraryPlan {
    /// Short narrative summary of the whole trip
    pub overview: String,
    /// Total estimated cost in USD; recomputed from the itemized event costs
    pub total_budget: String,
    /// Expected weather at the first destination on the arrival date
    pub weather: WeatherSnapshot,
    /// One entry per calendar day of the trip, in order
    pub daily_itinerary: Vec<DayPlan>,
    /// Practical travel information
    pub practical_info: PracticalInfo,
}

/// Plan for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    /// Calendar date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// 1-based day counter, continuous across all destinations
    pub day_number: u32,
    /// Destination the day is spent in
    pub location: String,
    /// Events in chronological order
    pub events: Vec<Event>,
}

/// A scheduled activity, meal or free block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: String,
    /// Local start time in 24h HH:MM format
    pub start_time: String,
    /// Free-text duration such as "2 hours"
    pub duration: String,
    /// USD cost string such as "$25"
    pub cost: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub booking_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Meal,
    Attraction,
    SelfGuided,
    Other,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Meal => "meal",
            EventKind::Attraction => "attraction",
            EventKind::SelfGuided => "self-guided",
            EventKind::Other => "other",
        }
    }
}

/// Weather on arrival, rendered as a small card by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Degrees Celsius
    pub temperature: f64,
    pub condition: WeatherCondition,
    /// Icon image URL matching the condition
    pub icon: String,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
}

impl WeatherSnapshot {
    pub fn new(temperature: f64, condition: WeatherCondition, humidity: f64, wind_speed: f64) -> Self {
        Self {
            temperature,
            condition,
            icon: condition.icon_url(),
            humidity,
            wind_speed,
        }
    }
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self::new(22.0, WeatherCondition::PartlyCloudy, 65.0, 12.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum WeatherCondition {
    Sunny,
    #[serde(rename = "Partly Cloudy")]
    PartlyCloudy,
    Cloudy,
    #[serde(rename = "Light Rain")]
    LightRain,
    Thunderstorm,
    Snowy,
    Windy,
    Clear,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 8] = [
        WeatherCondition::Sunny,
        WeatherCondition::PartlyCloudy,
        WeatherCondition::Cloudy,
        WeatherCondition::LightRain,
        WeatherCondition::Thunderstorm,
        WeatherCondition::Snowy,
        WeatherCondition::Windy,
        WeatherCondition::Clear,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "Sunny",
            WeatherCondition::PartlyCloudy => "Partly Cloudy",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::LightRain => "Light Rain",
            WeatherCondition::Thunderstorm => "Thunderstorm",
            WeatherCondition::Snowy => "Snowy",
            WeatherCondition::Windy => "Windy",
            WeatherCondition::Clear => "Clear",
        }
    }

    /// OpenWeatherMap icon code
    pub fn icon_code(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "01d",
            WeatherCondition::PartlyCloudy => "02d",
            WeatherCondition::Cloudy => "03d",
            WeatherCondition::LightRain => "10d",
            WeatherCondition::Thunderstorm => "11d",
            WeatherCondition::Snowy => "13d",
            WeatherCondition::Windy => "50d",
            WeatherCondition::Clear => "01n",
        }
    }

    pub fn icon_url(&self) -> String {
        format!(
            "https://openweathermap.org/img/wn/{}@2x.png",
            self.icon_code()
        )
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PracticalInfo {
    pub transportation: Vec<String>,
    pub documentation: Vec<String>,
    pub packing_list: Vec<String>,
}

impl ItineraryPlan {
    pub fn day_count(&self) -> usize {
        self.daily_itinerary.len()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.daily_itinerary.iter().flat_map(|day| day.events.iter())
    }
}
