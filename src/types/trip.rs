use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PlannerError, Result};

/// Spending level chosen for the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetLevel {
    Low,
    Medium,
    High,
}

impl BudgetLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetLevel::Low => "LOW",
            BudgetLevel::Medium => "MEDIUM",
            BudgetLevel::High => "HIGH",
        }
    }
}

impl Default for BudgetLevel {
    fn default() -> Self {
        BudgetLevel::Medium
    }
}

impl fmt::Display for BudgetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BudgetLevel {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(BudgetLevel::Low),
            "MEDIUM" => Ok(BudgetLevel::Medium),
            "HIGH" => Ok(BudgetLevel::High),
            other => Err(PlannerError::InvalidRequest(format!(
                "unknown budget level `{other}` (expected LOW, MEDIUM or HIGH)"
            ))),
        }
    }
}

/// One stop of the trip with an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Position within the trip when the caller tracks ordering explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl Destination {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date,
            order: None,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    /// Number of calendar days covered, both ends included. Zero for an inverted range.
    pub fn day_count(&self) -> usize {
        let span = (self.end_date - self.start_date).num_days();
        if span < 0 {
            0
        } else {
            span as usize + 1
        }
    }

    /// Every date from start to end inclusive.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |date| *date <= self.end_date)
    }
}

/// Planning request handed to the pipeline by the route handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub title: String,
    pub budget: BudgetLevel,
    #[serde(default)]
    pub preferences: Vec<String>,
    pub destinations: Vec<Destination>,
}

impl TripRequest {
    pub fn new(title: impl Into<String>, budget: BudgetLevel) -> Self {
        Self {
            title: title.into(),
            budget,
            preferences: Vec::new(),
            destinations: Vec::new(),
        }
    }

    pub fn with_preference(mut self, preference: impl Into<String>) -> Self {
        let preference = preference.into();
        if !self.preferences.contains(&preference) {
            self.preferences.push(preference);
        }
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destinations.push(destination);
        self
    }

    /// Check the request invariants: at least one destination and no inverted date range.
    pub fn validate(&self) -> Result<()> {
        if self.destinations.is_empty() {
            return Err(PlannerError::InvalidRequest(
                "trip must contain at least one destination".to_string(),
            ));
        }

        for destination in &self.destinations {
            if destination.name.trim().is_empty() {
                return Err(PlannerError::InvalidRequest(
                    "destination name must not be empty".to_string(),
                ));
            }
            if destination.end_date < destination.start_date {
                return Err(PlannerError::InvalidRequest(format!(
                    "destination `{}` ends ({}) before it starts ({})",
                    destination.name, destination.end_date, destination.start_date
                )));
            }
        }

        Ok(())
    }

    /// Destinations in travel order. Explicit `order` values win; ties keep input order.
    pub fn ordered_destinations(&self) -> Vec<&Destination> {
        let mut ordered: Vec<&Destination> = self.destinations.iter().collect();
        ordered.sort_by_key(|destination| destination.order.unwrap_or(u32::MAX));
        ordered
    }

    /// Every trip date in travel order, one entry per itinerary day.
    pub fn trip_dates(&self) -> Vec<NaiveDate> {
        self.ordered_destinations()
            .into_iter()
            .flat_map(|destination| destination.dates())
            .collect()
    }

    /// Total number of calendar days across all destinations.
    pub fn total_days(&self) -> usize {
        self.destinations.iter().map(Destination::day_count).sum()
    }

    /// Distinct, non-empty preference tags in first-seen order.
    pub fn preference_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for tag in self.preferences.iter().map(|tag| tag.trim()) {
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}
