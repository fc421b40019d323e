pub mod itinerary;
pub mod response;
pub mod result;
pub mod stored;
pub mod trip;

pub use itinerary::{
    DayPlan, Event, EventKind, ItineraryPlan, PracticalInfo, WeatherCondition, WeatherSnapshot,
};
pub use response::deserialize_structured_response;
pub use result::{GenerationResult, PlanSource, PlanVariant, PlanVariants};
pub use stored::decode_stored_plan;
pub use trip::{BudgetLevel, Destination, TripRequest};
