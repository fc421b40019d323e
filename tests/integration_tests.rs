use async_trait::async_trait;
use serde_json::json;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;
use trip_planner_rs::{
    services::{format_usd, itemized_total, is_fallback_overview},
    BudgetLevel, CompletionBackend, CompletionRequest, Destination, EventKind, PipelineStep,
    PlanSource, Planner, PlannerConfig, PlannerError, TripRequest,
};

/// Replies with the queued texts in order, then errors
struct QueuedBackend {
    replies: Vec<String>,
    calls: AtomicUsize,
}

impl QueuedBackend {
    fn new(replies: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            replies,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for QueuedBackend {
    async fn complete(&self, _request: &CompletionRequest) -> trip_planner_rs::Result<String> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .get(idx)
            .cloned()
            .ok_or_else(|| PlannerError::Completion("upstream unavailable".to_string()))
    }
}

fn date(text: &str) -> chrono::NaiveDate {
    text.parse().unwrap()
}

fn weekend_getaway() -> TripRequest {
    TripRequest::new("Weekend Getaway", BudgetLevel::Medium)
        .with_preference("food")
        .with_preference("music")
        .with_destination(Destination::new(
            "Austin",
            date("2024-06-01"),
            date("2024-06-02"),
        ))
}

fn austin_plan() -> serde_json::Value {
    let day = |date: &str, number: u32| {
        json!({
            "date": date,
            "dayNumber": number,
            "location": "Austin",
            "events": [
                {"name": "Breakfast tacos at Veracruz", "startTime": "08:30", "duration": "1 hour",
                 "cost": "$14", "description": "Migas tacos.", "type": "meal", "bookingRequired": false},
                {"name": "Barton Springs Pool", "startTime": "10:00", "duration": "2 hours",
                 "cost": "$9", "description": "Spring-fed pool.", "type": "attraction", "bookingRequired": false},
                {"name": "Lunch at a food truck park", "startTime": "13:00", "duration": "1 hour",
                 "cost": "$18", "description": "Pick a truck.", "type": "meal", "bookingRequired": false},
                {"name": "Dinner and live music on Sixth Street", "startTime": "19:30", "duration": "3 hours",
                 "cost": "$55", "description": "Texas BBQ then a show.", "type": "meal", "bookingRequired": true,
                 "bookingUrl": "https://example.com/book"}
            ]
        })
    };

    json!({
        "overview": "Two days of tacos, springs and live music in Austin.",
        "totalBudget": "around $300",
        "weather": {
            "temperature": 33,
            "condition": "Sunny",
            "icon": "https://openweathermap.org/img/wn/01d@2x.png",
            "humidity": 58,
            "windSpeed": 11
        },
        "dailyItinerary": [day("2024-06-01", 1), day("2024-06-02", 2)],
        "practicalInfo": {
            "transportation": ["Rideshare or scooters downtown"],
            "documentation": ["Photo ID"],
            "packingList": ["Sunscreen", "Swimsuit", "Comfortable shoes"]
        }
    })
}

fn quick_config() -> PlannerConfig {
    PlannerConfig::default()
        .with_retry_backoff(Duration::from_millis(1))
        .with_attempt_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn test_weekend_getaway_scenario() {
    let reply = format!(
        "Sure! Here is your itinerary:\n```json\n{}\n```",
        serde_json::to_string_pretty(&austin_plan()).unwrap()
    );
    let backend = QueuedBackend::new(vec![reply]);
    let planner = Planner::with_backend(backend.clone(), quick_config());

    let result = planner.generate(&weekend_getaway()).await.unwrap();

    assert_eq!(result.source, PlanSource::Generated);
    assert_eq!(backend.calls(), 1);

    let plan = &result.plan;
    assert_eq!(plan.day_count(), 2);
    let numbers: Vec<u32> = plan.daily_itinerary.iter().map(|d| d.day_number).collect();
    assert_eq!(numbers, vec![1, 2]);

    for day in &plan.daily_itinerary {
        let meals = day
            .events
            .iter()
            .filter(|event| event.kind == EventKind::Meal)
            .count();
        assert!(meals >= 3, "day {} has {} meals", day.day_number, meals);
    }

    assert_eq!(plan.total_budget, "$192.00");
    assert_eq!(plan.total_budget, format_usd(itemized_total(plan)));
}

#[tokio::test]
async fn test_fallback_guarantee_across_destinations() {
    let backend = QueuedBackend::new(vec![
        "I'm sorry, I can't do that.".to_string(),
        "{\"overview\": \"truncated".to_string(),
    ]);
    let planner = Planner::with_backend(backend.clone(), quick_config());

    let request = TripRequest::new("Iberia", BudgetLevel::Low)
        .with_destination(
            Destination::new("Madrid", date("2024-09-01"), date("2024-09-03")).with_order(2),
        )
        .with_destination(
            Destination::new("Lisbon", date("2024-08-29"), date("2024-08-31")).with_order(1),
        );

    let result = planner.generate(&request).await.unwrap();

    assert!(result.is_fallback());
    assert_eq!(backend.calls(), 2);
    assert_eq!(result.rejections(), vec!["PARSE_ERROR", "PARSE_ERROR"]);

    let plan = &result.plan;
    assert!(is_fallback_overview(&plan.overview));
    assert_eq!(plan.day_count(), request.total_days());
    assert_eq!(plan.daily_itinerary[0].location, "Lisbon");
    assert_eq!(plan.daily_itinerary[3].location, "Madrid");
    assert_eq!(plan.daily_itinerary[5].day_number, 6);
    assert_eq!(plan.total_budget, "$780.00");
}

#[tokio::test]
async fn test_steps_record_every_transition() {
    let backend = QueuedBackend::new(vec![
        String::new(),
        austin_plan().to_string(),
    ]);
    let planner = Planner::with_backend(backend, quick_config());

    let result = planner.generate(&weekend_getaway()).await.unwrap();

    assert!(matches!(
        result.steps.as_slice(),
        [
            PipelineStep::Attempting { attempt: 1, .. },
            PipelineStep::Retrying { attempt: 1, .. },
            PipelineStep::Attempting { attempt: 2, .. },
            PipelineStep::Validating { attempt: 2, .. },
            PipelineStep::Succeeded { attempt: 2, days: 2 },
        ]
    ));
    assert!(result.replay().contains("Attempt 2 accepted with 2 days"));
}

#[tokio::test]
async fn test_reply_missing_a_day_is_retried() {
    let mut short = austin_plan();
    short["dailyItinerary"].as_array_mut().unwrap().pop();

    let backend = QueuedBackend::new(vec![short.to_string(), austin_plan().to_string()]);
    let planner = Planner::with_backend(backend.clone(), quick_config());

    let result = planner.generate(&weekend_getaway()).await.unwrap();

    assert_eq!(result.source, PlanSource::Generated);
    assert_eq!(backend.calls(), 2);
    assert_eq!(result.rejections(), vec!["SCHEMA_ERROR"]);
    assert_eq!(result.plan.day_count(), 2);
}

#[tokio::test]
async fn test_reply_missing_practical_info_is_retried() {
    let mut incomplete = austin_plan();
    incomplete.as_object_mut().unwrap().remove("practicalInfo");

    let backend = QueuedBackend::new(vec![incomplete.to_string(), austin_plan().to_string()]);
    let planner = Planner::with_backend(backend.clone(), quick_config());

    let result = planner.generate(&weekend_getaway()).await.unwrap();

    assert_eq!(result.source, PlanSource::Generated);
    assert_eq!(backend.calls(), 2);
    assert_eq!(result.rejections(), vec!["SCHEMA_ERROR"]);
    assert!(result.steps.iter().any(|step| matches!(
        step,
        PipelineStep::Retrying { reason, .. } if reason.contains("practicalInfo")
    )));
    assert_eq!(
        result.plan.practical_info.packing_list,
        vec!["Sunscreen", "Swimsuit", "Comfortable shoes"]
    );
}

#[tokio::test]
async fn test_end_to_end_against_mock_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "id": "chatcmpl-42",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": austin_plan().to_string()},
            "finish_reason": "stop"
        }]
    });
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer gsk-test")
        .match_body(mockito::Matcher::PartialJson(json!({
            "model": "llama-3.3-70b-versatile"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let planner = Planner::from_config(
        quick_config()
            .with_api_key("gsk-test")
            .with_base_url(server.url()),
    )
    .unwrap();

    let result = planner.generate(&weekend_getaway()).await.unwrap();

    assert_eq!(result.source, PlanSource::Generated);
    assert_eq!(result.plan.daily_itinerary[1].events.len(), 4);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_credentials_surface_as_config_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"Invalid API Key"}}"#)
        .create_async()
        .await;

    let planner = Planner::from_config(
        quick_config()
            .with_api_key("gsk-wrong")
            .with_base_url(server.url()),
    )
    .unwrap();

    let err = planner.generate(&weekend_getaway()).await.unwrap_err();
    assert_eq!(err.error_code(), "CONFIG_ERROR");
    assert!(!err.is_retryable());
}

#[test]
fn test_blocking_generation_with_tokio_test() {
    let backend = QueuedBackend::new(vec![austin_plan().to_string()]);
    let planner = Planner::with_backend(backend, quick_config());

    let result = tokio_test::block_on(planner.generate(&weekend_getaway())).unwrap();
    assert_eq!(result.variant, "Balanced Explorer");
    assert!(!result.is_fallback());
}
