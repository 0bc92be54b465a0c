//! Plan generation against an unreliable text backend.
//!
//! The retry controller here owns the raw-text-to-plan lifecycle: it builds
//! the prompt, drives up to `1 + MAX_RETRIES` generation attempts through
//! the repair cascade, escalates the "JSON only" instruction between
//! attempts, and synthesizes a deterministic fallback plan when the backend
//! never produces anything usable. Callers always get a full plan back.

use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;

use crate::clients::llm::LlmClient;
use crate::models::plan::RawDay;
use crate::models::requests::Preferences;
use crate::models::weather::WeatherReport;
use crate::services::location_service::LocationContext;
use crate::utils::json_repair;
use crate::utils::validators::validate_parsed_plan;

/// Extra attempts beyond the first.
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_SECS: u64 = 2;

const REGENERATION_PROMPT: &str =
    "Repeat the last itinerary in valid JSON only with no comments or explanations";

const FALLBACK_PLACES: [(&str, &str, [&str; 2]); 5] = [
    ("City Center", "Main Square", ["Walking tour of {city}", "Local exploration around {city}"]),
    ("Historic District", "Old Town", ["Architecture viewing in {city}", "Photography walk through {city}"]),
    ("Cultural Area", "Local Museum", ["Museum visit in {city}", "Cultural exploration of {city}"]),
    ("Nature Spot", "City Park", ["Nature walk near {city}", "Relaxation in a {city} park"]),
    ("Shopping Area", "Main Street", ["Shopping in {city}", "Tasting local cuisine in {city}"]),
];

pub struct LlmService {
    client: LlmClient,
}

impl LlmService {
    pub fn new() -> Self {
        Self {
            client: LlmClient::new(),
        }
    }

    /// Obtain a structurally valid plan. Never fails: after the attempt
    /// budget is exhausted the deterministic fallback plan is returned.
    pub async fn generate_plan(
        &self,
        destination: &str,
        radius_km: u32,
        travel_dates: &[NaiveDate],
        preferences: &Preferences,
        context: &LocationContext,
        weather: Option<&WeatherReport>,
    ) -> Vec<RawDay> {
        let base_prompt =
            build_prompt(destination, radius_km, travel_dates, preferences, context, weather);
        let expected_days = travel_dates.len();

        for attempt in 0..=MAX_RETRIES {
            let prompt = format!("{}{}", base_prompt, json_only_instruction(attempt));
            println!("Sending prompt to LLM (attempt {}/{})", attempt + 1, MAX_RETRIES + 1);

            match self.client.generate(&prompt).await {
                Ok(text) => {
                    if let Some(plan) = parse_response(&text, expected_days) {
                        return plan;
                    }
                    // Unrecoverable text: ask the backend to restate it as
                    // clean JSON before spending another full attempt
                    println!("Response unparseable, requesting a JSON-only restatement");
                    if let Ok(restated) = self.client.generate(REGENERATION_PROMPT).await {
                        if let Some(plan) = parse_response(&restated, expected_days) {
                            return plan;
                        }
                    }
                }
                Err(e) => eprintln!("LLM request failed: {}", e),
            }

            if attempt < MAX_RETRIES {
                tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECS)).await;
            }
        }

        println!("All generation attempts failed, using fallback itinerary");
        fallback_plan(travel_dates.len(), &context.nearby_cities)
    }
}

impl Default for LlmService {
    fn default() -> Self {
        Self::new()
    }
}

fn build_prompt(
    destination: &str,
    radius_km: u32,
    travel_dates: &[NaiveDate],
    preferences: &Preferences,
    context: &LocationContext,
    weather: Option<&WeatherReport>,
) -> String {
    let date_lines: Vec<String> = travel_dates
        .iter()
        .enumerate()
        .map(|(i, d)| format!("Day {}: {}", i + 1, d.format("%B %d, %Y (%A)")))
        .collect();

    let mut context_lines: Vec<String> = Vec::new();
    if let Some(label) = context.destination_label() {
        context_lines.push(format!("The coordinates are in {}", label));
    }
    if !context.nearby_cities.is_empty() {
        context_lines.push(format!("Nearby cities: {}", context.nearby_cities.join(", ")));
    }
    if let Some(report) = weather {
        for f in &report.forecast {
            context_lines.push(format!(
                "Weather on {}: {}, {}°C to {}°C",
                f.date, f.description, f.temperature_min, f.temperature_max
            ));
        }
    }
    if context_lines.is_empty() {
        context_lines.push("No additional location context available".to_string());
    }

    let interests = if preferences.interests.is_empty() {
        "general sightseeing".to_string()
    } else {
        preferences.interests.join(", ")
    };

    format!(
        r#"You are a local travel expert. Plan a detailed itinerary for specific travel dates near coordinates {destination} (STRICTLY within {radius} km radius).

TRAVEL DATES:
{dates}

LOCATION CONTEXT:
{context}

TRAVELER PREFERENCES:
- Interested in: {interests}
- Travel dates: {days} specific days
- Maximum travel radius: {radius} km

REQUIREMENTS:
1. Plan activities for each specific date listed above
2. Suggest REAL, SPECIFIC places with actual names
3. Consider day of the week (some attractions may be closed on certain days)
4. All locations must be within {radius} km of the coordinates
5. Provide 2-4 specific activities per day

EXAMPLE FORMAT:
[
  {{
    "day": 1,
    "town": "Łowicz",
    "place": "Łowicz Cathedral and Museum Complex",
    "activities": [
      "Visit the stunning Baroque Łowicz Cathedral with its ornate interior",
      "Explore the Museum of Łowicz Region showcasing traditional folk costumes",
      "Walk through the historic Market Square with colorful townhouses"
    ]
  }}
]

Respond ONLY with valid JSON. Use REAL place names, not generic descriptions."#,
        destination = destination,
        radius = radius_km,
        dates = date_lines.join("\n"),
        context = context_lines.join("\n"),
        interests = interests,
        days = travel_dates.len(),
    )
}

/// Escalating instruction appended between attempts.
fn json_only_instruction(attempt: u32) -> &'static str {
    match attempt {
        0 => "",
        1 => "\n\nIMPORTANT: Respond with valid JSON only. No markdown, no commentary.",
        2 => "\n\nCRITICAL: Your previous response was not valid JSON. Output ONLY the JSON array, starting with [ and ending with ].",
        _ => "\n\nFINAL WARNING: Output nothing but a syntactically valid JSON array. Any other text makes the response unusable.",
    }
}

/// Run the raw text through extraction and the repair cascade. Each repair
/// strategy is tried in escalating order with a re-parse after each; the
/// first parse that passes structural validation wins.
pub fn parse_response(output: &str, expected_days: usize) -> Option<Vec<RawDay>> {
    let json_str = match json_repair::extract_json_array(output) {
        Some(s) => s,
        None => {
            println!("Could not extract itinerary JSON from LLM output");
            return None;
        }
    };

    let candidates: [(&str, String); 6] = [
        ("direct parse", json_str.clone()),
        ("basic repair", json_repair::repair_basic(&json_str)),
        ("missing-comma fix", json_repair::fix_missing_commas(&json_str)),
        ("smart comma repair", json_repair::smart_comma_repair(&json_str)),
        ("character-level repair", json_repair::character_level_repair(&json_str)),
        ("aggressive repair", json_repair::repair_aggressive(&json_str)),
    ];

    for (strategy, candidate) in candidates {
        match serde_json::from_str::<Value>(&candidate) {
            Ok(parsed) => {
                if !validate_parsed_plan(&parsed, expected_days) {
                    println!("Parse via {} failed validation", strategy);
                    continue;
                }
                if let Some(plan) = into_days(parsed, expected_days) {
                    println!("JSON parsed successfully after {}", strategy);
                    return Some(plan);
                }
            }
            Err(e) => {
                println!("JSON parsing via {} failed: {}", strategy, e);
            }
        }
    }

    println!("All JSON parsing attempts failed");
    None
}

/// Deserialize the validated value, truncating an over-long plan to the
/// requested day count and renumbering. Too-short plans are kept as-is.
fn into_days(parsed: Value, expected_days: usize) -> Option<Vec<RawDay>> {
    let mut days: Vec<RawDay> = serde_json::from_value(parsed).ok()?;

    if days.len() > expected_days {
        println!("Truncating plan from {} days to {} days", days.len(), expected_days);
        days.truncate(expected_days);
    }
    for (i, day) in days.iter_mut().enumerate() {
        day.day = (i + 1) as u32;
    }

    Some(days)
}

/// One day per requested date, rotating through the deduplicated nearby
/// cities and a fixed set of templated places. Pure and never fails.
pub fn fallback_plan(num_days: usize, nearby_cities: &[String]) -> Vec<RawDay> {
    println!("Generating fallback itinerary for {} days", num_days);

    let mut cities: Vec<&str> = Vec::new();
    for city in nearby_cities {
        if !city.is_empty() && !cities.contains(&city.as_str()) {
            cities.push(city);
        }
    }

    (0..num_days)
        .map(|i| {
            let (town_template, place, activities) = FALLBACK_PLACES[i % FALLBACK_PLACES.len()];
            let town = if cities.is_empty() {
                town_template.to_string()
            } else {
                cities[i % cities.len()].to_string()
            };
            RawDay {
                day: (i + 1) as u32,
                place: place.to_string(),
                activities: activities
                    .iter()
                    .map(|a| a.replace("{city}", &town))
                    .collect(),
                town,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(days: &[u32]) -> Vec<NaiveDate> {
        days.iter()
            .map(|d| NaiveDate::from_ymd_opt(2025, 6, *d).unwrap())
            .collect()
    }

    #[test]
    fn valid_json_parses_directly() {
        let output = r#"Here is your trip:
[
  {"day": 1, "town": "Łowicz", "place": "Cathedral", "activities": ["Visit"]},
  {"day": 2, "town": "Sochaczew", "place": "Castle ruins", "activities": ["Walk"]}
]"#;
        let plan = parse_response(output, 2).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].town, "Łowicz");
    }

    #[test]
    fn missing_comma_between_objects_is_repaired() {
        let output = r#"[
  {"day": 1, "town": "A", "place": "P1", "activities": ["x"]}
  {"day": 2, "town": "B", "place": "P2", "activities": ["y"]}
]"#;
        let plan = parse_response(output, 2).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].place, "P2");
    }

    #[test]
    fn trailing_commas_are_repaired() {
        let output = r#"[{"day": 1, "town": "A", "place": "P", "activities": ["x",],}]"#;
        let plan = parse_response(output, 1).unwrap();
        assert_eq!(plan[0].activities, vec!["x"]);
    }

    #[test]
    fn over_long_plans_are_truncated_and_renumbered() {
        let output = r#"[
  {"day": 1, "town": "A", "place": "P1", "activities": ["x"]},
  {"day": 2, "town": "B", "place": "P2", "activities": ["x"]},
  {"day": 3, "town": "C", "place": "P3", "activities": ["x"]}
]"#;
        let plan = parse_response(output, 2).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].day, 1);
        assert_eq!(plan[1].day, 2);
    }

    #[test]
    fn unreasonably_long_plans_are_rejected() {
        let days: Vec<String> = (1..=10)
            .map(|i| format!(r#"{{"day": {i}, "town": "T", "place": "P", "activities": ["x"]}}"#))
            .collect();
        let output = format!("[{}]", days.join(","));
        assert!(parse_response(&output, 2).is_none());
    }

    #[test]
    fn prose_without_json_is_unrecoverable() {
        assert!(parse_response("I'd love to help you plan a trip!", 3).is_none());
    }

    #[test]
    fn fallback_produces_one_day_per_date() {
        let cities = vec!["Łowicz".to_string(), "Sochaczew".to_string()];
        let plan = fallback_plan(4, &cities);

        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0].day, 1);
        assert_eq!(plan[3].day, 4);
        for day in &plan {
            assert!(!day.activities.is_empty());
            assert!(day.activities[0].contains(day.town.as_str()));
        }
    }

    #[test]
    fn fallback_rotates_cities_without_immediate_repetition() {
        let cities = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        let plan = fallback_plan(4, &cities);

        // duplicates are removed, so the rotation is A, B, A, B
        assert_eq!(plan[0].town, "A");
        assert_eq!(plan[1].town, "B");
        assert_eq!(plan[2].town, "A");
        assert_eq!(plan[3].town, "B");
    }

    #[test]
    fn fallback_without_cities_uses_templated_towns() {
        let plan = fallback_plan(2, &[]);
        assert_eq!(plan[0].town, "City Center");
        assert_eq!(plan[1].town, "Historic District");
    }

    #[test]
    fn prompt_embeds_dates_context_and_preferences() {
        let context = LocationContext {
            nearby_cities: vec!["Łowicz".to_string()],
            city: Some("Warsaw".to_string()),
            region: None,
            country: Some("Poland".to_string()),
        };
        let preferences = Preferences {
            interests: vec!["history".to_string(), "food".to_string()],
            ..Default::default()
        };

        let prompt = build_prompt(
            "Lat: 52.23, Lng: 21.01",
            50,
            &dates(&[1, 2]),
            &preferences,
            &context,
            None,
        );

        assert!(prompt.contains("Day 1: June 01, 2025"));
        assert!(prompt.contains("Warsaw, Poland"));
        assert!(prompt.contains("Łowicz"));
        assert!(prompt.contains("history, food"));
        assert!(prompt.contains("within 50 km"));
    }

    #[test]
    fn json_only_instruction_escalates() {
        assert!(json_only_instruction(0).is_empty());
        assert!(json_only_instruction(1).len() < json_only_instruction(2).len());
        assert!(!json_only_instruction(3).is_empty());
    }
}
