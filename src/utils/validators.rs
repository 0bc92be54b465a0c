//! Structural validation for parsed generation output. Checks shape only —
//! whether the content is a sensible itinerary is not this module's job.

use serde_json::Value;

/// A parsed plan is acceptable when it is a non-empty array of objects that
/// each carry `town`, `place` and an `activities` list, and its length is
/// not wildly beyond the expected day count.
pub fn validate_parsed_plan(plan: &Value, expected_days: usize) -> bool {
    let days = match plan.as_array() {
        Some(days) => days,
        None => {
            println!("Plan is not a list");
            return false;
        }
    };

    if days.is_empty() {
        println!("Plan is empty");
        return false;
    }

    if days.len() > expected_days * 2 {
        println!(
            "Way too many days in plan: {} (expected around {})",
            days.len(),
            expected_days
        );
        return false;
    }

    for (i, day) in days.iter().enumerate() {
        let day_obj = match day.as_object() {
            Some(obj) => obj,
            None => {
                println!("Day {} is not an object", i + 1);
                return false;
            }
        };

        for field in ["town", "place", "activities"] {
            if !day_obj.contains_key(field) {
                println!("Day {} missing field: {}", i + 1, field);
                return false;
            }
        }

        if !day_obj["activities"].is_array() {
            println!("Day {} activities is not a list", i + 1);
            return false;
        }
    }

    println!("Plan validation passed: {} days", days.len());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_well_formed_plan() {
        let plan = json!([
            {"day": 1, "town": "Warsaw", "place": "Old Town", "activities": ["Walk"]},
            {"day": 2, "town": "Lowicz", "place": "Cathedral", "activities": ["Visit"]}
        ]);
        assert!(validate_parsed_plan(&plan, 2));
    }

    #[test]
    fn rejects_non_array() {
        assert!(!validate_parsed_plan(&json!({"plan": []}), 3));
    }

    #[test]
    fn rejects_empty_plan() {
        assert!(!validate_parsed_plan(&json!([]), 3));
    }

    #[test]
    fn rejects_missing_required_fields() {
        let plan = json!([{"day": 1, "town": "Warsaw", "activities": []}]);
        assert!(!validate_parsed_plan(&plan, 1));
    }

    #[test]
    fn rejects_activities_that_are_not_a_list() {
        let plan = json!([{"town": "Warsaw", "place": "Old Town", "activities": "walk"}]);
        assert!(!validate_parsed_plan(&plan, 1));
    }

    #[test]
    fn rejects_unreasonable_day_count() {
        let day = json!({"town": "A", "place": "B", "activities": []});
        let plan = Value::Array(vec![day; 7]);
        // 7 days against 3 expected exceeds the 2x sanity bound
        assert!(!validate_parsed_plan(&plan, 3));
    }

    #[test]
    fn accepts_plan_slightly_longer_than_expected() {
        let day = json!({"town": "A", "place": "B", "activities": []});
        let plan = Value::Array(vec![day; 4]);
        assert!(validate_parsed_plan(&plan, 3));
    }
}
