use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Canonical traveler preferences. Incoming requests are normalized into
/// this record at the boundary; no core component ever sees a raw map.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Preferences {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<String>,
}

impl Preferences {
    /// Interest tags in a deterministic order, used for cache keying.
    pub fn sorted_interests(&self) -> Vec<String> {
        let mut interests = self.interests.clone();
        interests.sort();
        interests
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItineraryRequest {
    pub destination: String,
    pub travel_dates: Vec<NaiveDate>,
    pub preferences: Preferences,
    pub radius: u32,
}

impl ItineraryRequest {
    /// Travel dates sorted ascending with duplicates removed.
    pub fn sorted_dates(&self) -> Vec<NaiveDate> {
        let mut dates = self.travel_dates.clone();
        dates.sort();
        dates.dedup();
        dates
    }

    /// Parse the `Lat: <f>, Lng: <f>` destination pattern.
    pub fn parse_coordinates(&self) -> Option<(f64, f64)> {
        let re = Regex::new(r"Lat:\s*(-?[0-9.]+),\s*Lng:\s*(-?[0-9.]+)").ok()?;
        let caps = re.captures(&self.destination)?;
        let lat: f64 = caps.get(1)?.as_str().parse().ok()?;
        let lng: f64 = caps.get(2)?.as_str().parse().ok()?;
        Some((lat, lng))
    }
}
