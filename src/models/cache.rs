use bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::models::requests::Preferences;

/// Persisted cache document, also used verbatim for the in-memory cache.
/// `expires_at == None` means the entry never expires.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CachedItinerary {
    pub request_hash: String,
    pub destination: String,
    pub travel_dates: Vec<String>,
    pub preferences: Preferences,
    pub radius: u32,
    pub response_data: serde_json::Value,
    pub created_at: DateTime,
    pub expires_at: Option<DateTime>,
}

impl CachedItinerary {
    pub fn is_expired(&self, now: DateTime) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at < now,
            None => false,
        }
    }
}
