//! Content-addressed cache of full itinerary responses.
//!
//! Backed by MongoDB (`travel_planner.cached_itineraries`) when a client is
//! configured, otherwise by an in-process map with identical semantics.
//! Caching is an optimization, never a correctness requirement: every
//! backend error is logged and treated as a miss for reads and a no-op for
//! writes.

use bson::{doc, DateTime};
use chrono::NaiveDate;
use mongodb::{Client, Collection};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::env;

use crate::models::cache::CachedItinerary;
use crate::models::requests::Preferences;

const DATABASE: &str = "travel_planner";
const COLLECTION: &str = "cached_itineraries";
const DEFAULT_EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub cache_enabled: bool,
    pub memory_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mongodb_total_entries: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mongodb_active_entries: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mongodb_expired_entries: Option<u64>,
}

pub struct CacheService {
    enabled: bool,
    expiry_hours: i64,
    collection: Option<Collection<CachedItinerary>>,
    memory: Mutex<HashMap<String, CachedItinerary>>,
}

impl CacheService {
    pub fn new(client: Option<Arc<Client>>) -> Self {
        let enabled = env::var("CACHE_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);
        let expiry_hours = env::var("CACHE_EXPIRY_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EXPIRY_HOURS);

        let collection = client.map(|c| c.database(DATABASE).collection(COLLECTION));
        if collection.is_some() {
            println!("Cache backed by MongoDB at {}.{}", DATABASE, COLLECTION);
        } else {
            println!("No MongoDB client, cache is in-memory only");
        }

        Self {
            enabled,
            expiry_hours,
            collection,
            memory: Mutex::new(HashMap::new()),
        }
    }

    /// Deterministic digest over the canonicalized request tuple. Two
    /// requests that differ only in date or interest ordering map to the
    /// same key.
    pub fn request_hash(
        destination: &str,
        travel_dates: &[NaiveDate],
        preferences: &Preferences,
        radius: u32,
    ) -> String {
        let mut dates: Vec<String> = travel_dates.iter().map(|d| d.to_string()).collect();
        dates.sort();

        // serde_json objects serialize with sorted keys, so this is a
        // canonical encoding as long as list contents are pre-sorted.
        let canonical = serde_json::json!({
            "destination": destination,
            "travel_dates": dates,
            "preferences": {
                "interests": preferences.sorted_interests(),
                "budget": preferences.budget,
                "group_size": preferences.group_size,
                "accommodation": preferences.accommodation,
            },
            "radius": radius,
        });

        let mut hasher = Sha256::new();
        hasher.update(canonical.to_string().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Return the cached payload for a key, skipping expired entries.
    pub async fn lookup(&self, request_hash: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }

        if let Some(collection) = &self.collection {
            let filter = doc! {
                "request_hash": request_hash,
                "$or": [
                    { "expires_at": { "$gt": DateTime::now() } },
                    { "expires_at": null },
                ],
            };
            match collection.find_one(filter).await {
                Ok(Some(entry)) => {
                    println!("MongoDB cache hit for hash {}", request_hash);
                    return Some(entry.response_data);
                }
                Ok(None) => {}
                Err(e) => eprintln!("Cache retrieval error: {}", e),
            }
        }

        if let Ok(mut memory) = self.memory.lock() {
            let expired = memory
                .get(request_hash)
                .map(|entry| entry.is_expired(DateTime::now()));
            match expired {
                Some(false) => {
                    println!("Memory cache hit for hash {}", request_hash);
                    return memory.get(request_hash).map(|e| e.response_data.clone());
                }
                Some(true) => {
                    memory.remove(request_hash);
                }
                None => {}
            }
        }

        None
    }

    /// Upsert a payload under its key. Repeated writes for the same logical
    /// request are idempotent.
    pub async fn store(
        &self,
        request_hash: &str,
        destination: &str,
        travel_dates: &[NaiveDate],
        preferences: &Preferences,
        radius: u32,
        response_data: Value,
    ) -> bool {
        if !self.enabled {
            return false;
        }

        let now = DateTime::now();
        let expires_at = if self.expiry_hours > 0 {
            Some(DateTime::from_millis(
                now.timestamp_millis() + self.expiry_hours * 3_600_000,
            ))
        } else {
            None
        };

        let entry = CachedItinerary {
            request_hash: request_hash.to_string(),
            destination: destination.to_string(),
            travel_dates: travel_dates.iter().map(|d| d.to_string()).collect(),
            preferences: preferences.clone(),
            radius,
            response_data,
            created_at: now,
            expires_at,
        };

        self.store_entry(entry).await
    }

    async fn store_entry(&self, entry: CachedItinerary) -> bool {
        if let Some(collection) = &self.collection {
            let filter = doc! { "request_hash": &entry.request_hash };
            match collection.replace_one(filter, &entry).upsert(true).await {
                Ok(_) => {
                    println!("Cached response to MongoDB for hash: {}", entry.request_hash);
                    return true;
                }
                Err(e) => eprintln!("Cache save error: {}", e),
            }
        }

        if let Ok(mut memory) = self.memory.lock() {
            println!("Cached response to memory for hash: {}", entry.request_hash);
            memory.insert(entry.request_hash.clone(), entry);
            return true;
        }

        false
    }

    /// Delete entries whose expiry has passed. Returns the removed count.
    pub async fn sweep_expired(&self) -> u64 {
        if !self.enabled {
            return 0;
        }

        let mut removed = 0u64;
        let now = DateTime::now();

        if let Some(collection) = &self.collection {
            let filter = doc! { "expires_at": { "$lt": now } };
            match collection.delete_many(filter).await {
                Ok(result) => {
                    println!("Removed {} expired MongoDB entries", result.deleted_count);
                    removed += result.deleted_count;
                }
                Err(e) => eprintln!("Cache cleanup error: {}", e),
            }
        }

        if let Ok(mut memory) = self.memory.lock() {
            let before = memory.len();
            memory.retain(|_, entry| !entry.is_expired(now));
            let swept = (before - memory.len()) as u64;
            if swept > 0 {
                println!("Removed {} expired memory entries", swept);
            }
            removed += swept;
        }

        removed
    }

    /// Drop every entry, regardless of expiry.
    pub async fn clear(&self) -> u64 {
        let mut removed = 0u64;

        if let Some(collection) = &self.collection {
            match collection.delete_many(doc! {}).await {
                Ok(result) => removed += result.deleted_count,
                Err(e) => eprintln!("Cache clear error: {}", e),
            }
        }

        if let Ok(mut memory) = self.memory.lock() {
            removed += memory.len() as u64;
            memory.clear();
        }

        removed
    }

    pub async fn stats(&self) -> CacheStats {
        let memory_entries = self.memory.lock().map(|m| m.len()).unwrap_or(0);

        let mut stats = CacheStats {
            cache_enabled: self.enabled,
            memory_entries,
            mongodb_total_entries: None,
            mongodb_active_entries: None,
            mongodb_expired_entries: None,
        };

        if let Some(collection) = &self.collection {
            let total = collection.count_documents(doc! {}).await;
            let expired = collection
                .count_documents(doc! { "expires_at": { "$lt": DateTime::now() } })
                .await;
            if let (Ok(total), Ok(expired)) = (total, expired) {
                stats.mongodb_total_entries = Some(total);
                // the two counts race, so the difference can be negative
                stats.mongodb_active_entries = Some(total.saturating_sub(expired));
                stats.mongodb_expired_entries = Some(expired);
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn preferences(interests: &[&str]) -> Preferences {
        Preferences {
            interests: interests.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn dates(days: &[u32]) -> Vec<NaiveDate> {
        days.iter()
            .map(|d| NaiveDate::from_ymd_opt(2025, 6, *d).unwrap())
            .collect()
    }

    #[test]
    fn hash_is_stable_under_interest_permutation() {
        let a = CacheService::request_hash(
            "Lat: 52.0, Lng: 21.0",
            &dates(&[1, 2]),
            &preferences(&["food", "history", "art"]),
            50,
        );
        let b = CacheService::request_hash(
            "Lat: 52.0, Lng: 21.0",
            &dates(&[1, 2]),
            &preferences(&["history", "art", "food"]),
            50,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn hash_is_stable_under_date_permutation() {
        let a = CacheService::request_hash("d", &dates(&[3, 1, 2]), &preferences(&[]), 25);
        let b = CacheService::request_hash("d", &dates(&[1, 2, 3]), &preferences(&[]), 25);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_differs_when_semantics_differ() {
        let base = CacheService::request_hash("d", &dates(&[1]), &preferences(&["art"]), 25);
        let other_radius =
            CacheService::request_hash("d", &dates(&[1]), &preferences(&["art"]), 30);
        let other_interest =
            CacheService::request_hash("d", &dates(&[1]), &preferences(&["food"]), 25);
        assert_ne!(base, other_radius);
        assert_ne!(base, other_interest);
    }

    #[tokio::test]
    async fn memory_store_and_lookup_round_trip() {
        let cache = CacheService::new(None);
        let payload = json!({"plan": [{"day": 1}], "cached": false});
        let hash = CacheService::request_hash("d", &dates(&[1]), &preferences(&["art"]), 25);

        assert!(cache.lookup(&hash).await.is_none());
        assert!(
            cache
                .store(&hash, "d", &dates(&[1]), &preferences(&["art"]), 25, payload.clone())
                .await
        );
        assert_eq!(cache.lookup(&hash).await, Some(payload));
    }

    #[tokio::test]
    async fn store_is_an_upsert() {
        let cache = CacheService::new(None);
        let hash = "same-key".to_string();
        let prefs = preferences(&[]);

        cache
            .store(&hash, "d", &dates(&[1]), &prefs, 25, json!({"v": 1}))
            .await;
        cache
            .store(&hash, "d", &dates(&[1]), &prefs, 25, json!({"v": 2}))
            .await;

        assert_eq!(cache.lookup(&hash).await, Some(json!({"v": 2})));
        assert_eq!(cache.stats().await.memory_entries, 1);
    }

    #[tokio::test]
    async fn lookup_skips_expired_entries_and_sweep_removes_them() {
        let cache = CacheService::new(None);
        let past = DateTime::from_millis(DateTime::now().timestamp_millis() - 1_000);
        let entry = CachedItinerary {
            request_hash: "stale".to_string(),
            destination: "d".to_string(),
            travel_dates: vec!["2025-06-01".to_string()],
            preferences: Preferences::default(),
            radius: 25,
            response_data: json!({"plan": []}),
            created_at: past,
            expires_at: Some(past),
        };

        cache.store_entry(entry.clone()).await;
        assert!(cache.lookup("stale").await.is_none());

        // lookup already evicted the stale entry; reinsert to test the sweep
        cache.store_entry(entry).await;
        assert_eq!(cache.sweep_expired().await, 1);
        assert_eq!(cache.stats().await.memory_entries, 0);
    }
}
