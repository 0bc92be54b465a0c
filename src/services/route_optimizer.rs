//! Route Optimization Service
//!
//! Reorders the day plans so the trip approximately minimizes total travel
//! distance. Uses the nearest-neighbor heuristic (a greedy approximation to
//! the traveling-salesman problem): always move to the closest unvisited
//! stop. O(n²), which is fine for single-digit to low-tens day counts, and
//! explicitly not globally optimal.

use crate::models::plan::{Coordinates, DayPlan};
use crate::utils::geography::distance_km;

pub struct RouteOptimizer;

impl RouteOptimizer {
    pub fn new() -> Self {
        Self
    }

    /// Reorder days starting from the trip origin. The output is a
    /// permutation of the input: no stop is created or dropped. Each day is
    /// renumbered, annotated with the travel distance from the previous
    /// stop (zero for the first) and with the cumulative route trail.
    pub fn optimize_route(&self, start_coords: (f64, f64), days: Vec<DayPlan>) -> Vec<DayPlan> {
        if days.len() <= 1 {
            return days;
        }

        println!("Starting route optimization from {:?}", start_coords);

        let mut remaining = days;
        let mut current_location = start_coords;
        let mut optimized: Vec<DayPlan> = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let mut closest_idx = 0;
            let mut closest_distance = f64::MAX;
            for (idx, day) in remaining.iter().enumerate() {
                let d = distance_km(current_location, day.coordinates());
                if d < closest_distance {
                    closest_distance = d;
                    closest_idx = idx;
                }
            }

            let mut day = remaining.remove(closest_idx);
            day.travel_distance_km = if optimized.is_empty() {
                0.0
            } else {
                round_tenth(closest_distance)
            };
            current_location = day.coordinates();

            println!(
                "Added Day {}: {} [{}km from start, {}km travel from previous location]",
                optimized.len() + 1,
                day.place,
                day.distance_from_start,
                day.travel_distance_km
            );

            optimized.push(day);
        }

        let mut total_travel_distance = 0.0;
        let trail: Vec<Coordinates> = optimized
            .iter()
            .map(|d| Coordinates {
                lat: d.lat,
                lng: d.lng,
            })
            .collect();

        for (i, day) in optimized.iter_mut().enumerate() {
            day.day = (i + 1) as u32;
            day.route = trail[..=i].to_vec();
            if i > 0 {
                total_travel_distance += day.travel_distance_km;
            }
        }

        println!("Route optimized! Total travel distance: {:.1}km", total_travel_distance);

        optimized
    }
}

impl Default for RouteOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
