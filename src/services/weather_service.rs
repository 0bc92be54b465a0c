//! Weather annotation for itineraries.
//!
//! Fetches the raw multi-day forecast for the trip origin and filters it to
//! the requested travel dates. Dates the provider has no data for (typically
//! anything beyond the forecast horizon) are listed in `missing_dates`
//! instead of being silently dropped.

use chrono::NaiveDate;

use crate::clients::weather::WeatherClient;
use crate::models::weather::{DailyForecast, WeatherData, WeatherReport};

pub struct WeatherService {
    client: WeatherClient,
}

impl WeatherService {
    pub fn new() -> Self {
        Self {
            client: WeatherClient::new(),
        }
    }

    /// Fetch a forecast and restrict it to the travel dates. Never fails:
    /// at worst the report has an empty forecast and every date missing.
    pub async fn report_for_trip(
        &self,
        coords: (f64, f64),
        travel_dates: &[NaiveDate],
    ) -> WeatherReport {
        let data = self.client.forecast(coords.0, coords.1).await;
        filter_to_travel_dates(data, travel_dates)
    }
}

impl Default for WeatherService {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep only forecast entries matching a travel date, tagging each with its
/// 1-based travel-day index. Dates without provider data are reported.
fn filter_to_travel_dates(data: WeatherData, travel_dates: &[NaiveDate]) -> WeatherReport {
    let mut forecast: Vec<DailyForecast> = Vec::new();
    let mut missing_dates: Vec<String> = Vec::new();

    for (i, date) in travel_dates.iter().enumerate() {
        let iso = date.to_string();
        match data.forecast.iter().find(|f| f.date == iso) {
            Some(entry) => {
                let mut entry = entry.clone();
                entry.travel_day = Some((i + 1) as u32);
                forecast.push(entry);
            }
            None => missing_dates.push(iso),
        }
    }

    if !missing_dates.is_empty() {
        println!(
            "No forecast data for {} of {} travel dates: {:?}",
            missing_dates.len(),
            travel_dates.len(),
            missing_dates
        );
    }

    WeatherReport {
        location: data.location,
        country: data.country,
        current: data.current,
        forecast,
        missing_dates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast_entry(date: &str) -> DailyForecast {
        DailyForecast {
            date: date.to_string(),
            temperature_max: 22,
            temperature_min: 12,
            description: "Clear sky".to_string(),
            icon: "01d".to_string(),
            humidity: 40,
            travel_day: None,
        }
    }

    fn data(dates: &[&str]) -> WeatherData {
        WeatherData {
            location: "Warsaw".to_string(),
            country: "PL".to_string(),
            current: None,
            forecast: dates.iter().map(|d| forecast_entry(d)).collect(),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn matching_dates_are_tagged_with_travel_day() {
        let report = filter_to_travel_dates(
            data(&["2025-06-01", "2025-06-02", "2025-06-03"]),
            &[date(2), date(3)],
        );

        assert_eq!(report.forecast.len(), 2);
        assert_eq!(report.forecast[0].date, "2025-06-02");
        assert_eq!(report.forecast[0].travel_day, Some(1));
        assert_eq!(report.forecast[1].travel_day, Some(2));
        assert!(report.missing_dates.is_empty());
    }

    #[test]
    fn dates_beyond_the_forecast_horizon_are_reported_missing() {
        let report = filter_to_travel_dates(data(&["2025-06-01"]), &[date(1), date(20)]);

        assert_eq!(report.forecast.len(), 1);
        assert_eq!(report.missing_dates, vec!["2025-06-20".to_string()]);
    }

    #[test]
    fn empty_provider_forecast_reports_every_date_missing() {
        let report = filter_to_travel_dates(data(&[]), &[date(1), date(2)]);

        assert!(report.forecast.is_empty());
        assert_eq!(report.missing_dates.len(), 2);
        assert_eq!(report.location, "Warsaw");
    }
}
