use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CurrentConditions {
    pub temperature: i32,
    pub feels_like: i32,
    pub humidity: u32,
    pub description: String,
    pub icon: String,
    pub wind_speed: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DailyForecast {
    pub date: String,
    pub temperature_max: i32,
    pub temperature_min: i32,
    pub description: String,
    pub icon: String,
    pub humidity: u32,
    /// 1-based index of the matching travel day; set when the forecast is
    /// filtered to the requested dates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_day: Option<u32>,
}

/// Raw provider output: location plus current conditions and a daily list.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WeatherData {
    pub location: String,
    pub country: String,
    pub current: Option<CurrentConditions>,
    pub forecast: Vec<DailyForecast>,
}

/// Forecast filtered to the requested travel dates. Dates the provider had
/// no data for are reported, not dropped.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WeatherReport {
    pub location: String,
    pub country: String,
    pub current: Option<CurrentConditions>,
    pub forecast: Vec<DailyForecast>,
    pub missing_dates: Vec<String>,
}
