//! Weather forecast client: OpenWeatherMap when an API key is configured,
//! the free Open-Meteo API otherwise, and a static unavailable-weather
//! report as last resort. Always produces a result; the pipeline tolerates
//! the provider returning fewer days than requested.

use reqwest;
use serde::Deserialize;
use std::{env, time::Duration};

use crate::models::weather::{CurrentConditions, DailyForecast, WeatherData};

const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";
const MAX_FORECAST_DAYS: usize = 5;

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    #[serde(default)]
    city: Option<OpenWeatherCity>,
    #[serde(default)]
    list: Vec<OpenWeatherItem>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherItem {
    dt_txt: String,
    main: OpenWeatherMain,
    weather: Vec<OpenWeatherDescription>,
    wind: OpenWeatherWind,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: f64,
    feels_like: f64,
    temp_max: f64,
    temp_min: f64,
    humidity: u32,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherDescription {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    current: Option<OpenMeteoCurrent>,
    #[serde(default)]
    daily: Option<OpenMeteoDaily>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    #[serde(default)]
    temperature_2m: f64,
    #[serde(default)]
    relative_humidity_2m: u32,
    #[serde(default)]
    weather_code: u32,
    #[serde(default)]
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    weather_code: Vec<u32>,
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    relative_humidity_2m_mean: Vec<f64>,
}

pub struct WeatherClient {
    http_client: reqwest::Client,
    openweather_api_key: Option<String>,
}

impl WeatherClient {
    pub fn new() -> Self {
        let openweather_api_key = env::var("OPENWEATHER_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            openweather_api_key,
        }
    }

    pub async fn forecast(&self, lat: f64, lng: f64) -> WeatherData {
        match &self.openweather_api_key {
            Some(key) => match self.openweather_forecast(lat, lng, key).await {
                Some(data) => data,
                None => self.open_meteo_forecast(lat, lng).await,
            },
            None => {
                println!("No OPENWEATHER_API_KEY found, trying free Open-Meteo API...");
                self.open_meteo_forecast(lat, lng).await
            }
        }
    }

    async fn openweather_forecast(&self, lat: f64, lng: f64, api_key: &str) -> Option<WeatherData> {
        println!("Getting weather forecast for coordinates: {}, {}", lat, lng);

        let response = self
            .http_client
            .get(OPENWEATHER_URL)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
                ("cnt", "16".to_string()),
            ])
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            println!("OpenWeatherMap API error: {}", response.status());
            return None;
        }

        let data: OpenWeatherResponse = response.json().await.ok()?;

        let (location, country) = data
            .city
            .map(|c| (c.name, c.country))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        let current = data.list.first().map(|item| CurrentConditions {
            temperature: item.main.temp.round() as i32,
            feels_like: item.main.feels_like.round() as i32,
            humidity: item.main.humidity,
            description: title_case(
                item.weather
                    .first()
                    .map(|w| w.description.as_str())
                    .unwrap_or(""),
            ),
            icon: item
                .weather
                .first()
                .map(|w| w.icon.clone())
                .unwrap_or_default(),
            // m/s to km/h
            wind_speed: (item.wind.speed * 3.6 * 10.0).round() / 10.0,
        });

        // One forecast entry per calendar date, first slot of the day wins
        let mut forecast: Vec<DailyForecast> = Vec::new();
        for item in &data.list {
            let date = match item.dt_txt.split(' ').next() {
                Some(d) => d.to_string(),
                None => continue,
            };
            if forecast.iter().any(|f| f.date == date) || forecast.len() >= MAX_FORECAST_DAYS {
                continue;
            }
            forecast.push(DailyForecast {
                date,
                temperature_max: item.main.temp_max.round() as i32,
                temperature_min: item.main.temp_min.round() as i32,
                description: title_case(
                    item.weather
                        .first()
                        .map(|w| w.description.as_str())
                        .unwrap_or(""),
                ),
                icon: item
                    .weather
                    .first()
                    .map(|w| w.icon.clone())
                    .unwrap_or_default(),
                humidity: item.main.humidity,
                travel_day: None,
            });
        }

        println!("Weather data retrieved for {}", location);
        Some(WeatherData {
            location,
            country,
            current,
            forecast,
        })
    }

    async fn open_meteo_forecast(&self, lat: f64, lng: f64) -> WeatherData {
        println!("Getting free weather forecast for coordinates: {}, {}", lat, lng);

        let response = self
            .http_client
            .get(OPEN_METEO_URL)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lng.to_string()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m".to_string(),
                ),
                (
                    "daily",
                    "weather_code,temperature_2m_max,temperature_2m_min,relative_humidity_2m_mean"
                        .to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("forecast_days", "7".to_string()),
            ])
            .send()
            .await;

        let data: OpenMeteoResponse = match response {
            Ok(r) if r.status().is_success() => match r.json().await {
                Ok(data) => data,
                Err(e) => {
                    eprintln!("Error parsing Open-Meteo response: {}", e);
                    return Self::unavailable();
                }
            },
            Ok(r) => {
                eprintln!("Open-Meteo API error: {}", r.status());
                return Self::unavailable();
            }
            Err(e) => {
                eprintln!("Error getting free weather data: {}", e);
                return Self::unavailable();
            }
        };

        let current = data.current.map(|c| CurrentConditions {
            temperature: c.temperature_2m.round() as i32,
            feels_like: c.temperature_2m.round() as i32,
            humidity: c.relative_humidity_2m,
            description: describe_weather_code(c.weather_code).to_string(),
            icon: format!("{:02}d", c.weather_code),
            wind_speed: (c.wind_speed_10m * 10.0).round() / 10.0,
        });

        let mut forecast = Vec::new();
        if let Some(daily) = data.daily {
            for i in 0..daily.time.len().min(MAX_FORECAST_DAYS) {
                let code = daily.weather_code.get(i).copied().unwrap_or(0);
                forecast.push(DailyForecast {
                    date: daily.time[i].clone(),
                    temperature_max: daily
                        .temperature_2m_max
                        .get(i)
                        .copied()
                        .unwrap_or(0.0)
                        .round() as i32,
                    temperature_min: daily
                        .temperature_2m_min
                        .get(i)
                        .copied()
                        .unwrap_or(0.0)
                        .round() as i32,
                    description: describe_weather_code(code).to_string(),
                    icon: format!("{:02}d", code),
                    humidity: daily
                        .relative_humidity_2m_mean
                        .get(i)
                        .copied()
                        .unwrap_or(0.0)
                        .round() as u32,
                    travel_day: None,
                });
            }
        }

        println!("Free weather data retrieved successfully");
        WeatherData {
            location: "Selected Location".to_string(),
            country: String::new(),
            current,
            forecast,
        }
    }

    fn unavailable() -> WeatherData {
        WeatherData {
            location: "Unknown".to_string(),
            country: String::new(),
            current: Some(CurrentConditions {
                temperature: 20,
                feels_like: 20,
                humidity: 50,
                description: "Weather data unavailable".to_string(),
                icon: "01d".to_string(),
                wind_speed: 0.0,
            }),
            forecast: Vec::new(),
        }
    }
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

fn describe_weather_code(code: u32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
