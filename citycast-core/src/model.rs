use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A location returned by the search endpoint, pending user confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub url: Option<String>,
}

impl LocationCandidate {
    /// "London, City of London, Greater London, United Kingdom" style label.
    pub fn label(&self) -> String {
        [self.name.as_str(), self.region.as_str(), self.country.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for LocationCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Combined current conditions and multi-day forecast for a resolved city.
///
/// Fields mirror the provider's `forecast.json` body; anything the provider
/// leaves out falls back to its default instead of failing the decode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub location: ResolvedLocation,
    #[serde(default)]
    pub current: CurrentConditions,
    #[serde(default)]
    pub forecast: Forecast,
}

impl ForecastPayload {
    pub fn days(&self) -> &[ForecastDay] {
        &self.forecast.forecastday
    }

    /// Sunrise of the first forecast day, as shown next to the current conditions.
    pub fn sunrise_today(&self) -> Option<&str> {
        self.days()
            .first()
            .map(|d| d.astro.sunrise.as_str())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedLocation {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub tz_id: Option<String>,
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentConditions {
    pub last_updated_epoch: Option<i64>,
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub humidity: u8,
    pub wind_kph: f64,
    pub is_day: u8,
    pub condition: Condition,
}

impl CurrentConditions {
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated_epoch
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Forecast {
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastDay {
    pub date: String,
    pub day: DaySummary,
    pub astro: Astro,
}

impl ForecastDay {
    /// English weekday name of `date`, e.g. "Monday".
    pub fn weekday_name(&self) -> Option<String> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .ok()
            .map(|d| d.format("%A").to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaySummary {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: f64,
    pub daily_chance_of_rain: u8,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: u32,
}

impl Condition {
    /// Icon asset key for this condition; unknown conditions map to `"other"`.
    pub fn icon_key(&self) -> &'static str {
        match self.text.trim() {
            "Partly cloudy" => "partlycloudy",
            "Moderate rain" | "Patchy rain possible" | "Patchy rain nearby" | "Light rain"
            | "Moderate rain at times" | "Light rain shower" | "Light drizzle"
            | "Patchy light rain" => "moderaterain",
            "Sunny" | "Clear" => "sun",
            "Overcast" | "Cloudy" => "cloud",
            "Mist" | "Fog" | "Freezing fog" => "mist",
            "Heavy rain" | "Heavy rain at times" | "Moderate or heavy freezing rain"
            | "Moderate or heavy rain shower" | "Moderate or heavy rain with thunder"
            | "Torrential rain shower" => "heavyrain",
            "Light snow" | "Moderate snow" | "Heavy snow" | "Patchy light snow"
            | "Patchy moderate snow" | "Patchy heavy snow" | "Blizzard" | "Blowing snow" => "snow",
            _ => "other",
        }
    }
}
