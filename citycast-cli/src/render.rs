use std::fmt::Write;

use citycast_core::{ForecastPayload, LocationCandidate};

/// Current conditions followed by the daily strip.
pub fn forecast(payload: &ForecastPayload) -> String {
    let mut out = String::new();
    let location = &payload.location;
    let current = &payload.current;

    let _ = writeln!(out, "{}, {}", location.name, location.country);
    let _ = writeln!(
        out,
        "[{}] {}°",
        current.condition.icon_key(),
        current.temp_c
    );
    let _ = writeln!(out, "{}", current.condition.text);
    let _ = writeln!(
        out,
        "wind {}km   humidity {}%   sunrise {}",
        current.wind_kph,
        current.humidity,
        payload.sunrise_today().unwrap_or("-"),
    );
    if let Some(updated) = current.last_updated() {
        let _ = writeln!(out, "updated {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }

    if payload.days().is_empty() {
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Daily forecast");
    for day in payload.days() {
        let name = day.weekday_name().unwrap_or_else(|| day.date.clone());
        let _ = writeln!(
            out,
            "  {:<10} {:>4}°  [{}]",
            name,
            day.day.avgtemp_c.trunc() as i64,
            day.day.condition.icon_key(),
        );
    }

    out
}

pub fn candidates(found: &[LocationCandidate]) -> String {
    let mut out = String::new();
    for candidate in found {
        let _ = writeln!(
            out,
            "{}  ({:.2}, {:.2})",
            candidate.label(),
            candidate.lat,
            candidate.lon
        );
    }
    out
}
