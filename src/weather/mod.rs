//! Weather retrieval pipeline.
//!
//! Two entry points, both pure over an injected [`HttpPort`]:
//!
//! - [`resolve_coordinates`] — one geocoding call turning the provisioned
//!   ZIP code into latitude/longitude.
//! - [`fetch`] — the four-step api.weather.gov chain: grid point lookup,
//!   station directory, latest observation, short forecast.
//!
//! Memory policy: the device has a few hundred KB of heap and the API
//! responses are large, so each decoded response lives inside its own
//! block and is dropped before the next request is issued. At most one
//! decoded response is resident at any instant.
//!
//! Failure policy: any step failing aborts the whole fetch — there is no
//! partial snapshot. An empty station directory is its own error so the
//! caller can log it distinctly and skip the remaining calls.

pub mod classify;

use log::info;
use serde::Deserialize;

use crate::app::ports::HttpPort;
use crate::error::FetchError;

/// Sent on every API request; api.weather.gov rejects anonymous clients.
pub const USER_AGENT: (&str, &str) = ("User-Agent", "PicoWeatherDisplay (contact@example.com)");

const GEOCODE_BASE: &str = "https://api.zippopotam.us/us";
const WEATHER_BASE: &str = "https://api.weather.gov";

/// Geocoded location, resolved once per provisioning record and cached by
/// the runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One complete weather reading. Wholesale-replaced on every refresh,
/// never field-merged.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Rounded Fahrenheit; `None` when the station omitted the reading.
    pub temperature_f: Option<i32>,
    /// Percent relative humidity; `None` when omitted.
    pub relative_humidity_pct: Option<f64>,
    /// Raw short forecast text, classified at render time.
    pub forecast: String,
    /// When this snapshot was taken, UTC epoch seconds.
    pub fetched_at_epoch: i64,
}

// ---------------------------------------------------------------------------
// Response shapes (private; only the fields we read)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ZipResponse {
    places: Vec<ZipPlace>,
}

#[derive(Deserialize)]
struct ZipPlace {
    // The geocoder returns coordinates as JSON strings.
    latitude: String,
    longitude: String,
}

#[derive(Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Deserialize)]
struct PointsProperties {
    forecast: String,
    #[serde(rename = "observationStations")]
    observation_stations: String,
}

#[derive(Deserialize)]
struct StationsResponse {
    features: Vec<StationFeature>,
}

#[derive(Deserialize)]
struct StationFeature {
    properties: StationProperties,
}

#[derive(Deserialize)]
struct StationProperties {
    #[serde(rename = "stationIdentifier")]
    station_identifier: String,
}

#[derive(Deserialize)]
struct ObservationResponse {
    properties: ObservationProperties,
}

#[derive(Deserialize, Default)]
struct ObservationProperties {
    #[serde(default)]
    temperature: Measurement,
    #[serde(rename = "relativeHumidity", default)]
    relative_humidity: Measurement,
}

#[derive(Deserialize, Default)]
struct Measurement {
    value: Option<f64>,
}

#[derive(Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

#[derive(Deserialize)]
struct ForecastPeriod {
    #[serde(rename = "shortForecast")]
    short_forecast: String,
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|_| FetchError::Decode)
}

// ---------------------------------------------------------------------------
// Geocoding
// ---------------------------------------------------------------------------

/// Resolve a US ZIP code to coordinates via zippopotam.us.
pub fn resolve_coordinates(
    http: &mut impl HttpPort,
    zip: &str,
) -> Result<Coordinates, FetchError> {
    let body = http.get(&format!("{GEOCODE_BASE}/{zip}"), &[])?;
    let zip_doc: ZipResponse = decode(&body)?;
    let place = zip_doc.places.first().ok_or(FetchError::Decode)?;

    let latitude = place.latitude.parse().map_err(|_| FetchError::Decode)?;
    let longitude = place.longitude.parse().map_err(|_| FetchError::Decode)?;
    info!("geocode: {} -> ({}, {})", zip, latitude, longitude);
    Ok(Coordinates {
        latitude,
        longitude,
    })
}

// ---------------------------------------------------------------------------
// Weather fetch
// ---------------------------------------------------------------------------

/// Run the four-step api.weather.gov pipeline for one location.
pub fn fetch(
    http: &mut impl HttpPort,
    coords: Coordinates,
    now_epoch: i64,
) -> Result<WeatherSnapshot, FetchError> {
    // Step 1: grid point — yields the two follow-up URLs.
    let (forecast_url, stations_url) = {
        let body = http.get(
            &format!(
                "{WEATHER_BASE}/points/{},{}",
                coords.latitude, coords.longitude
            ),
            &[USER_AGENT],
        )?;
        let points: PointsResponse = decode(&body)?;
        (
            points.properties.forecast,
            points.properties.observation_stations,
        )
    };

    // Step 2: station directory — first station wins, empty is an error
    // and the remaining steps are skipped.
    let station_id = {
        let body = http.get(&stations_url, &[USER_AGENT])?;
        let stations: StationsResponse = decode(&body)?;
        match stations.features.into_iter().next() {
            Some(f) => f.properties.station_identifier,
            None => return Err(FetchError::NoStationsFound),
        }
    };

    // Step 3: latest observation from that station.
    let (temperature_f, relative_humidity_pct) = {
        let body = http.get(
            &format!("{WEATHER_BASE}/stations/{station_id}/observations/latest"),
            &[USER_AGENT],
        )?;
        let obs: ObservationResponse = decode(&body)?;
        let temperature_f = obs
            .properties
            .temperature
            .value
            .map(|c| (c * 9.0 / 5.0 + 32.0).round() as i32);
        (temperature_f, obs.properties.relative_humidity.value)
    };

    // Step 4: short forecast text for the first period.
    let forecast = {
        let body = http.get(&forecast_url, &[USER_AGENT])?;
        let fc: ForecastResponse = decode(&body)?;
        fc.properties
            .periods
            .into_iter()
            .next()
            .map_or_else(|| "N/A".to_string(), |p| p.short_forecast)
    };

    info!(
        "weather: station={} temp={:?}F humidity={:?}% forecast='{}'",
        station_id, temperature_f, relative_humidity_pct, forecast
    );

    Ok(WeatherSnapshot {
        temperature_f,
        relative_humidity_pct,
        forecast,
        fetched_at_epoch: now_epoch,
    })
}
