//! HAFAS transit data: station lookup and departure boards.
//!
//! The departure board widget talks to a [`DepartureSource`]. The production
//! implementation is [`HafasClient`], which speaks the JSON protocol of the BVG
//! HAFAS gate; tests substitute their own sources.
//!
//! # Departure Times
//!
//! HAFAS reports station-local times as `HHMMSS`, or `DDHHMMSS` when the
//! departure falls on a following day. Minutes until departure are computed
//! against the current minute of the day in the station's timezone. A result
//! of twelve hours or more is taken to be yesterday's departure seen across
//! midnight and shifted back by a day.

mod client;

use serde::Deserialize;
use serde::de::DeserializeOwned;

pub use client::{DEFAULT_ENDPOINT, HafasClient};

use crate::error::FetchError;

const MINUTES_PER_DAY: i32 = 24 * 60;
const HALF_DAY_MINUTES: i32 = 12 * 60;

/// A station.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Location {
    /// Opaque HAFAS location id (`lid`).
    pub id: String,
    pub name: String,
}

/// One upcoming departure.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Departure {
    pub id: String,
    /// Line name, e.g. `U2` or `M45`.
    pub name: String,
    pub direction: String,
    pub cancelled: bool,
    /// Minutes until departure.
    pub minutes: i32,
}

/// Blocking source of station and departure data.
pub trait DepartureSource: Send + Sync {
    /// Find the best matching station for `query`.
    fn search_location(
        &self,
        query: &str,
    ) -> Result<Option<Location>, FetchError>;

    /// Upcoming departures at `location_id`, soonest first.
    ///
    /// Past and cancelled departures are left out.
    fn list_departures(
        &self,
        location_id: &str,
        top: u32,
        now_minutes: i32,
    ) -> Result<Vec<Departure>, FetchError>;
}

// =============================================================================
// Wire Format
// =============================================================================

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(rename = "svcResL", default = "Vec::new")]
    results: Vec<ServiceResult<T>>,
}

#[derive(Deserialize)]
struct ServiceResult<T> {
    #[serde(default)]
    err: Option<String>,
    #[serde(rename = "errTxt", default)]
    err_txt: Option<String>,
    res: Option<T>,
}

#[derive(Deserialize)]
struct LocMatchResult {
    #[serde(rename = "match")]
    matched: LocMatch,
}

#[derive(Deserialize)]
struct LocMatch {
    #[serde(rename = "locL", default)]
    locations: Vec<RawLocation>,
}

#[derive(Deserialize)]
struct RawLocation {
    lid: String,
    name: String,
}

#[derive(Deserialize)]
struct StationBoardResult {
    common: Common,
    #[serde(rename = "jnyL", default)]
    journeys: Vec<RawJourney>,
}

#[derive(Deserialize)]
struct Common {
    #[serde(rename = "prodL", default)]
    products: Vec<RawProduct>,
}

#[derive(Deserialize)]
struct RawProduct {
    name: String,
}

#[derive(Deserialize)]
struct RawJourney {
    jid: String,
    #[serde(rename = "prodX")]
    product: usize,
    #[serde(rename = "dirTxt", default)]
    direction: String,
    #[serde(rename = "stbStop")]
    stop: RawStop,
}

#[derive(Deserialize)]
struct RawStop {
    #[serde(rename = "dTimeS")]
    scheduled: String,
    #[serde(rename = "dTimeR", default)]
    realtime: Option<String>,
    #[serde(rename = "dCncl", default)]
    cancelled: bool,
}

/// Unwrap the first service result of a HAFAS response body.
fn decode_result<T>(body: &str) -> Result<T, FetchError>
where
    T: DeserializeOwned,
{
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    let result = envelope
        .results
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Malformed("response contains no service results".to_string()))?;

    if let Some(code) = result.err
        && code != "OK"
    {
        return Err(FetchError::Service {
            message: result.err_txt.unwrap_or_default(),
            code,
        });
    }

    result
        .res
        .ok_or_else(|| FetchError::Malformed("service result has no payload".to_string()))
}

/// Decode a `LocMatch` response into its best match.
pub fn decode_location(body: &str) -> Result<Option<Location>, FetchError> {
    let result: LocMatchResult = decode_result(body)?;
    Ok(result.matched.locations.into_iter().next().map(|raw| Location {
        id: raw.lid,
        name: clean_name(&raw.name),
    }))
}

/// Decode a `StationBoard` response into upcoming departures, soonest first.
pub fn decode_departures(
    body: &str,
    now_minutes: i32,
) -> Result<Vec<Departure>, FetchError> {
    let result: StationBoardResult = decode_result(body)?;
    let products = &result.common.products;

    let mut departures = result
        .journeys
        .into_iter()
        .map(|journey| -> Result<Departure, FetchError> {
            let name = products
                .get(journey.product)
                .ok_or_else(|| FetchError::Malformed(format!("unknown product index {}", journey.product)))?
                .name
                .clone();
            let timestamp = journey.stop.realtime.as_deref().unwrap_or(&journey.stop.scheduled);
            Ok(Departure {
                id: journey.jid,
                name,
                direction: clean_name(&journey.direction),
                cancelled: journey.stop.cancelled,
                minutes: minutes_until(timestamp_to_minutes(timestamp)?, now_minutes),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    departures.retain(|d| !d.cancelled && d.minutes > 0);
    departures.sort_by_key(|d| d.minutes);
    Ok(departures)
}

/// Minutes since midnight of a HAFAS `HHMMSS` / `DDHHMMSS` time.
pub fn timestamp_to_minutes(timestamp: &str) -> Result<i32, FetchError> {
    let malformed = || FetchError::Malformed(format!("invalid time '{timestamp}'"));
    if !timestamp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let (days, time) = match timestamp.len() {
        8 => (&timestamp[..2], &timestamp[2..]),
        6 => ("0", timestamp),
        _ => return Err(malformed()),
    };
    let field = |s: &str| s.parse::<i32>().map_err(|_| malformed());

    let days = field(days)?;
    let hours = field(&time[..2])?;
    let minutes = field(&time[2..4])?;
    field(&time[4..6])?;

    Ok(days * MINUTES_PER_DAY + hours * 60 + minutes)
}

/// Minutes from `now_minutes` until `departure_minutes`, accounting for midnight.
pub const fn minutes_until(
    departure_minutes: i32,
    now_minutes: i32,
) -> i32 {
    let minutes = departure_minutes - now_minutes;
    if minutes >= HALF_DAY_MINUTES {
        minutes - MINUTES_PER_DAY
    } else {
        minutes
    }
}

/// Strip the redundant city suffix HAFAS appends to Berlin stations.
pub fn clean_name(name: &str) -> String { name.replace("(Berlin)", "").trim().to_string() }

// =============================================================================
// Tests
// =============================================================================
