//! Live departure board for a single station.
//!
//! The station is resolved once during setup. Departures are then refreshed by
//! a background activity; each successful fetch replaces the shared snapshot
//! wholesale and requests a render, so `render` only ever reads a complete
//! list. A failed refresh keeps the previous list on screen.
//!
//! ```text
//! +--------------------------------+
//! |       U Ernst-Reuter-Platz     |
//! |U2   Pankow                  3' |
//! |M45  S+U Zoologischer Ga...  7' |
//! |245  Nordbahnhof            12' |
//! +--------------------------------+
//! ```

use core::fmt::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{Timelike, Utc};
use chrono_tz::Tz;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;
use infopanel_common::colors::{ORANGE, from_rgb, to_rgb};
use infopanel_common::{Font, HAlign, Surface, TextOptions, draw_text};
use serde::Deserialize;

use super::{Activities, Widget};
use crate::config::WidgetSpec;
use crate::error::{ConfigError, FetchError, RenderError, WidgetError};
use crate::hafas::{Departure, DepartureSource, HafasClient, Location};
use crate::timing::interval_from_secs;

/// Left edge of the direction column.
const DIRECTION_X: i32 = 25;
/// Space kept between the direction and the minutes column.
const COLUMN_GAP: i32 = 2;
const MAX_MINUTES: i32 = 99;

const HEADER_FONT: Font = Font::Regular;
const LINE_FONT: Font = Font::Bold;
const ROW_FONT: Font = Font::Regular;

#[derive(Deserialize, Debug, Clone)]
pub struct DepartureBoardParams {
    /// Station name as typed into a journey planner.
    pub location: String,

    /// IANA timezone of the station.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Lines to show. Empty shows all lines.
    #[serde(default)]
    pub lines: Vec<String>,

    /// Seconds between refreshes.
    #[serde(default = "default_refresh")]
    pub refresh: f64,

    /// Departures requested per refresh.
    #[serde(default = "default_max_departures")]
    pub max_departures: u32,

    #[serde(default = "default_color")]
    pub color: [u8; 3],
}

fn default_timezone() -> String { "UTC".to_string() }

const fn default_refresh() -> f64 { 30.0 }

const fn default_max_departures() -> u32 { 20 }

fn default_color() -> [u8; 3] { to_rgb(ORANGE) }

// =============================================================================
// Snapshot
// =============================================================================

/// Departure list shared between the refresh activity and `render`.
#[derive(Clone, Default)]
struct Snapshot(Arc<Mutex<Arc<Vec<Departure>>>>);

impl Snapshot {
    fn replace(
        &self,
        departures: Vec<Departure>,
    ) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Arc::new(departures);
    }

    fn current(&self) -> Arc<Vec<Departure>> { Arc::clone(&self.0.lock().unwrap_or_else(PoisonError::into_inner)) }
}

/// Everything a refresh needs, cloned into the background activity.
#[derive(Clone)]
struct Fetcher {
    source: Arc<dyn DepartureSource>,
    location_id: String,
    timezone: Tz,
    lines: Vec<String>,
    top: u32,
}

impl Fetcher {
    fn fetch(&self) -> Result<Vec<Departure>, FetchError> {
        let mut departures = self
            .source
            .list_departures(&self.location_id, self.top, current_minutes(self.timezone))?;
        if !self.lines.is_empty() {
            departures.retain(|d| self.lines.contains(&d.name));
        }
        Ok(departures)
    }
}

/// Minute of the day at the station.
fn current_minutes(timezone: Tz) -> i32 {
    let now = Utc::now().with_timezone(&timezone);
    (now.hour() * 60 + now.minute()) as i32
}

// =============================================================================
// Widget
// =============================================================================

pub struct DepartureBoard {
    query: String,
    timezone: Tz,
    lines: Vec<String>,
    refresh: Duration,
    top: u32,
    color: Rgb888,
    source: Option<Arc<dyn DepartureSource>>,
    location: Option<Location>,
    departures: Snapshot,
}

impl DepartureBoard {
    /// Board backed by the HAFAS web service, connected during setup.
    pub fn new(params: DepartureBoardParams) -> Result<Self, ConfigError> {
        let timezone = params
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(params.timezone.clone()))?;
        let refresh = interval_from_secs(params.refresh).ok_or(ConfigError::InvalidRefresh(params.refresh))?;

        Ok(Self {
            query: params.location,
            timezone,
            lines: params.lines,
            refresh,
            top: params.max_departures,
            color: from_rgb(params.color),
            source: None,
            location: None,
            departures: Snapshot::default(),
        })
    }

    /// Board reading from the given source instead of the web service.
    pub fn with_source(
        params: DepartureBoardParams,
        source: Arc<dyn DepartureSource>,
    ) -> Result<Self, ConfigError> {
        let mut board = Self::new(params)?;
        board.source = Some(source);
        Ok(board)
    }

    pub fn from_spec(spec: &WidgetSpec) -> Result<Box<dyn Widget>, ConfigError> {
        Ok(Box::new(Self::new(spec.params()?)?))
    }

    fn source(&mut self) -> Result<Arc<dyn DepartureSource>, FetchError> {
        if let Some(source) = &self.source {
            return Ok(Arc::clone(source));
        }
        let source: Arc<dyn DepartureSource> = Arc::new(HafasClient::new()?);
        self.source = Some(Arc::clone(&source));
        Ok(source)
    }
}

impl Widget for DepartureBoard {
    fn setup(
        &mut self,
        activities: &mut Activities,
    ) -> Result<(), WidgetError> {
        let source = self.source()?;
        let location = source
            .search_location(&self.query)?
            .ok_or_else(|| WidgetError::LocationNotFound(self.query.clone()))?;
        tracing::info!(query = %self.query, station = %location.name, id = %location.id, "Resolved station");

        let fetcher = Fetcher {
            source,
            location_id: location.id.clone(),
            timezone: self.timezone,
            lines: self.lines.clone(),
            top: self.top,
        };
        self.location = Some(location);

        match fetcher.fetch() {
            Ok(departures) => self.departures.replace(departures),
            Err(err) => tracing::warn!(query = %self.query, error = %err, "Initial departure fetch failed"),
        }

        let snapshot = self.departures.clone();
        let refresh = self.refresh;
        activities.register("refresh", move |ctx| {
            while ctx.sleep(refresh) {
                match fetcher.fetch() {
                    Ok(departures) => {
                        tracing::debug!(station = %fetcher.location_id, count = departures.len(), "Departures refreshed");
                        snapshot.replace(departures);
                        ctx.request_render();
                    }
                    Err(err) => {
                        tracing::warn!(station = %fetcher.location_id, error = %err, "Departure refresh failed");
                    }
                }
            }
        })
    }

    fn render(
        &mut self,
        surface: &mut dyn Surface,
        _delta: Duration,
    ) -> Result<(), RenderError> {
        let width = surface.width();
        let line_height = surface.line_height(ROW_FONT);

        let station = self.location.as_ref().map_or("Unknown location", |l| l.name.as_str());
        draw_text(
            surface,
            station,
            Point::new(width / 2, 0),
            &TextOptions::new(HEADER_FONT).max_width(width).halign(HAlign::Center),
            self.color,
        );

        let rows = (surface.height() / line_height - 1).max(0) as usize;
        let departures = self.departures.current();
        for (i, departure) in departures.iter().take(rows).enumerate() {
            let y = (i as i32 + 1) * line_height;

            draw_text(surface, &departure.name, Point::new(1, y), &TextOptions::new(LINE_FONT), self.color);

            let mut minutes: heapless::String<8> = heapless::String::new();
            let _ = write!(minutes, "{}'", departure.minutes.clamp(0, MAX_MINUTES));
            let minutes_box = draw_text(
                surface,
                &minutes,
                Point::new(width - 1, y),
                &TextOptions::new(ROW_FONT).halign(HAlign::Right),
                self.color,
            );

            let direction_width = minutes_box.top_left.x - COLUMN_GAP - DIRECTION_X;
            draw_text(
                surface,
                &departure.direction,
                Point::new(DIRECTION_X, y),
                &TextOptions::new(ROW_FONT).max_width(direction_width),
                self.color,
            );
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
