//! Widget type registry.
//!
//! Maps the `type` field of a widget configuration entry to a constructor.

use super::{DepartureBoard, TextWidget, Widget};
use crate::config::WidgetSpec;
use crate::error::ConfigError;

type Constructor = fn(&WidgetSpec) -> Result<Box<dyn Widget>, ConfigError>;

/// Registered widget types and their constructors.
pub const WIDGET_TYPES: &[(&str, Constructor)] = &[
    ("text", TextWidget::from_spec),
    ("hafas_timetable", DepartureBoard::from_spec),
];

/// Construct the widget described by `spec`.
pub fn build_widget(spec: &WidgetSpec) -> Result<Box<dyn Widget>, ConfigError> {
    let (_, constructor) = WIDGET_TYPES
        .iter()
        .find(|(name, _)| *name == spec.kind)
        .ok_or_else(|| ConfigError::UnknownWidgetType(spec.kind.clone()))?;
    constructor(spec)
}
