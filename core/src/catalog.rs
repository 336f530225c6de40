//! Table of the API's logical operations.
//!
//! Each operation names its endpoint identifier and the closed set of
//! argument names it accepts. Collection and singleton forms of a resource
//! share one URL path; the singleton identifier carries the `_by_id` marker.

use std::fmt;
use std::str::FromStr;

use crate::error::{ApiError, Result};
use crate::query::{Arguments, BY_ID_SUFFIX};

const PAGING: &[&str] = &["offset", "limit", "sort"];

/// A logical operation of the transit API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Alerts,
    AlertById,
    Facilities,
    FacilityById,
    Lines,
    LineById,
    LiveFacilities,
    LiveFacilityById,
    Predictions,
    Routes,
    RouteById,
    RoutePatterns,
    RoutePatternById,
    Schedules,
    Services,
    ServiceById,
    Shapes,
    ShapeById,
    Stops,
    StopById,
    Trips,
    TripById,
    Vehicles,
    VehicleById,
}

impl Operation {
    pub const ALL: [Operation; 24] = [
        Operation::Alerts,
        Operation::AlertById,
        Operation::Facilities,
        Operation::FacilityById,
        Operation::Lines,
        Operation::LineById,
        Operation::LiveFacilities,
        Operation::LiveFacilityById,
        Operation::Predictions,
        Operation::Routes,
        Operation::RouteById,
        Operation::RoutePatterns,
        Operation::RoutePatternById,
        Operation::Schedules,
        Operation::Services,
        Operation::ServiceById,
        Operation::Shapes,
        Operation::ShapeById,
        Operation::Stops,
        Operation::StopById,
        Operation::Trips,
        Operation::TripById,
        Operation::Vehicles,
        Operation::VehicleById,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            Operation::Alerts => "alerts",
            Operation::AlertById => "alerts_by_id",
            Operation::Facilities => "facilities",
            Operation::FacilityById => "facilities_by_id",
            Operation::Lines => "lines",
            Operation::LineById => "lines_by_id",
            Operation::LiveFacilities => "live_facilities",
            Operation::LiveFacilityById => "live_facilities_by_id",
            Operation::Predictions => "predictions",
            Operation::Routes => "routes",
            Operation::RouteById => "routes_by_id",
            Operation::RoutePatterns => "route_patterns",
            Operation::RoutePatternById => "route_patterns_by_id",
            Operation::Schedules => "schedules",
            Operation::Services => "services",
            Operation::ServiceById => "services_by_id",
            Operation::Shapes => "shapes",
            Operation::ShapeById => "shapes_by_id",
            Operation::Stops => "stops",
            Operation::StopById => "stops_by_id",
            Operation::Trips => "trips",
            Operation::TripById => "trips_by_id",
            Operation::Vehicles => "vehicles",
            Operation::VehicleById => "vehicles_by_id",
        }
    }

    /// Argument names beyond paging and sorting, in declaration order.
    fn own_arguments(self) -> &'static [&'static str] {
        match self {
            Operation::Alerts => &[
                "id", "route", "stop", "trip", "facility", "alert", "route_type", "direction_id", "banner",
                "datetime", "lifecycle", "severity", "activity",
            ],
            Operation::AlertById => &["id", "include", "alert"],
            Operation::Facilities => &["include", "stop", "facility", "type"],
            Operation::FacilityById => &["id", "include", "facility"],
            Operation::Lines => &["id", "line"],
            Operation::LineById => &["id", "include", "line"],
            Operation::LiveFacilities => &["include", "id"],
            Operation::LiveFacilityById => &["id", "include"],
            Operation::Predictions => &[
                "include", "stop", "route", "trip", "prediction", "route_type", "direction_id", "latitude",
                "longitude", "radius", "route_pattern",
            ],
            Operation::Routes => &["include", "id", "route", "stop", "type", "direction_id", "date"],
            Operation::RouteById => &["id", "include", "route"],
            Operation::RoutePatterns => &["include", "id", "route", "stop", "direction_id"],
            Operation::RoutePatternById => &["id", "include"],
            Operation::Schedules => &[
                "include", "route", "stop", "trip", "schedule", "route_type", "direction_id", "date", "min_time",
                "max_time", "stop_sequence",
            ],
            Operation::Services => &["id", "route", "service"],
            Operation::ServiceById => &["id", "service"],
            Operation::Shapes => &["include", "route", "shape"],
            Operation::ShapeById => &["id", "include", "shape"],
            Operation::Stops => &[
                "include", "id", "route", "stop", "service", "route_type", "direction_id", "type", "latitude",
                "longitude", "radius", "date", "location_type",
            ],
            Operation::StopById => &["id", "include", "stop"],
            Operation::Trips => &[
                "include", "id", "route", "trip", "direction_id", "route_pattern", "date", "name",
            ],
            Operation::TripById => &["id", "include", "trip"],
            Operation::Vehicles => &[
                "include", "id", "route", "trip", "vehicle", "route_type", "direction_id", "label",
            ],
            Operation::VehicleById => &["id", "include", "vehicle"],
        }
    }

    pub fn is_singleton(self) -> bool {
        self.endpoint().ends_with(BY_ID_SUFFIX)
    }

    /// Whether `name` is a declared argument of this operation.
    pub fn accepts(self, name: &str) -> bool {
        (!self.is_singleton() && PAGING.contains(&name)) || self.own_arguments().contains(&name)
    }

    /// Validate argument names and required identifiers.
    pub fn check(self, args: &Arguments) -> Result<()> {
        if let Some((name, _)) = args.iter().find(|(name, _)| !self.accepts(name)) {
            return Err(ApiError::UnsupportedArgument {
                operation: self.endpoint(),
                argument: name.to_string(),
            });
        }
        if self.is_singleton() && args.value_of("id").is_none() {
            return Err(ApiError::MissingArgument {
                operation: self.endpoint(),
                argument: "id",
            });
        }
        Ok(())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

impl FromStr for Operation {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.endpoint() == s)
            .ok_or_else(|| ApiError::Configuration(format!("unknown endpoint `{s}`")))
    }
}

/// URL path for an endpoint identifier.
pub fn path_for(endpoint: &str) -> &str {
    endpoint.strip_suffix(BY_ID_SUFFIX).unwrap_or(endpoint)
}
