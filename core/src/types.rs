//! JSON:API documents and the domain records decoded from them.
//!
//! # Design
//! Decoding is a separate step over the transport's output. `Document` is a
//! thin envelope; `Route` and `Prediction` pick the attributes and
//! relationship ids callers usually want and keep the resource id.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, Result};

/// Top-level response document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub data: PrimaryData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<BTreeMap<String, Value>>,
}

/// A singleton lookup yields one object, a collection yields an array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PrimaryData {
    One(Box<ResourceObject>),
    Many(Vec<ResourceObject>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceObject {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, Value>,
    #[serde(default)]
    pub relationships: BTreeMap<String, Relationship>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<RelationshipData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RelationshipData {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Document {
    /// Decode a response document. A `null` primary data member means the
    /// lookup matched nothing.
    pub fn from_value(value: Value) -> Result<Self> {
        if value.get("data").is_some_and(Value::is_null) {
            return Err(ApiError::EmptyResponse);
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn resources(&self) -> &[ResourceObject] {
        match &self.data {
            PrimaryData::One(one) => std::slice::from_ref(one.as_ref()),
            PrimaryData::Many(many) => many,
        }
    }

    pub fn routes(&self) -> Result<Vec<Route>> {
        self.resources().iter().map(Route::try_from).collect()
    }

    pub fn predictions(&self) -> Result<Vec<Prediction>> {
        self.resources().iter().map(Prediction::try_from).collect()
    }
}

impl ResourceObject {
    fn expect_type(&self, expected: &'static str) -> Result<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(ApiError::UnexpectedType {
                expected,
                found: self.kind.clone(),
            })
        }
    }

    fn attributes_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.attributes.clone()))?)
    }

    /// Id of a to-one relationship, when present and populated.
    pub fn related_id(&self, name: &str) -> Option<&str> {
        match self.relationships.get(name)?.data.as_ref()? {
            RelationshipData::One(ident) => Some(ident.id.as_str()),
            RelationshipData::Many(_) => None,
        }
    }
}

/// Mode of a route, as encoded by the `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RouteType {
    LightRail,
    HeavyRail,
    CommuterRail,
    Bus,
    Ferry,
}

impl RouteType {
    pub fn name(self) -> &'static str {
        match self {
            RouteType::LightRail => "Light Rail",
            RouteType::HeavyRail => "Heavy Rail",
            RouteType::CommuterRail => "Commuter Rail",
            RouteType::Bus => "Bus",
            RouteType::Ferry => "Ferry",
        }
    }
}

impl TryFrom<u8> for RouteType {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(RouteType::LightRail),
            1 => Ok(RouteType::HeavyRail),
            2 => Ok(RouteType::CommuterRail),
            3 => Ok(RouteType::Bus),
            4 => Ok(RouteType::Ferry),
            other => Err(format!("unknown route type {other}")),
        }
    }
}

impl From<RouteType> for u8 {
    fn from(value: RouteType) -> Self {
        value as u8
    }
}

#[derive(Debug, Deserialize)]
struct RouteAttributes {
    #[serde(default)]
    color: String,
    #[serde(default)]
    text_color: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    fare_class: String,
    #[serde(default)]
    long_name: String,
    #[serde(default)]
    short_name: String,
    #[serde(default)]
    direction_names: Vec<Option<String>>,
    #[serde(default)]
    direction_destinations: Vec<Option<String>>,
    #[serde(rename = "type")]
    route_type: RouteType,
}

/// A transit route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: String,
    pub color: String,
    pub text_color: String,
    pub description: String,
    pub fare_class: String,
    pub long_name: String,
    pub short_name: String,
    pub direction_names: Vec<Option<String>>,
    pub direction_destinations: Vec<Option<String>>,
    pub route_type: RouteType,
}

impl TryFrom<&ResourceObject> for Route {
    type Error = ApiError;

    fn try_from(resource: &ResourceObject) -> Result<Self> {
        resource.expect_type("route")?;
        let attrs: RouteAttributes = resource.attributes_as()?;
        Ok(Route {
            id: resource.id.clone(),
            color: attrs.color,
            text_color: attrs.text_color,
            description: attrs.description,
            fare_class: attrs.fare_class,
            long_name: attrs.long_name,
            short_name: attrs.short_name,
            direction_names: attrs.direction_names,
            direction_destinations: attrs.direction_destinations,
            route_type: attrs.route_type,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PredictionAttributes {
    arrival_time: Option<String>,
    departure_time: Option<String>,
    direction_id: Option<u8>,
    schedule_relationship: Option<String>,
    status: Option<String>,
    stop_sequence: Option<u32>,
}

/// A realtime arrival/departure prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub id: String,
    pub arrival_time: Option<DateTime<FixedOffset>>,
    pub departure_time: Option<DateTime<FixedOffset>>,
    pub direction_id: Option<u8>,
    pub schedule_relationship: Option<String>,
    pub status: Option<String>,
    pub stop_sequence: Option<u32>,
    pub route: Option<String>,
    pub stop: Option<String>,
    pub trip: Option<String>,
    pub vehicle: Option<String>,
}

fn parse_time(value: Option<String>) -> Result<Option<DateTime<FixedOffset>>> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .or_else(|_| DateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%z"))
                .map_err(|source| ApiError::InvalidTimestamp { value: raw, source })
        })
        .transpose()
}

impl TryFrom<&ResourceObject> for Prediction {
    type Error = ApiError;

    fn try_from(resource: &ResourceObject) -> Result<Self> {
        resource.expect_type("prediction")?;
        let attrs: PredictionAttributes = resource.attributes_as()?;
        let related = |name: &str| resource.related_id(name).map(str::to_string);
        Ok(Prediction {
            id: resource.id.clone(),
            arrival_time: parse_time(attrs.arrival_time)?,
            departure_time: parse_time(attrs.departure_time)?,
            direction_id: attrs.direction_id,
            schedule_relationship: attrs.schedule_relationship,
            status: attrs.status,
            stop_sequence: attrs.stop_sequence,
            route: related("route"),
            stop: related("stop"),
            trip: related("trip"),
            vehicle: related("vehicle"),
        })
    }
}
