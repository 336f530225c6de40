//! Translation of named arguments into the API's query-parameter dialect.
//!
//! # Design
//! The API mixes three grammars: bare parameters (`sort`, `include`, `id` on
//! singleton lookups), sparse fieldsets (`fields[...]`) and relationship
//! filters (`filter[...]`), plus pagination under `page[...]`. Which grammar
//! applies to a name depends on the resource the endpoint represents, so
//! classification takes both the endpoint identifier and the argument name.
//!
//! Names that match no rule fall through to `filter[...]`, which lets callers
//! pass filter names the API adds later.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::error::{ApiError, Result};

/// Marker carried by endpoint identifiers of singleton lookups.
pub const BY_ID_SUFFIX: &str = "_by_id";

/// Names that always select a resource's own fieldset.
const FIELD_SELECTORS: &[&str] = &["alert", "line", "prediction", "schedule", "shape", "vehicle"];

/// Endpoints of each resource that selects its own fieldset. Needed where the
/// plural does not contain the singular (`facilities`).
const RESOURCE_ENDPOINTS: &[(&str, &[&str])] = &[
    ("route", &["routes", "routes_by_id"]),
    ("stop", &["stops", "stops_by_id"]),
    ("trip", &["trips", "trips_by_id"]),
    ("service", &["services", "services_by_id"]),
    ("facility", &["facilities", "facilities_by_id"]),
];

/// A single argument value as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Text(String),
    Integer(i64),
    List(Vec<String>),
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Integer(value)
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        ArgValue::Integer(i64::from(value))
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(value: Vec<String>) -> Self {
        ArgValue::List(value)
    }
}

impl From<Vec<&str>> for ArgValue {
    fn from(value: Vec<&str>) -> Self {
        ArgValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ArgValue {
    fn from(value: &[&str]) -> Self {
        ArgValue::List(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Ordered set of arguments for one call.
///
/// Unset arguments are kept so the catalog can check their names, but the
/// classifier never emits them. A name may appear more than once; the later
/// entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    entries: Vec<(String, Option<ArgValue>)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: impl Into<ArgValue>) -> Self {
        self.entries.push((name.to_string(), Some(value.into())));
        self
    }

    pub fn set_opt<V: Into<ArgValue>>(mut self, name: &str, value: Option<V>) -> Self {
        self.entries.push((name.to_string(), value.map(Into::into)));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ArgValue>)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    /// Last non-empty value for `name`, serialized.
    pub fn value_of(&self, name: &str) -> Option<String> {
        self.entries
            .iter()
            .rev()
            .filter(|(n, _)| n == name)
            .find_map(|(_, value)| value.as_ref().and_then(serialize))
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), Some(v.into()))).collect(),
        }
    }
}

/// Finished query parameters, keyed by fully-qualified parameter name.
pub type QueryParams = BTreeMap<String, String>;

/// The four query grammars an argument can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Bare,
    Page,
    Fields,
    Filter,
}

impl Namespace {
    pub fn key(self, name: &str) -> String {
        match self {
            Namespace::Bare => name.to_string(),
            Namespace::Page => format!("page[{name}]"),
            Namespace::Fields => format!("fields[{name}]"),
            Namespace::Filter => format!("filter[{name}]"),
        }
    }

    /// Recover the namespace of an emitted parameter key.
    pub fn of_key(key: &str) -> Namespace {
        let bracketed = |prefix: &str| key.strip_prefix(prefix).is_some_and(|rest| rest.ends_with(']'));
        if bracketed("page[") {
            Namespace::Page
        } else if bracketed("fields[") {
            Namespace::Fields
        } else if bracketed("filter[") {
            Namespace::Filter
        } else {
            Namespace::Bare
        }
    }
}

/// Serialize a value, or `None` when it counts as unset.
pub fn serialize(value: &ArgValue) -> Option<String> {
    let out = match value {
        ArgValue::Text(s) => s.clone(),
        ArgValue::Integer(0) => return None,
        ArgValue::Integer(n) => n.to_string(),
        ArgValue::List(items) => items.join(","),
    };
    (!out.is_empty()).then_some(out)
}

fn endpoint_is_resource(endpoint: &str, name: &str) -> bool {
    endpoint.contains(name)
        || RESOURCE_ENDPOINTS
            .iter()
            .any(|(resource, endpoints)| *resource == name && endpoints.contains(&endpoint))
}

/// Namespace for argument `name` when calling `endpoint`. First match wins.
pub fn namespace_for(endpoint: &str, name: &str) -> Namespace {
    match name {
        "sort" | "include" => Namespace::Bare,
        "offset" | "limit" => Namespace::Page,
        _ if FIELD_SELECTORS.contains(&name) => Namespace::Fields,
        "id" if endpoint.contains(BY_ID_SUFFIX) => Namespace::Bare,
        "route" | "stop" | "trip" | "service" | "facility" if endpoint_is_resource(endpoint, name) => {
            Namespace::Fields
        }
        _ => Namespace::Filter,
    }
}

/// Translate `args` into query parameters for `endpoint`.
pub fn classify(endpoint: &str, args: &Arguments) -> Result<QueryParams> {
    if endpoint.trim().is_empty() {
        return Err(ApiError::Configuration(
            "construction of query failed: no endpoint specified".to_string(),
        ));
    }

    let mut params = QueryParams::new();
    for (name, value) in args.iter() {
        let Some(serialized) = value.and_then(serialize) else {
            trace!(endpoint, name, "dropping unset argument");
            continue;
        };
        if name.is_empty() {
            trace!(endpoint, "dropping argument with empty name");
            continue;
        }
        let key = namespace_for(endpoint, name).key(name);
        debug!(endpoint, name, key = %key, "classified argument");
        params.insert(key, serialized);
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(endpoint: &str, name: &str, value: impl Into<ArgValue>) -> QueryParams {
        classify(endpoint, &Arguments::new().set(name, value)).unwrap()
    }

    fn expect(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn sort_and_include_pass_through() {
        assert_eq!(one("routes", "sort", "-long_name"), expect(&[("sort", "-long_name")]));
        assert_eq!(one("vehicles_by_id", "include", vec!["trip", "stop"]), expect(&[("include", "trip,stop")]));
    }

    #[test]
    fn offset_and_limit_are_paginated() {
        assert_eq!(one("alerts", "limit", "3"), expect(&[("page[limit]", "3")]));
        assert_eq!(one("alerts", "offset", 20i64), expect(&[("page[offset]", "20")]));
    }

    #[test]
    fn field_selectors_ignore_endpoint() {
        for endpoint in ["routes", "vehicles", "alerts_by_id", "lines"] {
            for name in FIELD_SELECTORS {
                assert_eq!(
                    one(endpoint, name, "a,b"),
                    expect(&[(format!("fields[{name}]").as_str(), "a,b")]),
                    "{endpoint}/{name}"
                );
            }
        }
    }

    #[test]
    fn id_is_bare_only_for_singleton_lookups() {
        assert_eq!(one("routes_by_id", "id", "place-1"), expect(&[("id", "place-1")]));
        assert_eq!(one("vehicles", "id", "place-1"), expect(&[("filter[id]", "place-1")]));
    }

    #[test]
    fn own_resource_selects_fields_other_resource_filters() {
        assert_eq!(one("routes", "route", "Red"), expect(&[("fields[route]", "Red")]));
        assert_eq!(one("vehicles", "route", "Red"), expect(&[("filter[route]", "Red")]));
        assert_eq!(one("stops_by_id", "stop", "name"), expect(&[("fields[stop]", "name")]));
        assert_eq!(one("predictions", "stop", "place-portr"), expect(&[("filter[stop]", "place-portr")]));
        assert_eq!(one("services", "service", "x"), expect(&[("fields[service]", "x")]));
        assert_eq!(one("trips_by_id", "trip", "x"), expect(&[("fields[trip]", "x")]));
    }

    #[test]
    fn own_resource_matches_endpoint_by_substring() {
        assert_eq!(one("route_patterns", "route", "Red"), expect(&[("fields[route]", "Red")]));
        assert_eq!(one("route_patterns_by_id", "route", "Red"), expect(&[("fields[route]", "Red")]));
        assert_eq!(one("route_patterns", "stop", "place-pktrm"), expect(&[("filter[stop]", "place-pktrm")]));
    }

    #[test]
    fn facility_table_match_is_exact() {
        assert_eq!(one("live_facilities", "facility", "f-1"), expect(&[("filter[facility]", "f-1")]));
        assert_eq!(one("live_facilities_by_id", "facility", "f-1"), expect(&[("filter[facility]", "f-1")]));
    }

    #[test]
    fn facility_matches_plural_endpoints_through_table() {
        assert_eq!(one("facilities", "facility", "name"), expect(&[("fields[facility]", "name")]));
        assert_eq!(one("facilities_by_id", "facility", "name"), expect(&[("fields[facility]", "name")]));
        assert_eq!(one("alerts", "facility", "f-1"), expect(&[("filter[facility]", "f-1")]));
    }

    #[test]
    fn unknown_names_become_filters() {
        assert_eq!(one("stops", "wheelchair_boarding", "1"), expect(&[("filter[wheelchair_boarding]", "1")]));
    }

    #[test]
    fn lists_join_with_commas_in_order() {
        assert_eq!(one("alerts", "id", vec!["1", "2", "3"]), expect(&[("filter[id]", "1,2,3")]));
    }

    #[test]
    fn unset_and_falsy_values_are_dropped() {
        let args = Arguments::new()
            .set_opt::<&str>("id", None)
            .set("limit", "5")
            .set("sort", "")
            .set("offset", 0i64)
            .set("route", Vec::<String>::new())
            .set("stop", vec![""]);
        assert_eq!(classify("routes", &args).unwrap(), expect(&[("page[limit]", "5")]));
    }

    #[test]
    fn later_duplicate_wins() {
        let args = Arguments::new().set("limit", "5").set("limit", "7");
        assert_eq!(classify("routes", &args).unwrap(), expect(&[("page[limit]", "7")]));
    }

    #[test]
    fn empty_endpoint_is_configuration_error() {
        let args = Arguments::new().set("limit", "5");
        assert!(matches!(classify("", &args), Err(ApiError::Configuration(_))));
        assert!(matches!(classify("  ", &args), Err(ApiError::Configuration(_))));
    }

    #[test]
    fn classify_is_repeatable() {
        let args = Arguments::new().set("route", "Red").set("limit", 2u32).set("direction_id", "0");
        let first = classify("vehicles", &args).unwrap();
        assert_eq!(first, classify("vehicles", &args).unwrap());
        assert_eq!(
            first,
            expect(&[("filter[direction_id]", "0"), ("filter[route]", "Red"), ("page[limit]", "2")])
        );
    }

    #[test]
    fn namespace_of_key_recognizes_every_grammar() {
        assert_eq!(Namespace::of_key("sort"), Namespace::Bare);
        assert_eq!(Namespace::of_key("page[limit]"), Namespace::Page);
        assert_eq!(Namespace::of_key("fields[route]"), Namespace::Fields);
        assert_eq!(Namespace::of_key("filter[stop]"), Namespace::Filter);
    }

    #[test]
    fn value_of_returns_last_non_empty() {
        let args = Arguments::new().set("id", "a").set("id", "").set_opt::<&str>("id", None);
        assert_eq!(args.value_of("id").as_deref(), Some("a"));
        assert_eq!(args.value_of("route"), None);
    }
}
