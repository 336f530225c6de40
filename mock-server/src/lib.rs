use std::{cmp::Ordering, collections::BTreeMap, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::debug;

/// In-memory resource collections keyed by URL path.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    resources: BTreeMap<String, Vec<Value>>,
}

impl Dataset {
    pub fn insert(&mut self, path: &str, items: Vec<Value>) {
        self.resources.insert(path.to_string(), items);
    }

    pub fn get(&self, path: &str) -> Option<&[Value]> {
        self.resources.get(path).map(Vec::as_slice)
    }

    /// A small slice of a real network: four routes, three stops, two
    /// vehicles, three predictions and one alert.
    pub fn fixture() -> Self {
        let mut data = Dataset::default();
        data.insert(
            "routes",
            vec![
                route("Red", "Red Line", "", 1, "DA291C", "line-Red"),
                route("Orange", "Orange Line", "", 1, "ED8B00", "line-Orange"),
                route("Green-B", "Green Line B", "B", 0, "00843D", "line-Green"),
                route("1", "Harvard Square - Nubian Station", "1", 3, "FFC72C", "line-1"),
            ],
        );
        data.insert(
            "stops",
            vec![
                stop("place-pktrm", "Park Street", &["Red", "Green-B"]),
                stop("place-dwnxg", "Downtown Crossing", &["Red", "Orange"]),
                stop("place-portr", "Porter", &["Red"]),
            ],
        );
        data.insert(
            "vehicles",
            vec![
                vehicle("R-5463", "1863", "Red", "T-100"),
                vehicle("O-5480", "1402", "Orange", "T-200"),
            ],
        );
        data.insert(
            "predictions",
            vec![
                prediction("prediction-1", "2026-10-14T08:15:00-04:00", "Red", "place-portr", "T-100", Some("R-5463")),
                prediction("prediction-2", "2026-10-14T08:21:00-04:00", "Red", "place-portr", "T-101", None),
                prediction("prediction-3", "2026-10-14T08:17:00-04:00", "Orange", "place-dwnxg", "T-200", Some("O-5480")),
            ],
        );
        data.insert(
            "alerts",
            vec![json!({
                "id": "alert-1",
                "type": "alert",
                "attributes": {"header": "Shuttle buses replace Red Line service", "severity": 7},
                "relationships": {"route": {"data": {"id": "Red", "type": "route"}}}
            })],
        );
        data
    }
}

fn route(id: &str, long_name: &str, short_name: &str, kind: u8, color: &str, line: &str) -> Value {
    json!({
        "id": id,
        "type": "route",
        "attributes": {
            "color": color,
            "text_color": "FFFFFF",
            "description": if kind == 3 { "Key Bus" } else { "Rapid Transit" },
            "fare_class": if kind == 3 { "Local Bus" } else { "Rapid Transit" },
            "long_name": long_name,
            "short_name": short_name,
            "direction_names": ["Outbound", "Inbound"],
            "direction_destinations": ["Outbound", "Inbound"],
            "type": kind
        },
        "relationships": {"line": {"data": {"id": line, "type": "line"}}}
    })
}

fn stop(id: &str, name: &str, routes: &[&str]) -> Value {
    let routes: Vec<Value> = routes.iter().map(|r| json!({"id": r, "type": "route"})).collect();
    json!({
        "id": id,
        "type": "stop",
        "attributes": {"name": name, "location_type": 1, "wheelchair_boarding": 1},
        "relationships": {"route": {"data": routes}}
    })
}

fn vehicle(id: &str, label: &str, route: &str, trip: &str) -> Value {
    json!({
        "id": id,
        "type": "vehicle",
        "attributes": {"label": label, "current_status": "IN_TRANSIT_TO", "direction_id": 0},
        "relationships": {
            "route": {"data": {"id": route, "type": "route"}},
            "trip": {"data": {"id": trip, "type": "trip"}}
        }
    })
}

fn prediction(id: &str, arrival: &str, route: &str, stop: &str, trip: &str, vehicle: Option<&str>) -> Value {
    json!({
        "id": id,
        "type": "prediction",
        "attributes": {
            "arrival_time": arrival,
            "departure_time": arrival,
            "direction_id": 0,
            "schedule_relationship": null,
            "status": null,
            "stop_sequence": 10
        },
        "relationships": {
            "route": {"data": {"id": route, "type": "route"}},
            "stop": {"data": {"id": stop, "type": "stop"}},
            "trip": {"data": {"id": trip, "type": "trip"}},
            "vehicle": {"data": vehicle.map(|v| json!({"id": v, "type": "vehicle"}))}
        }
    })
}

pub type Db = Arc<Dataset>;

pub fn app() -> Router {
    app_with(Dataset::fixture())
}

pub fn app_with(data: Dataset) -> Router {
    Router::new()
        .route("/{resource}", get(query_resource))
        .with_state(Arc::new(data))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn query_resource(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    debug!(%resource, ?params, "query");
    let Some(items) = db.get(&resource) else {
        return not_found(&resource);
    };
    let fields = sparse_fields(&params);

    if let Some(id) = params.get("id") {
        return match items.iter().find(|item| item["id"] == id.as_str()) {
            Some(item) => Json(json!({"data": apply_fields(item, &fields)})).into_response(),
            None => not_found(id),
        };
    }

    let mut selected: Vec<&Value> = items.iter().filter(|item| matches_filters(item, &params)).collect();
    if let Some(sort) = params.get("sort") {
        let (key, descending) = match sort.strip_prefix('-') {
            Some(key) => (key, true),
            None => (sort.as_str(), false),
        };
        selected.sort_by(|a, b| {
            let order = compare(sort_value(a, key), sort_value(b, key));
            if descending {
                order.reverse()
            } else {
                order
            }
        });
    }
    let offset = page_param(&params, "offset").unwrap_or(0);
    let limit = page_param(&params, "limit").unwrap_or(usize::MAX);

    let data: Vec<Value> = selected
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|item| apply_fields(item, &fields))
        .collect();
    Json(json!({"data": data})).into_response()
}

fn not_found(detail: &str) -> Response {
    let body = json!({"errors": [{"status": "404", "code": "not_found", "detail": detail}]});
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

fn bracketed<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix)?.strip_suffix(']')
}

fn page_param(params: &HashMap<String, String>, name: &str) -> Option<usize> {
    params.get(&format!("page[{name}]"))?.parse().ok()
}

fn sparse_fields(params: &HashMap<String, String>) -> HashMap<String, Vec<String>> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let kind = bracketed(key, "fields[")?;
            Some((kind.to_string(), value.split(',').map(str::to_string).collect()))
        })
        .collect()
}

fn apply_fields(item: &Value, fields: &HashMap<String, Vec<String>>) -> Value {
    let mut item = item.clone();
    let kind = item["type"].as_str().unwrap_or_default().to_string();
    if let (Some(wanted), Some(attrs)) = (fields.get(&kind), item["attributes"].as_object_mut()) {
        attrs.retain(|name, _| wanted.contains(name));
    }
    item
}

/// Ids of a relationship, whether to-one or to-many.
fn related_ids(item: &Value, name: &str) -> Vec<String> {
    match &item["relationships"][name]["data"] {
        Value::Object(ident) => ident.get("id").and_then(Value::as_str).map(str::to_string).into_iter().collect(),
        Value::Array(idents) => idents
            .iter()
            .filter_map(|i| i["id"].as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches_filters(item: &Value, params: &HashMap<String, String>) -> bool {
    params.iter().all(|(key, value)| {
        let Some(name) = bracketed(key, "filter[") else {
            return true;
        };
        let wanted: Vec<&str> = value.split(',').collect();
        let candidates: Vec<String> = if name == "id" {
            item["id"].as_str().map(str::to_string).into_iter().collect()
        } else if item["relationships"].get(name).is_some() {
            related_ids(item, name)
        } else {
            scalar_string(&item["attributes"][name]).into_iter().collect()
        };
        candidates.iter().any(|c| wanted.contains(&c.as_str()))
    })
}

fn sort_value<'a>(item: &'a Value, key: &str) -> &'a Value {
    if key == "id" {
        &item["id"]
    } else {
        &item["attributes"][key]
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn fixture_has_every_served_collection() {
        let data = Dataset::fixture();
        for path in ["routes", "stops", "vehicles", "predictions", "alerts"] {
            assert!(data.get(path).is_some_and(|items| !items.is_empty()), "{path}");
        }
        assert!(data.get("routes_by_id").is_none());
    }

    #[test]
    fn filters_match_relationships_ids_and_attributes() {
        let data = Dataset::fixture();
        let stops = data.get("stops").unwrap();
        let on_orange: Vec<_> = stops
            .iter()
            .filter(|s| matches_filters(s, &params(&[("filter[route]", "Orange")])))
            .collect();
        assert_eq!(on_orange.len(), 1);
        assert_eq!(on_orange[0]["id"], "place-dwnxg");

        let routes = data.get("routes").unwrap();
        let by_id = routes
            .iter()
            .filter(|r| matches_filters(r, &params(&[("filter[id]", "Red,1")])))
            .count();
        assert_eq!(by_id, 2);
        let by_type = routes
            .iter()
            .filter(|r| matches_filters(r, &params(&[("filter[type]", "0,1")])))
            .count();
        assert_eq!(by_type, 3);
    }

    #[test]
    fn non_filter_params_do_not_narrow() {
        let data = Dataset::fixture();
        let route = &data.get("routes").unwrap()[0];
        assert!(matches_filters(route, &params(&[("sort", "long_name"), ("page[limit]", "1")])));
    }

    #[test]
    fn sparse_fieldsets_apply_to_matching_type_only() {
        let data = Dataset::fixture();
        let fields = sparse_fields(&params(&[("fields[route]", "long_name,type")]));
        let route = apply_fields(&data.get("routes").unwrap()[0], &fields);
        let attrs = route["attributes"].as_object().unwrap();
        assert_eq!(attrs.len(), 2);
        assert!(attrs.contains_key("long_name"));

        let stop = apply_fields(&data.get("stops").unwrap()[0], &fields);
        assert!(stop["attributes"]["name"].is_string());
    }

    #[test]
    fn compares_numbers_and_strings() {
        assert_eq!(compare(&json!(1), &json!(3)), Ordering::Less);
        assert_eq!(compare(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare(&json!(null), &json!("a")), Ordering::Equal);
    }
}
