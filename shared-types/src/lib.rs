//! Wire types shared between the heatmap widget and the dashboard API
//!
//! These types mirror the REST surface exactly:
//! - `GET /heatmap/listheatpoints?userid={id}` -> array of `[lat, lng, intensity]`
//! - `GET /heatmap/listmarkers?userId={id}` -> array of `{_id, lat, lng, name}`
//! - `POST /heatmap/addmarker` body `{lat, lng, name, userId}`
//! - `POST /heatmap/removemarker` body `{_id}`
//!
//! Serializable with serde for JSON over HTTP; exported to TypeScript with
//! ts-rs for the dashboard side.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Heat points
// ============================================================================

/// A geo-located intensity sample, rendered as part of the density overlay.
///
/// The backend sends heat points as bare `[lat, lng, intensity]` triples, so
/// this is a tuple struct: serde maps it onto a JSON array. Heat points carry
/// no identity and are always replaced in bulk, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../heatmap-ui/src/types/generated.ts")]
pub struct HeatPoint(pub f64, pub f64, pub f64);

impl HeatPoint {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lng(&self) -> f64 {
        self.1
    }

    pub fn intensity(&self) -> f64 {
        self.2
    }
}

// ============================================================================
// Markers
// ============================================================================

/// A named, user-created point annotation.
///
/// `id` is assigned by the server and opaque to the client; it is only ever
/// echoed back for deletion. The client never mutates a marker in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../heatmap-ui/src/types/generated.ts")]
pub struct MarkerPoint {
    #[serde(rename = "_id")]
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

/// Body of `POST /heatmap/addmarker`. The server mints the marker id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../heatmap-ui/src/types/generated.ts")]
pub struct AddMarkerRequest {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Body of `POST /heatmap/removemarker`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../heatmap-ui/src/types/generated.ts")]
pub struct RemoveMarkerRequest {
    #[serde(rename = "_id")]
    pub id: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_point_wire_format_is_a_triple() {
        let point = HeatPoint(24.78, 120.99, 2.5);
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, "[24.78,120.99,2.5]");

        let parsed: Vec<HeatPoint> = serde_json::from_str("[[1.0,2.0,3.0],[4.0,5.0,6.0]]").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].lat(), 1.0);
        assert_eq!(parsed[0].lng(), 2.0);
        assert_eq!(parsed[0].intensity(), 3.0);
    }

    #[test]
    fn marker_uses_underscore_id_on_the_wire() {
        let marker: MarkerPoint =
            serde_json::from_str(r#"{"_id":"m1","lat":1.0,"lng":2.0,"name":"Home"}"#).unwrap();
        assert_eq!(marker.id, "m1");
        assert_eq!(marker.name, "Home");
        assert_eq!((marker.lat, marker.lng), (1.0, 2.0));

        let json = serde_json::to_string(&marker).unwrap();
        assert!(json.contains("\"_id\":\"m1\""));
        assert!(!json.contains("\"id\""));
    }

    #[test]
    fn add_marker_request_uses_camel_case_user_id() {
        let req = AddMarkerRequest {
            lat: 1.0,
            lng: 2.0,
            name: "Office".to_string(),
            user_id: "alice".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"userId\":\"alice\""));
        assert!(!json.contains("user_id"));
    }

    #[test]
    fn remove_marker_request_round_trips() {
        let req = RemoveMarkerRequest {
            id: "abc123".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"_id":"abc123"}"#);

        let parsed: RemoveMarkerRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, req);
    }
}
