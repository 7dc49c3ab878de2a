//! Data models for the floor-plan optimization client.
//!
//! This module defines the wire-level structures exchanged with the
//! optimization service:
//! - `ContainerType`: one entry of the container catalog
//! - `Placement`: a single item's assigned rectangle on the container floor
//! - `OptimizeResult`: one packing result with summary metrics
//! - `OptimizeResponse`: the mode-tagged union returned by the service
//!
//! It also defines `ClientError`, the error taxonomy every client operation
//! reports through.

use std::collections::BTreeMap;

use serde::Deserialize;

/// A container type as published by the service catalog.
///
/// Immutable once loaded; the catalog key is the container code
/// (e.g. `40GP`), so the code is not repeated inside the entry.
///
/// # Fields
/// * `name` - Human-readable container name
/// * `length_mm` - Interior floor length in millimeters
/// * `width_mm` - Interior floor width in millimeters
#[derive(Clone, Debug, Deserialize)]
pub struct ContainerType {
    pub name: String,
    #[serde(rename = "L_mm")]
    pub length_mm: f64,
    #[serde(rename = "W_mm")]
    pub width_mm: f64,
}

/// The full container catalog, keyed by container code.
///
/// A `BTreeMap` keeps iteration order deterministic for a given catalog,
/// which the default-selection policy and compare-all tie-breaking rely on.
pub type ContainerCatalog = BTreeMap<String, ContainerType>;

/// The container footprint a result was computed against.
#[derive(Clone, Debug, Deserialize)]
pub struct ContainerFootprint {
    #[serde(rename = "L_mm")]
    pub length_mm: f64,
    #[serde(rename = "W_mm")]
    pub width_mm: f64,
}

/// One item's assigned rectangle on the container floor.
///
/// `w_mm` and `h_mm` already reflect the final orientation; `rotated` is
/// informational and only affects labeling, never the drawn geometry.
///
/// # Fields
/// * `sku` - Item identifier from the uploaded spreadsheet
/// * `x` - X position of the lower left corner in millimeters
/// * `y` - Y position of the lower left corner in millimeters
/// * `w_mm` - Final width in millimeters
/// * `h_mm` - Final height in millimeters
/// * `rotated` - Whether the item was rotated relative to its input row
#[derive(Clone, Debug, Deserialize)]
pub struct Placement {
    pub sku: String,
    pub x: f64,
    pub y: f64,
    pub w_mm: f64,
    pub h_mm: f64,
    #[serde(default)]
    pub rotated: bool,
}

/// Aggregate metrics of one packing result.
///
/// The service guarantees `utilization_area` lies in `[0, 1]` and that
/// `placed + unplaced` accounts for all input rows; the client trusts both.
#[derive(Clone, Debug, Deserialize)]
pub struct LayoutSummary {
    pub placed: usize,
    pub unplaced: usize,
    pub utilization_area: f64,
    pub leftover_area_mm2: f64,
    pub largest_free_rect_mm2: f64,
}

/// One packing result for a single container footprint.
///
/// `unplaced_items` is opaque to the client: it is listed as text in the
/// rendered output but never interpreted.
#[derive(Clone, Debug, Deserialize)]
pub struct OptimizeResult {
    pub strategy: String,
    pub container: ContainerFootprint,
    pub margin_mm: u32,
    pub summary: LayoutSummary,
    pub placements: Vec<Placement>,
    #[serde(default)]
    pub unplaced_items: Vec<serde_json::Value>,
}

/// Catalog metadata plus result for one container in a compare-all response.
#[derive(Clone, Debug, Deserialize)]
pub struct ContainerOutcome {
    pub meta: ContainerType,
    pub result: OptimizeResult,
}

/// The discriminated response of the optimize operation.
///
/// A tagged union with exactly two cases, discriminated by the `mode`
/// field. Any other shape fails deserialization and is surfaced as
/// `ClientError::MalformedResponse`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "mode")]
pub enum OptimizeResponse {
    /// Result for the one requested container type.
    #[serde(rename = "single")]
    Single {
        container_code: String,
        meta: ContainerType,
        result: OptimizeResult,
    },
    /// Per-container results for every known type, with the service's own
    /// ranking. The client re-ranks via the aggregator and treats
    /// `best_container` as informational.
    #[serde(rename = "compare_all")]
    CompareAll {
        best_container: String,
        results: BTreeMap<String, ContainerOutcome>,
    },
}

/// Error taxonomy of the client.
///
/// Every failure path resolves to exactly one of these variants; no error is
/// retried automatically.
#[derive(Debug, Clone)]
pub enum ClientError {
    /// Snapshot capture failed; the previously captured snapshot, if any,
    /// is left untouched.
    UnreadableFile(String),
    /// The catalog could not be fetched at the network level. Carries the
    /// configured service address for diagnostics.
    ServiceUnreachable { service_url: String, detail: String },
    /// The catalog endpoint answered but the body did not parse.
    MalformedCatalog { service_url: String, detail: String },
    /// A submission was attempted without a snapshot; no request was sent.
    Validation(String),
    /// The optimize operation failed; the detail is the response body text,
    /// or a guided remediation message for the recognized case of the
    /// source file changing mid-upload.
    Service(String),
    /// The optimize response was a success but its shape was unrecognized.
    MalformedResponse(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::UnreadableFile(msg) => write!(f, "Could not read file: {}", msg),
            ClientError::ServiceUnreachable {
                service_url,
                detail,
            } => write!(
                f,
                "Could not reach the optimization service at {}: {}",
                service_url, detail
            ),
            ClientError::MalformedCatalog {
                service_url,
                detail,
            } => write!(
                f,
                "Container catalog from {} could not be parsed: {}",
                service_url, detail
            ),
            ClientError::Validation(msg) => write!(f, "Invalid submission: {}", msg),
            ClientError::Service(msg) => write!(f, "Optimization failed: {}", msg),
            ClientError::MalformedResponse(msg) => {
                write!(f, "Unrecognized service response: {}", msg)
            }
        }
    }
}

impl std::error::Error for ClientError {}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_JSON: &str = r#"{
        "mode": "single",
        "container_code": "40GP",
        "meta": {"name": "40ft General Purpose", "L_mm": 12032, "W_mm": 2352},
        "result": {
            "strategy": "maxrects",
            "container": {"L_mm": 12032, "W_mm": 2352},
            "margin_mm": 0,
            "summary": {
                "placed": 2,
                "unplaced": 1,
                "utilization_area": 0.42,
                "leftover_area_mm2": 16000000.0,
                "largest_free_rect_mm2": 9000000.0
            },
            "placements": [
                {"sku": "PAL-1", "x": 0, "y": 0, "w_mm": 1200, "h_mm": 800, "rotated": false},
                {"sku": "PAL-2", "x": 1200, "y": 0, "w_mm": 800, "h_mm": 1200, "rotated": true}
            ],
            "unplaced_items": [{"sku": "PAL-3"}]
        }
    }"#;

    #[test]
    fn single_response_parses() {
        let response: OptimizeResponse =
            serde_json::from_str(SINGLE_JSON).expect("single response should parse");
        match response {
            OptimizeResponse::Single {
                container_code,
                meta,
                result,
            } => {
                assert_eq!(container_code, "40GP");
                assert_eq!(meta.length_mm, 12032.0);
                assert_eq!(result.summary.placed, 2);
                assert_eq!(result.placements.len(), 2);
                assert!(result.placements[1].rotated);
            }
            OptimizeResponse::CompareAll { .. } => panic!("expected single mode"),
        }
    }

    #[test]
    fn compare_all_response_parses() {
        let json = r#"{
            "mode": "compare_all",
            "best_container": "20GP",
            "results": {
                "20GP": {
                    "meta": {"name": "20ft", "L_mm": 5898, "W_mm": 2352},
                    "result": {
                        "strategy": "maxrects",
                        "container": {"L_mm": 5898, "W_mm": 2352},
                        "margin_mm": 5,
                        "summary": {
                            "placed": 4,
                            "unplaced": 0,
                            "utilization_area": 0.8,
                            "leftover_area_mm2": 100.0,
                            "largest_free_rect_mm2": 50.0
                        },
                        "placements": [],
                        "unplaced_items": []
                    }
                }
            }
        }"#;
        let response: OptimizeResponse =
            serde_json::from_str(json).expect("compare_all response should parse");
        match response {
            OptimizeResponse::CompareAll {
                best_container,
                results,
            } => {
                assert_eq!(best_container, "20GP");
                assert_eq!(results.len(), 1);
                assert_eq!(results["20GP"].result.margin_mm, 5);
            }
            OptimizeResponse::Single { .. } => panic!("expected compare_all mode"),
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let json = r#"{"mode": "batch", "results": {}}"#;
        let parsed = serde_json::from_str::<OptimizeResponse>(json);
        assert!(parsed.is_err(), "unknown mode tags must not deserialize");
    }

    #[test]
    fn missing_rotated_flag_defaults_to_false() {
        let json = r#"{"sku": "A", "x": 0, "y": 0, "w_mm": 10, "h_mm": 20}"#;
        let placement: Placement = serde_json::from_str(json).expect("placement should parse");
        assert!(!placement.rotated);
    }

    #[test]
    fn catalog_parses_from_wire_names() {
        let json = r#"{
            "40GP": {"name": "40ft General Purpose", "L_mm": 12032, "W_mm": 2352},
            "20GP": {"name": "20ft General Purpose", "L_mm": 5898, "W_mm": 2352}
        }"#;
        let catalog: ContainerCatalog =
            serde_json::from_str(json).expect("catalog should parse");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog["40GP"].width_mm, 2352.0);
        // BTreeMap order is the catalog's natural iteration order.
        let codes: Vec<&str> = catalog.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["20GP", "40GP"]);
    }
}
