//! Boundary to the embedded rendering engine.
//!
//! The controller never renders anything itself. Every visible effect is a
//! command issued through [`RenderEngine`], and everything the engine reports
//! back (scene loads, tile loads, pick results) enters through the
//! `MapController` callbacks.

use crate::{
    core::geo::{LatLng, Point},
    scene::update::SceneUpdate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque marker identifier handed out by the engine.
///
/// Only engine implementations create handles; the controller stores and
/// passes them back but never fabricates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerHandle(u32);

impl MarkerHandle {
    /// Wraps an engine-side marker id. Intended for `RenderEngine` implementations.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for MarkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "marker#{}", self.0)
    }
}

/// Easing curves understood by the engine's camera and marker animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EaseType {
    Linear,
    Cubic,
    Quint,
    Sine,
}

/// Kind of label returned by a label pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelKind {
    Icon,
    Text,
}

/// Result of a label pick that hit something
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPickResult {
    pub coordinates: LatLng,
    pub kind: LabelKind,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Result of a marker pick that hit something
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPickResult {
    pub marker: MarkerHandle,
    pub coordinates: LatLng,
}

/// Result of a feature pick that hit something
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeaturePickResult {
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Commands the controller issues to the rendering engine.
///
/// Boolean returns carry the engine's verdict; a `false` (or `None` from
/// [`RenderEngine::marker_add`]) means the command was rejected. The
/// controller logs rejections and never retries.
pub trait RenderEngine {
    /// Creates an empty marker
    fn marker_add(&mut self) -> Option<MarkerHandle>;

    fn marker_set_styling(&mut self, marker: MarkerHandle, styling: &str) -> bool;

    fn marker_set_point(&mut self, marker: MarkerHandle, point: LatLng) -> bool;

    fn marker_set_point_eased(
        &mut self,
        marker: MarkerHandle,
        point: LatLng,
        duration: Duration,
        ease: EaseType,
    ) -> bool;

    fn marker_set_polyline(
        &mut self,
        marker: MarkerHandle,
        polyline: &geo_types::LineString<f64>,
    ) -> bool;

    fn marker_set_polygon(&mut self, marker: MarkerHandle, polygon: &geo_types::Polygon<f64>)
        -> bool;

    fn marker_set_visible(&mut self, marker: MarkerHandle, visible: bool) -> bool;

    fn marker_set_image(&mut self, marker: MarkerHandle, image: &image::RgbaImage) -> bool;

    fn marker_remove(&mut self, marker: MarkerHandle) -> bool;

    /// Removes every marker the engine knows about, annotation or not
    fn marker_remove_all(&mut self);

    /// Loads a scene file synchronously with the given overrides applied in order
    fn load_scene(&mut self, file_name: &str, updates: &[SceneUpdate]);

    /// Starts an asynchronous scene load; completion is reported back by file name
    fn load_scene_async(&mut self, file_name: &str, updates: &[SceneUpdate]);

    /// Applies overrides on top of the current scene, later entries winning
    fn apply_scene_updates(&mut self, updates: &[SceneUpdate]);

    fn animate_to_position(&mut self, position: LatLng, duration: Duration, ease: Option<EaseType>);

    fn animate_to_zoom(&mut self, zoom: f32, duration: Duration, ease: Option<EaseType>);

    fn animate_to_rotation(&mut self, radians: f32, duration: Duration, ease: Option<EaseType>);

    fn animate_to_tilt(&mut self, radians: f32, duration: Duration, ease: Option<EaseType>);

    fn lng_lat_to_screen_position(&self, lng_lat: LatLng) -> Point;

    fn screen_position_to_lng_lat(&self, position: Point) -> LatLng;

    /// Requests a label pick; the answer arrives later through `did_select_label`
    fn pick_label_at(&mut self, position: Point);

    /// Requests a marker pick; the answer arrives later through `did_select_marker`
    fn pick_marker_at(&mut self, position: Point);

    /// Requests a feature pick; the answer arrives later through `did_select_feature`
    fn pick_feature_at(&mut self, position: Point);
}
