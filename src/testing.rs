//! Recording doubles for the controller's collaborators.
//!
//! Each double is a cheap handle over shared state, so a test can box one
//! clone into the controller and keep another to inspect what happened.

use crate::{
    core::{
        geo::{LatLng, Point},
        map::HostApplication,
    },
    engine::{EaseType, MarkerHandle, RenderEngine},
    location::LocationService,
    prelude::HashSet,
    scene::update::SceneUpdate,
};
use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
    time::Duration,
};

/// One call received by [`RecordingEngine`]
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    MarkerAdd(MarkerHandle),
    MarkerSetStyling(MarkerHandle, String),
    MarkerSetPoint(MarkerHandle, LatLng),
    MarkerSetPointEased {
        marker: MarkerHandle,
        point: LatLng,
        duration: Duration,
        ease: EaseType,
    },
    MarkerSetPolyline(MarkerHandle, geo_types::LineString<f64>),
    MarkerSetPolygon(MarkerHandle, geo_types::Polygon<f64>),
    MarkerSetVisible(MarkerHandle, bool),
    /// Image dimensions only
    MarkerSetImage(MarkerHandle, (u32, u32)),
    MarkerRemove(MarkerHandle),
    MarkerRemoveAll,
    LoadScene {
        file_name: String,
        updates: Vec<SceneUpdate>,
    },
    LoadSceneAsync {
        file_name: String,
        updates: Vec<SceneUpdate>,
    },
    ApplySceneUpdates(Vec<SceneUpdate>),
    AnimateToPosition {
        position: LatLng,
        duration: Duration,
        ease: Option<EaseType>,
    },
    AnimateToZoom {
        zoom: f32,
        duration: Duration,
        ease: Option<EaseType>,
    },
    AnimateToRotation {
        radians: f32,
        duration: Duration,
        ease: Option<EaseType>,
    },
    AnimateToTilt {
        radians: f32,
        duration: Duration,
        ease: Option<EaseType>,
    },
    LngLatToScreen(LatLng),
    ScreenToLngLat(Point),
    PickLabel(Point),
    PickMarker(Point),
    PickFeature(Point),
}

#[derive(Debug, Default)]
pub struct EngineLog {
    pub commands: Vec<EngineCommand>,
    /// Markers handed out over the engine's lifetime
    pub markers_created: u32,
    /// `marker_add` returns `None` while set
    pub refuse_marker_creation: bool,
    /// Marker mutations return false while set
    pub reject_marker_commands: bool,
    live_markers: HashSet<MarkerHandle>,
    next_marker: u32,
}

impl EngineLog {
    pub fn last(&self) -> Option<&EngineCommand> {
        self.commands.last()
    }

    pub fn count(&self, predicate: impl Fn(&EngineCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    /// Scene file of the most recent sync or async load
    pub fn scene_path(&self) -> Option<&str> {
        self.commands.iter().rev().find_map(|c| match c {
            EngineCommand::LoadScene { file_name, .. }
            | EngineCommand::LoadSceneAsync { file_name, .. } => Some(file_name.as_str()),
            _ => None,
        })
    }

    /// Updates sent with the most recent sync or async load
    pub fn scene_updates(&self) -> Vec<SceneUpdate> {
        self.commands
            .iter()
            .rev()
            .find_map(|c| match c {
                EngineCommand::LoadScene { updates, .. }
                | EngineCommand::LoadSceneAsync { updates, .. } => Some(updates.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Every update applied on top of a scene, across all flushes
    pub fn applied_updates(&self) -> Vec<SceneUpdate> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                EngineCommand::ApplySceneUpdates(updates) => Some(updates.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn is_live(&self, marker: MarkerHandle) -> bool {
        self.live_markers.contains(&marker)
    }

    fn marker_command(&mut self, marker: MarkerHandle, command: EngineCommand) -> bool {
        self.commands.push(command);
        !self.reject_marker_commands && self.live_markers.contains(&marker)
    }
}

/// Engine double that records every call and projects coordinates 1:1
/// (`x = lng`, `y = lat`)
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    log: Rc<RefCell<EngineLog>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Ref<'_, EngineLog> {
        self.log.borrow()
    }

    pub fn log_mut(&self) -> RefMut<'_, EngineLog> {
        self.log.borrow_mut()
    }
}

impl RenderEngine for RecordingEngine {
    fn marker_add(&mut self) -> Option<MarkerHandle> {
        let mut log = self.log.borrow_mut();
        if log.refuse_marker_creation {
            return None;
        }
        log.next_marker += 1;
        let marker = MarkerHandle::from_raw(log.next_marker);
        log.markers_created += 1;
        log.live_markers.insert(marker);
        log.commands.push(EngineCommand::MarkerAdd(marker));
        Some(marker)
    }

    fn marker_set_styling(&mut self, marker: MarkerHandle, styling: &str) -> bool {
        self.log
            .borrow_mut()
            .marker_command(marker, EngineCommand::MarkerSetStyling(marker, styling.to_string()))
    }

    fn marker_set_point(&mut self, marker: MarkerHandle, point: LatLng) -> bool {
        self.log
            .borrow_mut()
            .marker_command(marker, EngineCommand::MarkerSetPoint(marker, point))
    }

    fn marker_set_point_eased(
        &mut self,
        marker: MarkerHandle,
        point: LatLng,
        duration: Duration,
        ease: EaseType,
    ) -> bool {
        self.log.borrow_mut().marker_command(
            marker,
            EngineCommand::MarkerSetPointEased {
                marker,
                point,
                duration,
                ease,
            },
        )
    }

    fn marker_set_polyline(
        &mut self,
        marker: MarkerHandle,
        polyline: &geo_types::LineString<f64>,
    ) -> bool {
        self.log
            .borrow_mut()
            .marker_command(marker, EngineCommand::MarkerSetPolyline(marker, polyline.clone()))
    }

    fn marker_set_polygon(
        &mut self,
        marker: MarkerHandle,
        polygon: &geo_types::Polygon<f64>,
    ) -> bool {
        self.log
            .borrow_mut()
            .marker_command(marker, EngineCommand::MarkerSetPolygon(marker, polygon.clone()))
    }

    fn marker_set_visible(&mut self, marker: MarkerHandle, visible: bool) -> bool {
        self.log
            .borrow_mut()
            .marker_command(marker, EngineCommand::MarkerSetVisible(marker, visible))
    }

    fn marker_set_image(&mut self, marker: MarkerHandle, image: &image::RgbaImage) -> bool {
        self.log
            .borrow_mut()
            .marker_command(marker, EngineCommand::MarkerSetImage(marker, image.dimensions()))
    }

    fn marker_remove(&mut self, marker: MarkerHandle) -> bool {
        let mut log = self.log.borrow_mut();
        log.commands.push(EngineCommand::MarkerRemove(marker));
        log.live_markers.remove(&marker)
    }

    fn marker_remove_all(&mut self) {
        let mut log = self.log.borrow_mut();
        log.commands.push(EngineCommand::MarkerRemoveAll);
        log.live_markers.clear();
    }

    fn load_scene(&mut self, file_name: &str, updates: &[SceneUpdate]) {
        self.log.borrow_mut().commands.push(EngineCommand::LoadScene {
            file_name: file_name.to_string(),
            updates: updates.to_vec(),
        });
    }

    fn load_scene_async(&mut self, file_name: &str, updates: &[SceneUpdate]) {
        self.log
            .borrow_mut()
            .commands
            .push(EngineCommand::LoadSceneAsync {
                file_name: file_name.to_string(),
                updates: updates.to_vec(),
            });
    }

    fn apply_scene_updates(&mut self, updates: &[SceneUpdate]) {
        self.log
            .borrow_mut()
            .commands
            .push(EngineCommand::ApplySceneUpdates(updates.to_vec()));
    }

    fn animate_to_position(&mut self, position: LatLng, duration: Duration, ease: Option<EaseType>) {
        self.log
            .borrow_mut()
            .commands
            .push(EngineCommand::AnimateToPosition {
                position,
                duration,
                ease,
            });
    }

    fn animate_to_zoom(&mut self, zoom: f32, duration: Duration, ease: Option<EaseType>) {
        self.log
            .borrow_mut()
            .commands
            .push(EngineCommand::AnimateToZoom {
                zoom,
                duration,
                ease,
            });
    }

    fn animate_to_rotation(&mut self, radians: f32, duration: Duration, ease: Option<EaseType>) {
        self.log
            .borrow_mut()
            .commands
            .push(EngineCommand::AnimateToRotation {
                radians,
                duration,
                ease,
            });
    }

    fn animate_to_tilt(&mut self, radians: f32, duration: Duration, ease: Option<EaseType>) {
        self.log
            .borrow_mut()
            .commands
            .push(EngineCommand::AnimateToTilt {
                radians,
                duration,
                ease,
            });
    }

    fn lng_lat_to_screen_position(&self, lng_lat: LatLng) -> Point {
        self.log
            .borrow_mut()
            .commands
            .push(EngineCommand::LngLatToScreen(lng_lat));
        Point::new(lng_lat.lng, lng_lat.lat)
    }

    fn screen_position_to_lng_lat(&self, position: Point) -> LatLng {
        self.log
            .borrow_mut()
            .commands
            .push(EngineCommand::ScreenToLngLat(position));
        LatLng::new(position.y, position.x)
    }

    fn pick_label_at(&mut self, position: Point) {
        self.log
            .borrow_mut()
            .commands
            .push(EngineCommand::PickLabel(position));
    }

    fn pick_marker_at(&mut self, position: Point) {
        self.log
            .borrow_mut()
            .commands
            .push(EngineCommand::PickMarker(position));
    }

    fn pick_feature_at(&mut self, position: Point) {
        self.log
            .borrow_mut()
            .commands
            .push(EngineCommand::PickFeature(position));
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocationServiceState {
    pub requested_in_use: bool,
    pub updating: bool,
    pub authorization_requests: u32,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingLocationService {
    state: Rc<RefCell<LocationServiceState>>,
}

impl RecordingLocationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, LocationServiceState> {
        self.state.borrow()
    }
}

impl LocationService for RecordingLocationService {
    fn request_in_use_authorization(&mut self) {
        let mut state = self.state.borrow_mut();
        state.requested_in_use = true;
        state.authorization_requests += 1;
    }

    fn start_updating(&mut self) {
        self.state.borrow_mut().updating = true;
    }

    fn stop_updating(&mut self) {
        self.state.borrow_mut().updating = false;
    }
}

/// Host double that remembers every URL it was asked to open
#[derive(Debug, Clone, Default)]
pub struct RecordingApplication {
    opened: Rc<RefCell<Vec<String>>>,
}

impl RecordingApplication {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl HostApplication for RecordingApplication {
    fn open_url(&mut self, url: &str) -> bool {
        self.opened.borrow_mut().push(url.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_log() {
        let engine = RecordingEngine::new();
        let mut boxed: Box<dyn RenderEngine> = Box::new(engine.clone());

        let marker = boxed.marker_add().unwrap();
        assert!(boxed.marker_set_visible(marker, false));

        assert_eq!(engine.log().markers_created, 1);
        assert_eq!(
            engine.log().last(),
            Some(&EngineCommand::MarkerSetVisible(marker, false))
        );
    }

    #[test]
    fn test_removed_markers_reject_commands() {
        let mut engine = RecordingEngine::new();
        let marker = engine.marker_add().unwrap();

        assert!(engine.marker_remove(marker));
        assert!(!engine.marker_remove(marker));
        assert!(!engine.marker_set_point(marker, LatLng::new(0.0, 0.0)));
    }

    #[test]
    fn test_projection_round_trips() {
        let engine = RecordingEngine::new();
        let point = LatLng::new(40.7, -74.0);

        let screen = engine.lng_lat_to_screen_position(point);

        assert_eq!(engine.screen_position_to_lng_lat(screen), point);
    }
}
