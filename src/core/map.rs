use crate::{
    core::{
        config::ControllerConfig,
        constants::ATTRIBUTION_URL,
        geo::{LatLng, Point},
    },
    engine::{
        EaseType, FeaturePickResult, LabelPickResult, MarkerHandle, MarkerPickResult, RenderEngine,
    },
    input::{
        delegates::{
            DelegateSlot, DoubleTapDelegate, FeatureSelectDelegate, LabelSelectDelegate,
            LongPressDelegate, MarkerSelectDelegate, PanDelegate, PinchDelegate, RotateDelegate,
            ShoveDelegate, SingleTapDelegate, TileLoadDelegate,
        },
        events::{ContinuousGesture, EventHandled, GestureChannel, TapGesture},
        gestures::GestureDispatcher,
    },
    layers::{annotation::Annotation, marker::MarkerRegistry},
    location::{FindMeButton, LocationService, LocationSync},
    prelude::HashMap,
    scene::{
        style::{OnStyleLoaded, PendingStyleLoad, StyleLoadNotifier, StyleSelection},
        update::{LoadMode, SceneUpdate, SceneUpdateQueue},
    },
    Result,
};
use std::{rc::Rc, time::Duration};

/// Host-side services that are neither the engine nor the location provider
pub trait HostApplication {
    /// Opens a URL outside the map, e.g. in a browser. Returns whether it was opened.
    fn open_url(&mut self, url: &str) -> bool;
}

/// Façade between the host application and the rendering engine.
///
/// Host calls are translated into engine commands through the marker
/// registry, the scene queue and location sync; engine callbacks
/// (`did_*`, `should_recognize_*`) are routed to the gesture dispatcher,
/// location sync and the registered delegates. All entry points are meant
/// to be called from a single thread.
pub struct MapController {
    engine: Box<dyn RenderEngine>,
    location_service: Box<dyn LocationService>,
    application: Box<dyn HostApplication>,
    config: ControllerConfig,
    markers: MarkerRegistry,
    scene: SceneUpdateQueue,
    pending_style: PendingStyleLoad,
    location: LocationSync,
    gestures: GestureDispatcher,
    tile_load: DelegateSlot<dyn TileLoadDelegate>,
}

impl MapController {
    pub fn new(
        engine: Box<dyn RenderEngine>,
        location_service: Box<dyn LocationService>,
        application: Box<dyn HostApplication>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            engine,
            location_service,
            application,
            markers: MarkerRegistry::new(),
            scene: SceneUpdateQueue::new(config.api_key.clone()),
            pending_style: PendingStyleLoad::new(),
            location: LocationSync::with_animations(
                config.find_me_animation,
                config.follow_animation,
            ),
            gestures: GestureDispatcher::new(),
            tile_load: DelegateSlot::new(),
            config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Replaces the API key used by subsequent style loads
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        self.config.api_key = Some(api_key.clone());
        self.scene.set_api_key(Some(api_key));
    }

    // Annotations

    /// Adds a marker for each annotation; see [`MarkerRegistry::add`]
    pub fn add_annotations(
        &mut self,
        annotations: &[Annotation],
    ) -> Result<HashMap<Annotation, MarkerHandle>> {
        self.markers.add(self.engine.as_mut(), annotations)
    }

    pub fn remove_annotation(&mut self, annotation: &Annotation) -> Result<()> {
        self.markers.remove(self.engine.as_mut(), annotation)
    }

    /// Removes every marker, annotation or not, then restores the current-location marker
    pub fn remove_annotations(&mut self) {
        self.markers.remove_all(self.engine.as_mut());
        self.location.on_markers_cleared(self.engine.as_mut());
    }

    pub fn annotation_marker(&self, annotation: &Annotation) -> Option<MarkerHandle> {
        self.markers.handle_for(annotation)
    }

    pub fn annotation_for_marker(&self, marker: MarkerHandle) -> Option<&Annotation> {
        self.markers.annotation_for(marker)
    }

    pub fn annotations(&self) -> &MarkerRegistry {
        &self.markers
    }

    // Scene and style

    pub fn queue_scene_update(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.scene.queue(path, value);
    }

    pub fn queue_scene_updates(&mut self, updates: Vec<SceneUpdate>) {
        self.scene.queue_all(updates);
    }

    pub fn pending_scene_updates(&self) -> &[SceneUpdate] {
        self.scene.pending()
    }

    pub fn apply_scene_updates(&mut self) {
        self.scene.apply(self.engine.as_mut());
    }

    pub fn load_style(&mut self, style: StyleSelection) -> Result<()> {
        self.load_style_with_updates(style, Vec::new())
    }

    pub fn load_style_with_updates(
        &mut self,
        style: StyleSelection,
        updates: Vec<SceneUpdate>,
    ) -> Result<()> {
        self.scene
            .load_style(self.engine.as_mut(), style, updates, LoadMode::Sync)?;
        Ok(())
    }

    pub fn load_style_async(
        &mut self,
        style: StyleSelection,
        on_style_loaded: Option<OnStyleLoaded>,
    ) -> Result<()> {
        self.load_style_async_with_updates(style, Vec::new(), on_style_loaded)
    }

    /// Starts an asynchronous load; `on_style_loaded` fires when the engine
    /// reports this style's scene file, unless a newer load replaced it first
    pub fn load_style_async_with_updates(
        &mut self,
        style: StyleSelection,
        updates: Vec<SceneUpdate>,
        on_style_loaded: Option<OnStyleLoaded>,
    ) -> Result<()> {
        self.scene
            .load_style(self.engine.as_mut(), style, updates, LoadMode::Async)?;
        self.pending_style.replace(style, on_style_loaded);
        Ok(())
    }

    /// Like [`MapController::load_style_async_with_updates`] with the completion delivered as a future
    pub fn load_style_async_notified(
        &mut self,
        style: StyleSelection,
        updates: Vec<SceneUpdate>,
    ) -> Result<StyleLoadNotifier> {
        let (callback, notifier) = StyleLoadNotifier::channel();
        self.load_style_async_with_updates(style, updates, Some(callback))?;
        Ok(notifier)
    }

    /// Loads the configured default style, if there is one. Returns whether a load happened.
    pub fn load_default_style(&mut self) -> Result<bool> {
        match self.config.default_style {
            Some(style) => self.load_style(style).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn pending_style_load(&self) -> Option<StyleSelection> {
        self.pending_style.pending_style()
    }

    /// Engine callback: an asynchronous scene load finished
    pub fn did_load_scene_async(&mut self, file_name: &str) {
        if !self.pending_style.complete(file_name) {
            log::warn!("ignoring completion of superseded scene {}", file_name);
        }
        if let Some(delegate) = self.tile_load.get() {
            delegate.did_load_scene_async(self, file_name);
        }
    }

    /// Engine callback: the visible tiles finished loading
    pub fn did_complete_loading(&self) {
        if let Some(delegate) = self.tile_load.get() {
            delegate.did_complete_loading(self);
        }
    }

    // Location

    pub fn enable_location_layer(&mut self, enabled: bool) {
        self.location.enable_location_layer(
            enabled,
            self.engine.as_mut(),
            self.location_service.as_mut(),
        );
    }

    pub fn show_current_location(&mut self, show: bool) -> bool {
        self.location.show_current_location(show, self.engine.as_mut())
    }

    /// Location service callback: a new fix arrived
    pub fn location_did_update(&mut self, point: LatLng) {
        self.location.location_did_update(point, self.engine.as_mut());
    }

    /// Host callback: the find-me button was pressed
    pub fn find_me_tapped(&mut self) -> bool {
        self.location.find_me_tapped(self.engine.as_mut())
    }

    pub fn show_find_me_button(&mut self, show: bool) {
        self.location.find_me_button_mut().show(show);
    }

    pub fn find_me_button(&self) -> &FindMeButton {
        self.location.find_me_button()
    }

    pub fn find_me_button_mut(&mut self) -> &mut FindMeButton {
        self.location.find_me_button_mut()
    }

    pub fn should_follow_current_location(&self) -> bool {
        self.location.should_follow_current_location()
    }

    pub fn set_should_follow_current_location(&mut self, follow: bool) {
        self.location.set_should_follow_current_location(follow);
    }

    pub fn should_show_current_location(&self) -> bool {
        self.location.should_show_current_location()
    }

    pub fn last_set_point(&self) -> Option<LatLng> {
        self.location.last_set_point()
    }

    pub fn current_location_marker(&self) -> Option<MarkerHandle> {
        self.location.current_location_marker()
    }

    // Gesture flags and delegates

    pub fn is_gesture_enabled(&self, gesture: ContinuousGesture) -> bool {
        self.gestures.is_enabled(gesture)
    }

    pub fn set_gesture_enabled(&mut self, gesture: ContinuousGesture, enabled: bool) {
        self.gestures.set_enabled(gesture, enabled);
    }

    pub fn channel_enabled(&self, channel: GestureChannel) -> Result<bool> {
        self.gestures.channel_enabled(channel)
    }

    pub fn set_channel_enabled(&mut self, channel: GestureChannel, enabled: bool) -> Result<()> {
        self.gestures.set_channel_enabled(channel, enabled)
    }

    pub fn pan_enabled(&self) -> bool {
        self.is_gesture_enabled(ContinuousGesture::Pan)
    }

    pub fn set_pan_enabled(&mut self, enabled: bool) {
        self.set_gesture_enabled(ContinuousGesture::Pan, enabled);
    }

    pub fn pinch_enabled(&self) -> bool {
        self.is_gesture_enabled(ContinuousGesture::Pinch)
    }

    pub fn set_pinch_enabled(&mut self, enabled: bool) {
        self.set_gesture_enabled(ContinuousGesture::Pinch, enabled);
    }

    pub fn rotate_enabled(&self) -> bool {
        self.is_gesture_enabled(ContinuousGesture::Rotate)
    }

    pub fn set_rotate_enabled(&mut self, enabled: bool) {
        self.set_gesture_enabled(ContinuousGesture::Rotate, enabled);
    }

    pub fn shove_enabled(&self) -> bool {
        self.is_gesture_enabled(ContinuousGesture::Shove)
    }

    pub fn set_shove_enabled(&mut self, enabled: bool) {
        self.set_gesture_enabled(ContinuousGesture::Shove, enabled);
    }

    pub fn set_pan_delegate<D: PanDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        self.gestures.set_pan_delegate(Rc::<D>::downgrade(delegate));
    }

    pub fn set_pinch_delegate<D: PinchDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        self.gestures.set_pinch_delegate(Rc::<D>::downgrade(delegate));
    }

    pub fn set_rotate_delegate<D: RotateDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        self.gestures.set_rotate_delegate(Rc::<D>::downgrade(delegate));
    }

    pub fn set_shove_delegate<D: ShoveDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        self.gestures.set_shove_delegate(Rc::<D>::downgrade(delegate));
    }

    pub fn set_single_tap_delegate<D: SingleTapDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        self.gestures.set_single_tap_delegate(Rc::<D>::downgrade(delegate));
    }

    pub fn set_double_tap_delegate<D: DoubleTapDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        self.gestures.set_double_tap_delegate(Rc::<D>::downgrade(delegate));
    }

    pub fn set_long_press_delegate<D: LongPressDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        self.gestures.set_long_press_delegate(Rc::<D>::downgrade(delegate));
    }

    pub fn set_label_select_delegate<D: LabelSelectDelegate + 'static>(
        &mut self,
        delegate: &Rc<D>,
    ) {
        self.gestures.set_label_select_delegate(Rc::<D>::downgrade(delegate));
    }

    pub fn set_marker_select_delegate<D: MarkerSelectDelegate + 'static>(
        &mut self,
        delegate: &Rc<D>,
    ) {
        self.gestures.set_marker_select_delegate(Rc::<D>::downgrade(delegate));
    }

    pub fn set_feature_select_delegate<D: FeatureSelectDelegate + 'static>(
        &mut self,
        delegate: &Rc<D>,
    ) {
        self.gestures.set_feature_select_delegate(Rc::<D>::downgrade(delegate));
    }

    pub fn set_tile_load_delegate<D: TileLoadDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        let delegate: std::rc::Weak<dyn TileLoadDelegate> = Rc::<D>::downgrade(delegate);
        self.tile_load.set(delegate);
    }

    pub fn clear_delegate(&mut self, channel: GestureChannel) {
        self.gestures.clear_delegate(channel);
    }

    pub fn clear_tile_load_delegate(&mut self) {
        self.tile_load.clear();
    }

    pub fn has_delegate(&self, channel: GestureChannel) -> bool {
        self.gestures.has_delegate(channel)
    }

    // Gesture callbacks from the engine

    /// Gate for a continuous gesture starting at `location`
    pub fn should_recognize_gesture(&mut self, gesture: ContinuousGesture, location: Point) -> bool {
        log::trace!("gate {:?} at ({}, {})", gesture, location.x, location.y);
        self.gestures.should_recognize(gesture, &mut self.location)
    }

    /// One delivered frame of a continuous gesture
    pub fn did_recognize_gesture(
        &mut self,
        gesture: ContinuousGesture,
        displacement: Point,
    ) -> EventHandled {
        self.gestures.recognized(gesture, &mut self.location);
        self.gestures.notify(self, gesture, displacement)
    }

    /// Gate for a tap; taps the delegate does not claim are turned into picks
    pub fn should_recognize_tap(&mut self, tap: TapGesture, location: Point) -> bool {
        let decision = self.gestures.tap_decision(self, tap, location);
        if decision.picks() {
            self.engine.pick_label_at(location);
            self.engine.pick_marker_at(location);
            self.engine.pick_feature_at(location);
        }
        decision.recognizes()
    }

    pub fn did_recognize_tap(&self, tap: TapGesture, location: Point) -> EventHandled {
        self.gestures.notify_tap(self, tap, location)
    }

    /// Engine callback: a label pick came back, hit or miss
    pub fn did_select_label(&self, label: Option<&LabelPickResult>, position: Point) -> EventHandled {
        self.gestures.select_label(self, label, position)
    }

    /// Engine callback: a marker pick came back, hit or miss
    pub fn did_select_marker(
        &self,
        marker: Option<&MarkerPickResult>,
        position: Point,
    ) -> EventHandled {
        self.gestures.select_marker(self, marker, position)
    }

    /// Engine callback: a feature pick came back, hit or miss
    pub fn did_select_feature(
        &self,
        feature: Option<&FeaturePickResult>,
        position: Point,
    ) -> EventHandled {
        self.gestures.select_feature(self, feature, position)
    }

    // Camera

    pub fn animate_to_position(
        &mut self,
        position: LatLng,
        duration: Duration,
        ease: Option<EaseType>,
    ) {
        self.engine.animate_to_position(position, duration, ease);
    }

    pub fn animate_to_zoom(&mut self, zoom: f32, duration: Duration, ease: Option<EaseType>) {
        self.engine.animate_to_zoom(zoom, duration, ease);
    }

    pub fn animate_to_rotation(&mut self, radians: f32, duration: Duration, ease: Option<EaseType>) {
        self.engine.animate_to_rotation(radians, duration, ease);
    }

    pub fn animate_to_tilt(&mut self, radians: f32, duration: Duration, ease: Option<EaseType>) {
        self.engine.animate_to_tilt(radians, duration, ease);
    }

    pub fn lng_lat_to_screen_position(&self, lng_lat: LatLng) -> Point {
        self.engine.lng_lat_to_screen_position(lng_lat)
    }

    pub fn screen_position_to_lng_lat(&self, position: Point) -> LatLng {
        self.engine.screen_position_to_lng_lat(position)
    }

    // Raw markers

    /// Creates a marker that no annotation owns
    pub fn marker_add(&mut self) -> Option<MarkerHandle> {
        self.engine.marker_add()
    }

    pub fn marker_set_styling(&mut self, marker: MarkerHandle, styling: &str) -> bool {
        self.engine.marker_set_styling(marker, styling)
    }

    pub fn marker_set_point(&mut self, marker: MarkerHandle, point: LatLng) -> bool {
        self.engine.marker_set_point(marker, point)
    }

    pub fn marker_set_point_eased(
        &mut self,
        marker: MarkerHandle,
        point: LatLng,
        duration: Duration,
        ease: EaseType,
    ) -> bool {
        self.engine
            .marker_set_point_eased(marker, point, duration, ease)
    }

    pub fn marker_set_polyline(
        &mut self,
        marker: MarkerHandle,
        polyline: &geo_types::LineString<f64>,
    ) -> bool {
        self.engine.marker_set_polyline(marker, polyline)
    }

    pub fn marker_set_polygon(
        &mut self,
        marker: MarkerHandle,
        polygon: &geo_types::Polygon<f64>,
    ) -> bool {
        self.engine.marker_set_polygon(marker, polygon)
    }

    pub fn marker_set_visible(&mut self, marker: MarkerHandle, visible: bool) -> bool {
        self.engine.marker_set_visible(marker, visible)
    }

    pub fn marker_set_image(&mut self, marker: MarkerHandle, image: &image::RgbaImage) -> bool {
        self.engine.marker_set_image(marker, image)
    }

    /// Removes a marker; an annotation or current-location marker is forgotten as well
    pub fn marker_remove(&mut self, marker: MarkerHandle) -> bool {
        if let Some(annotation) = self.markers.forget_handle(marker) {
            log::debug!("raw removal of {} dropped {}", marker, annotation.id());
        }
        self.location.forget_marker(marker);
        self.engine.marker_remove(marker)
    }

    pub fn marker_remove_all(&mut self) {
        self.remove_annotations();
    }

    // Attribution

    /// Opens the data attribution page through the host application
    pub fn open_attribution(&mut self) -> bool {
        self.application.open_url(ATTRIBUTION_URL)
    }
}

impl std::fmt::Debug for MapController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapController")
            .field("config", &self.config)
            .field("markers", &self.markers)
            .field("scene", &self.scene)
            .field("pending_style", &self.pending_style)
            .field("location", &self.location)
            .field("gestures", &self.gestures)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        EngineCommand, RecordingApplication, RecordingEngine, RecordingLocationService,
    };

    fn controller() -> (MapController, RecordingEngine) {
        let engine = RecordingEngine::new();
        let controller = MapController::new(
            Box::new(engine.clone()),
            Box::new(RecordingLocationService::new()),
            Box::new(RecordingApplication::new()),
            ControllerConfig::default().with_api_key("testKey"),
        );
        (controller, engine)
    }

    #[test]
    fn test_initial_state() {
        let (controller, _) = controller();
        assert!(!controller.should_follow_current_location());
        assert!(controller.pan_enabled());
        assert!(controller.pinch_enabled());
        assert!(controller.rotate_enabled());
        assert!(controller.shove_enabled());
        assert!(controller.annotations().is_empty());
        assert!(controller.pending_style_load().is_none());
    }

    #[test]
    fn test_set_api_key_after_missing_key() {
        let engine = RecordingEngine::new();
        let mut controller = MapController::new(
            Box::new(engine.clone()),
            Box::new(RecordingLocationService::new()),
            Box::new(RecordingApplication::new()),
            ControllerConfig::default(),
        );
        assert!(controller.load_style(StyleSelection::Zinc).is_err());

        controller.set_api_key("lateKey");

        assert!(controller.load_style(StyleSelection::Zinc).is_ok());
        assert_eq!(controller.config().api_key.as_deref(), Some("lateKey"));
    }

    #[test]
    fn test_load_default_style() {
        let (mut controller, engine) = controller();
        assert!(!controller.load_default_style().unwrap());

        controller.config.default_style = Some(StyleSelection::Refill);
        assert!(controller.load_default_style().unwrap());
        assert_eq!(engine.log().scene_path(), Some("refill-style-more-labels.yaml"));
    }

    #[test]
    fn test_raw_marker_remove_keeps_registry_consistent() {
        let (mut controller, engine) = controller();
        let annotation = Annotation::new(LatLng::new(0.0, 0.0));
        let handle = controller.add_annotations(&[annotation.clone()]).unwrap()[&annotation];

        assert!(controller.marker_remove(handle));

        assert!(controller.annotation_marker(&annotation).is_none());
        assert_eq!(engine.log().last(), Some(&EngineCommand::MarkerRemove(handle)));
        // the annotation can be registered again
        assert!(controller.add_annotations(&[annotation]).is_ok());
    }

    struct CountingDelegate {
        loads: std::cell::Cell<u32>,
    }

    impl PanDelegate for CountingDelegate {
        fn did_pan_map(&self, _: &MapController, _: Point) {
            self.loads.set(self.loads.get() + 1);
        }
    }

    impl TileLoadDelegate for CountingDelegate {
        fn did_complete_loading(&self, _: &MapController) {
            self.loads.set(self.loads.get() + 1);
        }
    }

    #[test]
    fn test_concrete_delegate_registers_on_several_channels() {
        let (mut controller, _) = controller();
        let delegate = Rc::new(CountingDelegate {
            loads: std::cell::Cell::new(0),
        });

        controller.set_pan_delegate(&delegate);
        controller.set_tile_load_delegate(&delegate);

        assert!(controller.has_delegate(GestureChannel::Pan));
        assert!(!controller.has_delegate(GestureChannel::Pinch));
        controller.did_recognize_gesture(ContinuousGesture::Pan, Point::new(1.0, 0.0));
        controller.did_complete_loading();
        assert_eq!(delegate.loads.get(), 2);
        assert_eq!(Rc::strong_count(&delegate), 1);
    }

    #[test]
    fn test_hiding_location_without_marker_reports_false() {
        let (mut controller, _) = controller();
        assert!(!controller.show_current_location(false));
    }

    #[test]
    fn test_raw_remove_all_rebuilds_current_location_marker() {
        let (mut controller, engine) = controller();
        controller.show_current_location(true);
        controller
            .add_annotations(&[Annotation::new(LatLng::new(1.0, 1.0))])
            .unwrap();

        controller.marker_remove_all();

        assert!(controller.annotations().is_empty());
        assert!(controller.current_location_marker().is_some());
        assert_eq!(engine.log().count(|c| *c == EngineCommand::MarkerRemoveAll), 1);
    }
}
