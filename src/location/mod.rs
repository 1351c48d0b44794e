//! Device location tracking and the current-location marker.
//!
//! [`LocationSync`] owns the follow/show flags, the last applied fix and the
//! marker drawn at it. The find-me button state lives here too since panning
//! and the location layer both toggle it.

use crate::{
    core::{
        constants::{CURRENT_LOCATION_MARKER_STYLING, DEFAULT_FIND_ME_ANIMATION, DEFAULT_FOLLOW_ANIMATION},
        geo::LatLng,
    },
    engine::{MarkerHandle, RenderEngine},
};
use std::time::Duration;

/// Device location provider.
///
/// Authorization prompts and update delivery belong to the host platform;
/// fixes come back through `MapController::location_did_update`. A denied
/// permission simply means no fixes arrive.
pub trait LocationService {
    fn request_in_use_authorization(&mut self);

    fn start_updating(&mut self);

    fn stop_updating(&mut self);
}

/// State of the "find me" affordance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindMeButton {
    hidden: bool,
    enabled: bool,
    selected: bool,
}

impl FindMeButton {
    pub fn new() -> Self {
        Self {
            hidden: true,
            enabled: false,
            selected: false,
        }
    }

    /// Reveals or hides the button; a hidden button is also disabled and deselected
    pub fn show(&mut self, show: bool) {
        self.hidden = !show;
        self.enabled = show;
        if !show {
            self.selected = false;
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

impl Default for FindMeButton {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the current-location marker in step with location fixes
#[derive(Debug)]
pub struct LocationSync {
    should_follow_current_location: bool,
    should_show_current_location: bool,
    last_set_point: Option<LatLng>,
    current_location_marker: Option<MarkerHandle>,
    layer_enabled: bool,
    find_me: FindMeButton,
    find_me_animation: Duration,
    follow_animation: Duration,
}

impl LocationSync {
    pub fn new() -> Self {
        Self::with_animations(DEFAULT_FIND_ME_ANIMATION, DEFAULT_FOLLOW_ANIMATION)
    }

    pub fn with_animations(find_me_animation: Duration, follow_animation: Duration) -> Self {
        Self {
            should_follow_current_location: false,
            should_show_current_location: false,
            last_set_point: None,
            current_location_marker: None,
            layer_enabled: false,
            find_me: FindMeButton::new(),
            find_me_animation,
            follow_animation,
        }
    }

    /// Turns the whole location layer on or off.
    ///
    /// Enabling asks for permission, starts updates, reveals the find-me
    /// button, shows the current location and enters follow mode. Disabling
    /// undoes all of that and removes the current-location marker.
    pub fn enable_location_layer(
        &mut self,
        enabled: bool,
        engine: &mut dyn RenderEngine,
        service: &mut dyn LocationService,
    ) {
        if enabled {
            if !self.layer_enabled {
                log::info!("enabling location layer");
                service.request_in_use_authorization();
                service.start_updating();
                self.layer_enabled = true;
            }
            self.find_me.show(true);
            self.show_current_location(true, engine);
            self.should_follow_current_location = true;
        } else {
            if self.layer_enabled {
                log::info!("disabling location layer");
                service.stop_updating();
                self.layer_enabled = false;
            }
            self.find_me.show(false);
            self.should_show_current_location = false;
            self.should_follow_current_location = false;
            if let Some(marker) = self.current_location_marker.take() {
                if !engine.marker_remove(marker) {
                    log::warn!("engine rejected removal of current location {}", marker);
                }
            }
        }
    }

    /// Shows or hides the current-location marker.
    ///
    /// Showing creates the marker on first use. Hiding keeps the marker but
    /// stops moving it. Returns whether a current-location marker exists.
    pub fn show_current_location(&mut self, show: bool, engine: &mut dyn RenderEngine) -> bool {
        if !show {
            self.should_show_current_location = false;
            return self.current_location_marker.is_some();
        }

        if self.current_location_marker.is_none() {
            self.current_location_marker = self.create_marker(engine);
        }
        self.should_show_current_location = self.current_location_marker.is_some();
        self.should_show_current_location
    }

    /// Applies a location fix. Ignored unless the current location is shown.
    pub fn location_did_update(&mut self, point: LatLng, engine: &mut dyn RenderEngine) {
        if !self.should_show_current_location {
            return;
        }
        if !point.is_valid() {
            log::warn!("ignoring invalid location fix {:?}", point);
            return;
        }
        let Some(marker) = self.current_location_marker else {
            return;
        };

        if !engine.marker_set_point(marker, point) {
            log::warn!("engine rejected current location point for {}", marker);
        }
        self.last_set_point = Some(point);

        if self.should_follow_current_location {
            engine.animate_to_position(point, self.follow_animation, None);
        }
    }

    /// The user moved the map by hand: stop following
    pub fn on_user_pan(&mut self) {
        self.should_follow_current_location = false;
        self.find_me.set_selected(false);
    }

    /// Re-centres on the last fix and resumes follow mode.
    ///
    /// Returns false (and changes nothing) until a fix has been drawn.
    pub fn find_me_tapped(&mut self, engine: &mut dyn RenderEngine) -> bool {
        let (Some(_), Some(point)) = (self.current_location_marker, self.last_set_point) else {
            return false;
        };
        engine.animate_to_position(point, self.find_me_animation, None);
        self.should_follow_current_location = true;
        self.find_me.set_selected(true);
        true
    }

    /// The engine dropped every marker; rebuild ours if it is still wanted
    pub fn on_markers_cleared(&mut self, engine: &mut dyn RenderEngine) {
        self.current_location_marker = None;
        if !self.should_show_current_location {
            return;
        }

        self.current_location_marker = self.create_marker(engine);
        match (self.current_location_marker, self.last_set_point) {
            (Some(marker), Some(point)) => {
                engine.marker_set_point(marker, point);
            }
            (None, _) => self.should_show_current_location = false,
            _ => {}
        }
    }

    /// Forgets the marker if `handle` is it. Returns whether it was.
    pub fn forget_marker(&mut self, handle: MarkerHandle) -> bool {
        if self.current_location_marker == Some(handle) {
            self.current_location_marker = None;
            self.should_show_current_location = false;
            true
        } else {
            false
        }
    }

    fn create_marker(&self, engine: &mut dyn RenderEngine) -> Option<MarkerHandle> {
        let Some(marker) = engine.marker_add() else {
            log::warn!("engine refused to create the current location marker");
            return None;
        };
        if !engine.marker_set_styling(marker, CURRENT_LOCATION_MARKER_STYLING) {
            log::warn!("engine rejected current location styling for {}", marker);
        }
        Some(marker)
    }

    pub fn should_follow_current_location(&self) -> bool {
        self.should_follow_current_location
    }

    pub fn set_should_follow_current_location(&mut self, follow: bool) {
        self.should_follow_current_location = follow;
    }

    pub fn should_show_current_location(&self) -> bool {
        self.should_show_current_location
    }

    pub fn last_set_point(&self) -> Option<LatLng> {
        self.last_set_point
    }

    pub fn current_location_marker(&self) -> Option<MarkerHandle> {
        self.current_location_marker
    }

    pub fn is_layer_enabled(&self) -> bool {
        self.layer_enabled
    }

    pub fn find_me_button(&self) -> &FindMeButton {
        &self.find_me
    }

    pub fn find_me_button_mut(&mut self) -> &mut FindMeButton {
        &mut self.find_me
    }
}

impl Default for LocationSync {
    fn default() -> Self {
        Self::new()
    }
}
