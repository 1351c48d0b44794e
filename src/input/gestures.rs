use crate::{
    core::{geo::Point, map::MapController},
    engine::{FeaturePickResult, LabelPickResult, MarkerPickResult},
    input::{
        delegates::{
            DelegateSlot, DoubleTapDelegate, FeatureSelectDelegate, LabelSelectDelegate,
            LongPressDelegate, MarkerSelectDelegate, PanDelegate, PinchDelegate, RotateDelegate,
            ShoveDelegate, SingleTapDelegate,
        },
        events::{ContinuousGesture, EventHandled, GestureChannel, TapGesture},
    },
    location::LocationSync,
    MapError, Result,
};
use std::rc::Weak;

/// Outcome of the should-recognize gate of a tap channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapDecision {
    /// The delegate claimed the tap; nothing is picked
    Recognize,
    /// No delegate: pick at the point and let the engine carry on
    PickAndRecognize,
    /// The delegate declined: pick at the point instead of recognizing
    PickAndDecline,
}

impl TapDecision {
    pub fn recognizes(self) -> bool {
        matches!(self, Self::Recognize | Self::PickAndRecognize)
    }

    pub fn picks(self) -> bool {
        matches!(self, Self::PickAndRecognize | Self::PickAndDecline)
    }
}

/// Per-channel enable flags and delegates.
///
/// Gating and fan-out are split: [`GestureDispatcher::should_recognize`] and
/// [`GestureDispatcher::recognized`] apply the side effects on location
/// state, then the `notify_*`/`select_*` calls hand the event to whichever
/// delegate is registered. A missing delegate just drops the event.
#[derive(Debug)]
pub struct GestureDispatcher {
    pan_enabled: bool,
    pinch_enabled: bool,
    rotate_enabled: bool,
    shove_enabled: bool,
    pan: DelegateSlot<dyn PanDelegate>,
    pinch: DelegateSlot<dyn PinchDelegate>,
    rotate: DelegateSlot<dyn RotateDelegate>,
    shove: DelegateSlot<dyn ShoveDelegate>,
    single_tap: DelegateSlot<dyn SingleTapDelegate>,
    double_tap: DelegateSlot<dyn DoubleTapDelegate>,
    long_press: DelegateSlot<dyn LongPressDelegate>,
    label_select: DelegateSlot<dyn LabelSelectDelegate>,
    marker_select: DelegateSlot<dyn MarkerSelectDelegate>,
    feature_select: DelegateSlot<dyn FeatureSelectDelegate>,
}

impl GestureDispatcher {
    pub fn new() -> Self {
        Self {
            pan_enabled: true,
            pinch_enabled: true,
            rotate_enabled: true,
            shove_enabled: true,
            pan: DelegateSlot::new(),
            pinch: DelegateSlot::new(),
            rotate: DelegateSlot::new(),
            shove: DelegateSlot::new(),
            single_tap: DelegateSlot::new(),
            double_tap: DelegateSlot::new(),
            long_press: DelegateSlot::new(),
            label_select: DelegateSlot::new(),
            marker_select: DelegateSlot::new(),
            feature_select: DelegateSlot::new(),
        }
    }

    pub fn is_enabled(&self, gesture: ContinuousGesture) -> bool {
        match gesture {
            ContinuousGesture::Pan => self.pan_enabled,
            ContinuousGesture::Pinch => self.pinch_enabled,
            ContinuousGesture::Rotate => self.rotate_enabled,
            ContinuousGesture::Shove => self.shove_enabled,
        }
    }

    pub fn set_enabled(&mut self, gesture: ContinuousGesture, enabled: bool) {
        let flag = match gesture {
            ContinuousGesture::Pan => &mut self.pan_enabled,
            ContinuousGesture::Pinch => &mut self.pinch_enabled,
            ContinuousGesture::Rotate => &mut self.rotate_enabled,
            ContinuousGesture::Shove => &mut self.shove_enabled,
        };
        *flag = enabled;
    }

    /// Channel-keyed flag lookup; only continuous channels carry a flag
    pub fn channel_enabled(&self, channel: GestureChannel) -> Result<bool> {
        channel
            .continuous()
            .map(|gesture| self.is_enabled(gesture))
            .ok_or(MapError::UnsupportedChannel(channel))
    }

    pub fn set_channel_enabled(&mut self, channel: GestureChannel, enabled: bool) -> Result<()> {
        let gesture = channel
            .continuous()
            .ok_or(MapError::UnsupportedChannel(channel))?;
        self.set_enabled(gesture, enabled);
        Ok(())
    }

    /// Gate evaluated before a continuous gesture starts.
    ///
    /// A pan attempted while panning is disabled still counts as the user
    /// taking over the map, so follow mode is cancelled here as well.
    pub fn should_recognize(
        &self,
        gesture: ContinuousGesture,
        location: &mut LocationSync,
    ) -> bool {
        let enabled = self.is_enabled(gesture);
        if gesture == ContinuousGesture::Pan && !enabled {
            location.on_user_pan();
        }
        log::debug!("should recognize {:?}: {}", gesture, enabled);
        enabled
    }

    /// Side effects of a delivered continuous gesture frame
    pub fn recognized(&self, gesture: ContinuousGesture, location: &mut LocationSync) {
        if gesture == ContinuousGesture::Pan {
            location.on_user_pan();
        }
    }

    /// Hands a delivered continuous gesture frame to its delegate
    pub fn notify(
        &self,
        controller: &MapController,
        gesture: ContinuousGesture,
        point: Point,
    ) -> EventHandled {
        let handled = match gesture {
            ContinuousGesture::Pan => self.pan.get().map(|d| d.did_pan_map(controller, point)),
            ContinuousGesture::Pinch => {
                self.pinch.get().map(|d| d.did_pinch_map(controller, point))
            }
            ContinuousGesture::Rotate => {
                self.rotate.get().map(|d| d.did_rotate_map(controller, point))
            }
            ContinuousGesture::Shove => {
                self.shove.get().map(|d| d.did_shove_map(controller, point))
            }
        };
        Self::handled(handled.is_some())
    }

    /// Gate evaluated before a tap is recognized
    pub fn tap_decision(
        &self,
        controller: &MapController,
        tap: TapGesture,
        location: Point,
    ) -> TapDecision {
        let answer = match tap {
            TapGesture::SingleTap => self
                .single_tap
                .get()
                .map(|d| d.should_recognize_single_tap(controller, location)),
            TapGesture::DoubleTap => self
                .double_tap
                .get()
                .map(|d| d.should_recognize_double_tap(controller, location)),
            TapGesture::LongPress => self
                .long_press
                .get()
                .map(|d| d.should_recognize_long_press(controller, location)),
        };
        let decision = match answer {
            Some(true) => TapDecision::Recognize,
            Some(false) => TapDecision::PickAndDecline,
            None => TapDecision::PickAndRecognize,
        };
        log::debug!("{:?} at ({}, {}): {:?}", tap, location.x, location.y, decision);
        decision
    }

    /// Hands a recognized tap to its delegate
    pub fn notify_tap(
        &self,
        controller: &MapController,
        tap: TapGesture,
        location: Point,
    ) -> EventHandled {
        let handled = match tap {
            TapGesture::SingleTap => self
                .single_tap
                .get()
                .map(|d| d.did_recognize_single_tap(controller, location)),
            TapGesture::DoubleTap => self
                .double_tap
                .get()
                .map(|d| d.did_recognize_double_tap(controller, location)),
            TapGesture::LongPress => self
                .long_press
                .get()
                .map(|d| d.did_recognize_long_press(controller, location)),
        };
        Self::handled(handled.is_some())
    }

    pub fn select_label(
        &self,
        controller: &MapController,
        label: Option<&LabelPickResult>,
        position: Point,
    ) -> EventHandled {
        let handled = label.zip(self.label_select.get()).map(|(label, d)| {
            d.did_select_label(controller, label, position);
        });
        Self::handled(handled.is_some())
    }

    pub fn select_marker(
        &self,
        controller: &MapController,
        marker: Option<&MarkerPickResult>,
        position: Point,
    ) -> EventHandled {
        let handled = marker.zip(self.marker_select.get()).map(|(marker, d)| {
            d.did_select_marker(controller, marker, position);
        });
        Self::handled(handled.is_some())
    }

    pub fn select_feature(
        &self,
        controller: &MapController,
        feature: Option<&FeaturePickResult>,
        position: Point,
    ) -> EventHandled {
        let handled = feature.zip(self.feature_select.get()).map(|(feature, d)| {
            d.did_select_feature(controller, feature, position);
        });
        Self::handled(handled.is_some())
    }

    pub fn set_pan_delegate(&mut self, delegate: Weak<dyn PanDelegate>) {
        self.pan.set(delegate);
    }

    pub fn set_pinch_delegate(&mut self, delegate: Weak<dyn PinchDelegate>) {
        self.pinch.set(delegate);
    }

    pub fn set_rotate_delegate(&mut self, delegate: Weak<dyn RotateDelegate>) {
        self.rotate.set(delegate);
    }

    pub fn set_shove_delegate(&mut self, delegate: Weak<dyn ShoveDelegate>) {
        self.shove.set(delegate);
    }

    pub fn set_single_tap_delegate(&mut self, delegate: Weak<dyn SingleTapDelegate>) {
        self.single_tap.set(delegate);
    }

    pub fn set_double_tap_delegate(&mut self, delegate: Weak<dyn DoubleTapDelegate>) {
        self.double_tap.set(delegate);
    }

    pub fn set_long_press_delegate(&mut self, delegate: Weak<dyn LongPressDelegate>) {
        self.long_press.set(delegate);
    }

    pub fn set_label_select_delegate(&mut self, delegate: Weak<dyn LabelSelectDelegate>) {
        self.label_select.set(delegate);
    }

    pub fn set_marker_select_delegate(&mut self, delegate: Weak<dyn MarkerSelectDelegate>) {
        self.marker_select.set(delegate);
    }

    pub fn set_feature_select_delegate(&mut self, delegate: Weak<dyn FeatureSelectDelegate>) {
        self.feature_select.set(delegate);
    }

    /// Unregisters whatever delegate a channel holds
    pub fn clear_delegate(&mut self, channel: GestureChannel) {
        match channel {
            GestureChannel::Pan => self.pan.clear(),
            GestureChannel::Pinch => self.pinch.clear(),
            GestureChannel::Rotate => self.rotate.clear(),
            GestureChannel::Shove => self.shove.clear(),
            GestureChannel::SingleTap => self.single_tap.clear(),
            GestureChannel::DoubleTap => self.double_tap.clear(),
            GestureChannel::LongPress => self.long_press.clear(),
            GestureChannel::LabelSelect => self.label_select.clear(),
            GestureChannel::MarkerSelect => self.marker_select.clear(),
            GestureChannel::FeatureSelect => self.feature_select.clear(),
        }
    }

    pub fn has_delegate(&self, channel: GestureChannel) -> bool {
        match channel {
            GestureChannel::Pan => self.pan.is_set(),
            GestureChannel::Pinch => self.pinch.is_set(),
            GestureChannel::Rotate => self.rotate.is_set(),
            GestureChannel::Shove => self.shove.is_set(),
            GestureChannel::SingleTap => self.single_tap.is_set(),
            GestureChannel::DoubleTap => self.double_tap.is_set(),
            GestureChannel::LongPress => self.long_press.is_set(),
            GestureChannel::LabelSelect => self.label_select.is_set(),
            GestureChannel::MarkerSelect => self.marker_select.is_set(),
            GestureChannel::FeatureSelect => self.feature_select.is_set(),
        }
    }

    fn handled(delivered: bool) -> EventHandled {
        if delivered {
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        }
    }
}

impl Default for GestureDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuous_channels_enabled_by_default() {
        let dispatcher = GestureDispatcher::new();
        for gesture in [
            ContinuousGesture::Pan,
            ContinuousGesture::Pinch,
            ContinuousGesture::Rotate,
            ContinuousGesture::Shove,
        ] {
            assert!(dispatcher.is_enabled(gesture));
        }
    }

    #[test]
    fn test_disabled_gate_returns_false() {
        let mut dispatcher = GestureDispatcher::new();
        let mut location = LocationSync::new();
        dispatcher.set_enabled(ContinuousGesture::Rotate, false);

        assert!(!dispatcher.should_recognize(ContinuousGesture::Rotate, &mut location));
        assert!(dispatcher.should_recognize(ContinuousGesture::Pinch, &mut location));
    }

    #[test]
    fn test_disabled_pan_gate_cancels_follow_mode() {
        let mut dispatcher = GestureDispatcher::new();
        let mut location = LocationSync::new();
        location.set_should_follow_current_location(true);
        location.find_me_button_mut().set_selected(true);
        dispatcher.set_enabled(ContinuousGesture::Pan, false);

        assert!(!dispatcher.should_recognize(ContinuousGesture::Pan, &mut location));
        assert!(!location.should_follow_current_location());
        assert!(!location.find_me_button().is_selected());
    }

    #[test]
    fn test_enabled_pan_gate_keeps_follow_mode() {
        let dispatcher = GestureDispatcher::new();
        let mut location = LocationSync::new();
        location.set_should_follow_current_location(true);

        assert!(dispatcher.should_recognize(ContinuousGesture::Pan, &mut location));
        assert!(location.should_follow_current_location());
    }

    #[test]
    fn test_recognized_pan_cancels_follow_even_when_disabled() {
        let mut dispatcher = GestureDispatcher::new();
        let mut location = LocationSync::new();
        dispatcher.set_enabled(ContinuousGesture::Pan, false);
        location.set_should_follow_current_location(true);

        dispatcher.recognized(ContinuousGesture::Pan, &mut location);

        assert!(!location.should_follow_current_location());
    }

    #[test]
    fn test_recognized_shove_leaves_follow_mode() {
        let dispatcher = GestureDispatcher::new();
        let mut location = LocationSync::new();
        location.set_should_follow_current_location(true);

        dispatcher.recognized(ContinuousGesture::Shove, &mut location);

        assert!(location.should_follow_current_location());
    }

    #[test]
    fn test_channel_keyed_flags_reject_non_continuous_channels() {
        let mut dispatcher = GestureDispatcher::new();

        assert!(dispatcher
            .set_channel_enabled(GestureChannel::Shove, false)
            .is_ok());
        assert_eq!(dispatcher.channel_enabled(GestureChannel::Shove).ok(), Some(false));

        for channel in [GestureChannel::SingleTap, GestureChannel::MarkerSelect] {
            assert!(matches!(
                dispatcher.channel_enabled(channel),
                Err(MapError::UnsupportedChannel(c)) if c == channel
            ));
            assert!(dispatcher.set_channel_enabled(channel, false).is_err());
        }
    }

    #[test]
    fn test_tap_decision_flags() {
        assert!(TapDecision::Recognize.recognizes());
        assert!(!TapDecision::Recognize.picks());
        assert!(TapDecision::PickAndRecognize.recognizes());
        assert!(TapDecision::PickAndRecognize.picks());
        assert!(!TapDecision::PickAndDecline.recognizes());
        assert!(TapDecision::PickAndDecline.picks());
    }
}
