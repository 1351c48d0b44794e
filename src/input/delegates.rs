//! One capability trait per interaction channel.
//!
//! A host type may implement any subset of these. Each slot stores its own
//! non-owning reference, so registering a pan delegate leaves every other
//! channel untouched, and dropping the host object silently empties the slot.

use crate::{
    core::{geo::Point, map::MapController},
    engine::{FeaturePickResult, LabelPickResult, MarkerPickResult},
};
use std::rc::{Rc, Weak};

pub trait PanDelegate {
    fn did_pan_map(&self, controller: &MapController, displacement: Point);
}

pub trait PinchDelegate {
    fn did_pinch_map(&self, controller: &MapController, location: Point);
}

pub trait RotateDelegate {
    fn did_rotate_map(&self, controller: &MapController, location: Point);
}

pub trait ShoveDelegate {
    fn did_shove_map(&self, controller: &MapController, displacement: Point);
}

pub trait SingleTapDelegate {
    /// Returning false hands the tap over to label/marker/feature picking
    fn should_recognize_single_tap(&self, controller: &MapController, location: Point) -> bool;

    fn did_recognize_single_tap(&self, controller: &MapController, location: Point);
}

pub trait DoubleTapDelegate {
    fn should_recognize_double_tap(&self, controller: &MapController, location: Point) -> bool;

    fn did_recognize_double_tap(&self, controller: &MapController, location: Point);
}

pub trait LongPressDelegate {
    fn should_recognize_long_press(&self, controller: &MapController, location: Point) -> bool;

    fn did_recognize_long_press(&self, controller: &MapController, location: Point);
}

pub trait LabelSelectDelegate {
    fn did_select_label(&self, controller: &MapController, label: &LabelPickResult, position: Point);
}

pub trait MarkerSelectDelegate {
    fn did_select_marker(
        &self,
        controller: &MapController,
        marker: &MarkerPickResult,
        position: Point,
    );
}

pub trait FeatureSelectDelegate {
    fn did_select_feature(
        &self,
        controller: &MapController,
        feature: &FeaturePickResult,
        position: Point,
    );
}

/// Scene and tile loading notifications
pub trait TileLoadDelegate {
    /// An asynchronous scene load finished, whether it is still the latest or not
    fn did_load_scene_async(&self, _controller: &MapController, _scene: &str) {}

    /// All visible tiles finished loading
    fn did_complete_loading(&self, _controller: &MapController) {}
}

/// Non-owning slot for one delegate
pub struct DelegateSlot<T: ?Sized> {
    delegate: Option<Weak<T>>,
}

impl<T: ?Sized> DelegateSlot<T> {
    pub fn new() -> Self {
        Self { delegate: None }
    }

    pub fn set(&mut self, delegate: Weak<T>) {
        self.delegate = Some(delegate);
    }

    pub fn clear(&mut self) {
        self.delegate = None;
    }

    /// The delegate, if one is registered and still alive
    pub fn get(&self) -> Option<Rc<T>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

impl<T: ?Sized> Default for DelegateSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for DelegateSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegateSlot")
            .field("set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Ping {
        fn ping(&self) -> u32;
    }

    struct Pinger;

    impl Ping for Pinger {
        fn ping(&self) -> u32 {
            7
        }
    }

    #[test]
    fn test_slot_does_not_keep_delegate_alive() {
        let delegate = Rc::new(Pinger);
        let mut slot: DelegateSlot<dyn Ping> = DelegateSlot::new();
        let weak: Weak<dyn Ping> = Rc::<Pinger>::downgrade(&delegate);
        slot.set(weak);

        assert_eq!(slot.get().map(|d| d.ping()), Some(7));
        assert_eq!(Rc::strong_count(&delegate), 1);

        drop(delegate);
        assert!(slot.get().is_none());
        assert!(!slot.is_set());
    }

    #[test]
    fn test_slot_clear() {
        let delegate = Rc::new(Pinger);
        let mut slot: DelegateSlot<dyn Ping> = DelegateSlot::default();
        let weak: Weak<dyn Ping> = Rc::<Pinger>::downgrade(&delegate);
        slot.set(weak);

        slot.clear();

        assert!(slot.get().is_none());
    }
}
