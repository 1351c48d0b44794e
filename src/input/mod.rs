pub mod delegates;
pub mod events;
pub mod gestures;

// Re-export the essential types
pub use delegates::{
    DelegateSlot, DoubleTapDelegate, FeatureSelectDelegate, LabelSelectDelegate,
    LongPressDelegate, MarkerSelectDelegate, PanDelegate, PinchDelegate, RotateDelegate,
    ShoveDelegate, SingleTapDelegate, TileLoadDelegate,
};
pub use events::{ContinuousGesture, EventHandled, GestureChannel, TapGesture};
pub use gestures::{GestureDispatcher, TapDecision};
