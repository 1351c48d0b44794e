//! Scene (style) management: pending overrides, the built-in styles and the
//! single outstanding asynchronous load.

pub mod style;
pub mod update;

pub use style::{OnStyleLoaded, PendingStyleLoad, StyleLoadNotifier, StyleSelection};
pub use update::{LoadMode, SceneUpdate, SceneUpdateQueue};
