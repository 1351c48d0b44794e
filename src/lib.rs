//! # mapview
//!
//! Controller layer for an embeddable vector map view.
//!
//! [`MapController`] sits between a host application and a native
//! rendering engine (anything implementing [`RenderEngine`]). It keeps
//! annotations and engine markers one-to-one, batches scene updates and
//! always sends the API key last, tracks the device location and the
//! current-location marker, and routes gestures and pick results to
//! per-channel delegates held by weak reference.

pub mod core;
pub mod engine;
pub mod input;
pub mod layers;
pub mod location;
pub mod prelude;
pub mod scene;
pub mod testing;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::ControllerConfig,
    geo::{LatLng, Point},
    map::{HostApplication, MapController},
};

pub use crate::engine::{
    EaseType, FeaturePickResult, LabelKind, LabelPickResult, MarkerHandle, MarkerPickResult,
    RenderEngine,
};

pub use crate::input::{
    delegates::{
        DelegateSlot, DoubleTapDelegate, FeatureSelectDelegate, LabelSelectDelegate,
        LongPressDelegate, MarkerSelectDelegate, PanDelegate, PinchDelegate, RotateDelegate,
        ShoveDelegate, SingleTapDelegate, TileLoadDelegate,
    },
    events::{ContinuousGesture, EventHandled, GestureChannel, TapGesture},
    gestures::{GestureDispatcher, TapDecision},
};

pub use crate::layers::{
    annotation::{Annotation, AnnotationId},
    marker::MarkerRegistry,
};

pub use crate::location::{FindMeButton, LocationService, LocationSync};

pub use crate::scene::{
    style::{OnStyleLoaded, PendingStyleLoad, StyleLoadNotifier, StyleSelection},
    update::{LoadMode, SceneUpdate, SceneUpdateQueue},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// Every annotation of the batch that already had a marker
    #[error("Annotation(s) already added: {0:?}")]
    DuplicateAnnotation(Vec<AnnotationId>),

    #[error("Annotation not found: {0}")]
    NotFound(AnnotationId),

    #[error("No API key configured for style load")]
    MissingApiKey,

    #[error("Channel {0} has no enable flag")]
    UnsupportedChannel(GestureChannel),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` reading `RUST_LOG`. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
