//! Prelude module for common mapview types and traits
//!
//! Re-exports the types most hosts need, for `use mapview::prelude::*;`

pub use crate::core::{
    config::ControllerConfig,
    geo::{LatLng, Point},
    map::{HostApplication, MapController},
};

pub use crate::engine::{
    EaseType, FeaturePickResult, LabelPickResult, MarkerHandle, MarkerPickResult, RenderEngine,
};

pub use crate::input::{
    delegates::{
        DoubleTapDelegate, FeatureSelectDelegate, LabelSelectDelegate, LongPressDelegate,
        MarkerSelectDelegate, PanDelegate, PinchDelegate, RotateDelegate, ShoveDelegate,
        SingleTapDelegate, TileLoadDelegate,
    },
    events::{ContinuousGesture, EventHandled, GestureChannel, TapGesture},
};

pub use crate::layers::annotation::{Annotation, AnnotationId};

pub use crate::location::{FindMeButton, LocationService};

pub use crate::scene::{
    style::{OnStyleLoaded, StyleLoadNotifier, StyleSelection},
    update::SceneUpdate,
};

pub use crate::{Error as MapError, Result};

pub use std::{rc::Rc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
