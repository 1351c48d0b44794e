//! Controller-wide constants: scene paths, marker stylings and default timings.

use std::time::Duration;

/// Scene component path that carries the API key for tile requests.
pub const API_KEY_SCENE_PATH: &str = "global.sdk_mapzen_api_key";

/// Environment variable consulted by `ControllerConfig::from_env`.
pub const API_KEY_ENV_VAR: &str = "MAPZEN_API_KEY";

/// Marker styling applied to every annotation marker.
pub const ANNOTATION_MARKER_STYLING: &str =
    "{ style: 'sdk-point-overlay', sprite: 'ux-search-active', size: [24px, 36px], collide: false, interactive: true }";

/// Marker styling of the current-location indicator.
pub const CURRENT_LOCATION_MARKER_STYLING: &str =
    "{ style: 'ux-location-gem-overlay', sprite: 'ux-current-location', size: 36px, collide: false }";

/// Page opened by the attribution button.
pub const ATTRIBUTION_URL: &str = "https://mapzen.com/rights/";

/// Camera animation used when the find-me button re-centres the map.
pub const DEFAULT_FIND_ME_ANIMATION: Duration = Duration::from_secs(1);

/// Camera animation used to follow location updates.
pub const DEFAULT_FOLLOW_ANIMATION: Duration = Duration::from_millis(500);
