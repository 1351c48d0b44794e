pub mod config;
pub mod constants;
pub mod geo;
pub mod map;

pub use config::ControllerConfig;
pub use geo::{LatLng, Point};
pub use map::{HostApplication, MapController};
