use mapview::{
    prelude::*,
    testing::{RecordingApplication, RecordingEngine, RecordingLocationService},
};

/// Logs marker picks and pans the way a host view would react to them
struct DemoHost;

impl PanDelegate for DemoHost {
    fn did_pan_map(&self, controller: &MapController, displacement: Point) {
        log::info!(
            "panned by ({}, {}), following: {}",
            displacement.x,
            displacement.y,
            controller.should_follow_current_location()
        );
    }
}

impl MarkerSelectDelegate for DemoHost {
    fn did_select_marker(&self, controller: &MapController, marker: &MarkerPickResult, _: Point) {
        match controller.annotation_for_marker(marker.marker) {
            Some(annotation) => log::info!(
                "picked {} ({})",
                annotation.title().unwrap_or("untitled"),
                annotation.id()
            ),
            None => log::info!("picked unowned {}", marker.marker),
        }
    }
}

impl TileLoadDelegate for DemoHost {
    fn did_complete_loading(&self, _: &MapController) {
        log::info!("tiles ready");
    }
}

/// Headless walkthrough of the controller against a recording engine
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mapview::init_logging();

    let mut config = ControllerConfig::from_env()?;
    if config.api_key.is_none() {
        log::warn!("MAPZEN_API_KEY not set, using a placeholder key");
        config = config.with_api_key("demo-key");
    }

    let engine = RecordingEngine::new();
    let mut controller = MapController::new(
        Box::new(engine.clone()),
        Box::new(RecordingLocationService::new()),
        Box::new(RecordingApplication::new()),
        config.with_default_style(StyleSelection::Refill),
    );

    let host = Rc::new(DemoHost);
    controller.set_pan_delegate(&host);
    controller.set_marker_select_delegate(&host);
    controller.set_tile_load_delegate(&host);

    controller.load_default_style()?;
    controller.queue_scene_update("global.ux_language", "en");
    let notifier = controller.load_style_async_notified(StyleSelection::Walkabout, Vec::new())?;
    controller.did_load_scene_async(StyleSelection::Walkabout.file_name());
    log::info!("async style ready: {}", notifier.await?);
    controller.did_complete_loading();

    let ferry_building = Annotation::new(LatLng::new(37.7955, -122.3937))
        .with_title("Ferry Building")
        .with_subtitle("San Francisco");
    let added = controller.add_annotations(&[ferry_building.clone()])?;
    if let Some(marker) = added.get(&ferry_building) {
        let at = controller.lng_lat_to_screen_position(ferry_building.coordinate());
        if !controller.should_recognize_tap(TapGesture::SingleTap, at) {
            log::info!("tap declined by host");
        }
        controller.did_select_marker(
            Some(&MarkerPickResult {
                marker: *marker,
                coordinates: ferry_building.coordinate(),
            }),
            at,
        );
    }

    controller.enable_location_layer(true);
    controller.location_did_update(LatLng::new(37.7749, -122.4194));
    controller.did_recognize_gesture(ContinuousGesture::Pan, Point::new(12.0, -4.0));
    controller.find_me_tapped();

    controller.remove_annotations();
    controller.enable_location_layer(false);

    log::info!("engine received {} command(s)", engine.log().commands.len());
    Ok(())
}
