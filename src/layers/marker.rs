use crate::{
    core::constants::ANNOTATION_MARKER_STYLING,
    engine::{MarkerHandle, RenderEngine},
    layers::annotation::{Annotation, AnnotationId},
    prelude::HashMap,
    MapError, Result,
};

/// Tracks which engine marker represents which annotation.
///
/// Holds at most one marker per annotation. Markers are only released by
/// [`MarkerRegistry::remove`], [`MarkerRegistry::remove_all`] or
/// [`MarkerRegistry::forget_handle`].
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    /// Registered annotations and their markers, by identity
    entries: HashMap<AnnotationId, (Annotation, MarkerHandle)>,
    /// Reverse index for marker picks
    by_handle: HashMap<MarkerHandle, AnnotationId>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates one marker per annotation not yet registered.
    ///
    /// Every item is processed on its own: duplicates are collected and
    /// reported together, while the other annotations of the same batch are
    /// still registered. Annotations whose marker the engine refused to
    /// create are left out of the returned mapping.
    pub fn add(
        &mut self,
        engine: &mut dyn RenderEngine,
        annotations: &[Annotation],
    ) -> Result<HashMap<Annotation, MarkerHandle>> {
        let mut added = HashMap::default();
        let mut duplicates = Vec::new();

        for annotation in annotations {
            if self.entries.contains_key(&annotation.id()) {
                duplicates.push(annotation.id());
                continue;
            }

            let Some(handle) = engine.marker_add() else {
                log::warn!("engine refused to create a marker for {}", annotation.id());
                continue;
            };
            if !engine.marker_set_point(handle, annotation.coordinate()) {
                log::warn!("engine rejected the point of {}", handle);
            }
            if !engine.marker_set_styling(handle, ANNOTATION_MARKER_STYLING) {
                log::warn!("engine rejected the styling of {}", handle);
            }

            self.entries
                .insert(annotation.id(), (annotation.clone(), handle));
            self.by_handle.insert(handle, annotation.id());
            added.insert(annotation.clone(), handle);
        }

        log::debug!(
            "registered {} annotation(s), {} duplicate(s)",
            added.len(),
            duplicates.len()
        );

        if duplicates.is_empty() {
            Ok(added)
        } else {
            Err(MapError::DuplicateAnnotation(duplicates))
        }
    }

    /// Removes the marker of one annotation
    pub fn remove(&mut self, engine: &mut dyn RenderEngine, annotation: &Annotation) -> Result<()> {
        let (_, handle) = self
            .entries
            .remove(&annotation.id())
            .ok_or(MapError::NotFound(annotation.id()))?;
        self.by_handle.remove(&handle);

        if !engine.marker_remove(handle) {
            log::warn!("engine rejected removal of {}", handle);
        }
        Ok(())
    }

    /// Issues a single engine-wide marker wipe and forgets every entry
    pub fn remove_all(&mut self, engine: &mut dyn RenderEngine) {
        engine.marker_remove_all();
        self.entries.clear();
        self.by_handle.clear();
    }

    /// Drops the entry owning `handle` without issuing any engine command.
    ///
    /// Used when the marker was already removed through a raw engine call.
    pub fn forget_handle(&mut self, handle: MarkerHandle) -> Option<Annotation> {
        let id = self.by_handle.remove(&handle)?;
        self.entries.remove(&id).map(|(annotation, _)| annotation)
    }

    pub fn handle_for(&self, annotation: &Annotation) -> Option<MarkerHandle> {
        self.entries
            .get(&annotation.id())
            .map(|(_, handle)| *handle)
    }

    /// Maps a picked marker back to the annotation it represents
    pub fn annotation_for(&self, handle: MarkerHandle) -> Option<&Annotation> {
        let id = self.by_handle.get(&handle)?;
        self.entries.get(id).map(|(annotation, _)| annotation)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Annotation, MarkerHandle)> {
        self.entries
            .values()
            .map(|(annotation, handle)| (annotation, *handle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::LatLng,
        testing::{EngineCommand, RecordingEngine},
    };

    fn annotation(lat: f64, lng: f64, title: &str) -> Annotation {
        Annotation::new(LatLng::new(lat, lng)).with_title(title)
    }

    #[test]
    fn test_add_creates_positioned_and_styled_markers() {
        let mut engine = RecordingEngine::new();
        let mut registry = MarkerRegistry::new();
        let first = annotation(0.0, 0.0, "Test1");
        let second = annotation(1.0, 1.0, "Test2");

        let added = registry
            .add(&mut engine, &[first.clone(), second.clone()])
            .unwrap();

        assert_eq!(added.len(), 2);
        assert_eq!(registry.handle_for(&first), added.get(&first).copied());
        assert_eq!(registry.handle_for(&second), added.get(&second).copied());

        let handle = added[&second];
        let log = engine.log();
        assert!(log.commands.contains(&EngineCommand::MarkerSetPoint(
            handle,
            LatLng::new(1.0, 1.0)
        )));
        assert!(log.commands.contains(&EngineCommand::MarkerSetStyling(
            handle,
            ANNOTATION_MARKER_STYLING.to_string()
        )));
    }

    #[test]
    fn test_duplicate_add_is_rejected_and_keeps_single_entry() {
        let mut engine = RecordingEngine::new();
        let mut registry = MarkerRegistry::new();
        let first = annotation(0.0, 0.0, "Test1");

        registry.add(&mut engine, &[first.clone()]).unwrap();
        let handle = registry.handle_for(&first);

        let err = registry.add(&mut engine, &[first.clone()]).unwrap_err();
        assert!(matches!(err, MapError::DuplicateAnnotation(ref ids) if ids == &vec![first.id()]));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.handle_for(&first), handle);
        assert_eq!(engine.log().markers_created, 1);
    }

    #[test]
    fn test_duplicates_do_not_block_the_rest_of_a_batch() {
        let mut engine = RecordingEngine::new();
        let mut registry = MarkerRegistry::new();
        let first = annotation(0.0, 0.0, "Test1");
        let second = annotation(1.0, 1.0, "Test2");
        registry.add(&mut engine, &[first.clone()]).unwrap();

        let result = registry.add(&mut engine, &[first.clone(), second.clone(), second.clone()]);

        assert!(matches!(result, Err(MapError::DuplicateAnnotation(ref ids)) if ids.len() == 2));
        assert!(registry.handle_for(&second).is_some());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_refused_marker_creation_leaves_annotation_unregistered() {
        let mut engine = RecordingEngine::new();
        engine.log_mut().refuse_marker_creation = true;
        let mut registry = MarkerRegistry::new();
        let first = annotation(0.0, 0.0, "Test1");

        let added = registry.add(&mut engine, &[first.clone()]).unwrap();

        assert!(added.is_empty());
        assert!(registry.handle_for(&first).is_none());
    }

    #[test]
    fn test_remove_releases_marker() {
        let mut engine = RecordingEngine::new();
        let mut registry = MarkerRegistry::new();
        let first = annotation(0.0, 0.0, "Test1");
        let handle = registry.add(&mut engine, &[first.clone()]).unwrap()[&first];

        registry.remove(&mut engine, &first).unwrap();

        assert!(registry.handle_for(&first).is_none());
        assert!(registry.annotation_for(handle).is_none());
        assert_eq!(engine.log().last(), Some(&EngineCommand::MarkerRemove(handle)));
    }

    #[test]
    fn test_remove_unknown_annotation_is_not_found() {
        let mut engine = RecordingEngine::new();
        let mut registry = MarkerRegistry::new();
        let stranger = annotation(0.0, 0.0, "Test1");

        let err = registry.remove(&mut engine, &stranger).unwrap_err();

        assert!(matches!(err, MapError::NotFound(id) if id == stranger.id()));
        assert!(engine.log().commands.is_empty());
    }

    #[test]
    fn test_remove_all_clears_every_entry_with_one_command() {
        let mut engine = RecordingEngine::new();
        let mut registry = MarkerRegistry::new();
        let annotations: Vec<_> = (0..5)
            .map(|i| annotation(i as f64, i as f64, "batch"))
            .collect();
        registry.add(&mut engine, &annotations).unwrap();
        engine.log_mut().commands.clear();

        registry.remove_all(&mut engine);

        assert!(registry.is_empty());
        assert!(annotations.iter().all(|a| registry.handle_for(a).is_none()));
        assert_eq!(engine.log().commands, vec![EngineCommand::MarkerRemoveAll]);
    }

    #[test]
    fn test_annotation_for_and_forget_handle() {
        let mut engine = RecordingEngine::new();
        let mut registry = MarkerRegistry::new();
        let first = annotation(0.0, 0.0, "Test1");
        let handle = registry.add(&mut engine, &[first.clone()]).unwrap()[&first];

        assert_eq!(registry.annotation_for(handle), Some(&first));
        assert_eq!(registry.forget_handle(handle), Some(first.clone()));
        assert!(registry.handle_for(&first).is_none());
        assert_eq!(registry.forget_handle(handle), None);
    }
}
