use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ANNOTATION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity token of an [`Annotation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnotationId(u64);

impl AnnotationId {
    fn next() -> Self {
        Self(NEXT_ANNOTATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "annotation#{}", self.0)
    }
}

/// A host-level point of interest shown on the map as a marker.
///
/// Equality and hashing follow the identity token assigned at construction,
/// so two annotations built from the same coordinate and title are still
/// distinct. A clone shares the identity of its source.
#[derive(Debug, Clone)]
pub struct Annotation {
    id: AnnotationId,
    coordinate: LatLng,
    title: Option<String>,
    subtitle: Option<String>,
    data: Option<serde_json::Value>,
}

impl Annotation {
    pub fn new(coordinate: LatLng) -> Self {
        Self {
            id: AnnotationId::next(),
            coordinate,
            title: None,
            subtitle: None,
            data: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Attaches an opaque payload the controller carries but never inspects
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn coordinate(&self) -> LatLng {
        self.coordinate
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }
}

impl PartialEq for Annotation {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Annotation {}

impl std::hash::Hash for Annotation {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
