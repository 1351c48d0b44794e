pub mod annotation;
pub mod marker;

pub use annotation::{Annotation, AnnotationId};
pub use marker::MarkerRegistry;
