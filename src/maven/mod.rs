pub mod model;
pub mod pom_editor;

pub use model::{DependencyRecord, Interpolator, MavenProject};
pub use pom_editor::{DependencyVersionSetter, ModifiedPom};
