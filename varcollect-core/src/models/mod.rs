pub mod collection;
pub mod metadata;
pub mod variant;

pub use collection::*;
pub use metadata::*;
pub use variant::*;
