//! Geographic value types and the small amount of geodesy needed to describe a raster as a catalog:
//! bounding boxes, centers, coordinate reference systems, ground resolution and zoom levels.

pub mod types;
pub use types::*;

pub mod utils;
pub use utils::*;
