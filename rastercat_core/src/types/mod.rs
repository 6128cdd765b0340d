//! Contains types like bounding boxes, centers and coordinate reference systems.

mod crs;
pub use crs::*;

mod geo_bbox;
pub use geo_bbox::*;

mod geo_center;
pub use geo_center::*;
