//! Treats a single georeferenced raster as a catalog of imagery sources.
//!
//! [`VirtualCatalog`] opens a raster once, extracts bounds, resolution, zoom
//! range, band statistics and tag metadata, and then yields one [`Source`]
//! per query that tells a rendering pipeline how to read and color-correct
//! the raster.

mod catalog;
pub use catalog::*;

pub mod metadata;
pub use metadata::{TagMap, TagValue};

mod options;
pub use options::*;

pub mod raster;

mod recipe;
pub use recipe::*;

mod resample;
pub use resample::*;

mod source;
pub use source::*;

mod virtual_catalog;
pub use virtual_catalog::*;
