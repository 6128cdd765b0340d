mod case;
pub use case::*;

mod resolution;
pub use resolution::*;
