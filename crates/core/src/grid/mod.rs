//! Regular grid holding the evolving elevation field.

pub mod raster;

pub use raster::{RasterGrid, NEIGHBORS};
