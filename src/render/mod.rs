pub mod raster;

#[cfg(feature = "sample")]
pub mod pdfium;

pub use raster::RasterCache;
