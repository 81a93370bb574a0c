/// Small value types shared by configuration and raster code.
pub mod core;
/// Error taxonomy and result alias.
pub mod error;
