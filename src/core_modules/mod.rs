pub mod pixel;
pub mod smart_pixel;
pub mod raster;
pub mod histogram;
pub mod features;
pub mod sentiment;
pub mod team;
pub mod verdict;
