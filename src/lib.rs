pub mod art;
pub mod config;
pub mod math;
pub mod path;
pub mod sampler;
pub mod spiral;
pub mod tone;
