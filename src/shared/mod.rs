pub mod eta;
pub mod geo;

pub use eta::*;
pub use geo::*;
