pub mod grid;
pub mod scenario;

pub use grid::*;
pub use scenario::*;
