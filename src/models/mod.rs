pub mod generation;
pub mod style;

pub use generation::*;
pub use style::*;
