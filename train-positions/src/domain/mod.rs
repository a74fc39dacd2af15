//! Domain types for reported train positions.
//!
//! These types are what the rest of the crate hands around once the raw
//! service reply has been projected. They enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod error;
mod position;
mod train;

pub use error::FormatError;
pub use position::GeoPoint;
pub use train::{Train, TrainNumber};
