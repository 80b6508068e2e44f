#![doc = include_str!("../README.md")]

mod digest;
mod enumerator;
mod error;
mod model;
mod partition;

pub use crate::digest::*;
pub use crate::enumerator::*;
pub use crate::error::*;
pub use crate::model::*;
pub use crate::partition::*;
