pub mod advice;
mod label;
mod probability;

pub use advice::{AdviceRecord, CatalogError};
pub use label::ClassLabel;
pub use probability::{Prediction, ProbabilityError, ProbabilityVector};
pub use strum::{EnumCount, IntoEnumIterator};
