//! Pipeline module - table model, cleaning session and analyses

pub mod cleaner;
pub mod forest;
pub mod importance;
pub mod loader;
pub mod missing;
pub mod mutation;
pub mod outliers;
pub mod table;
pub mod text;

pub use cleaner::*;
pub use forest::{ForestConfig, Task};
pub use importance::*;
pub use loader::*;
pub use missing::*;
pub use mutation::{Mutation, MutationKind, MutationLog, MutationRecord};
pub use outliers::*;
pub use table::*;
pub use text::*;
