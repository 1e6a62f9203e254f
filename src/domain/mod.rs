//! Domain logic - pure business rules independent of git operations

pub mod interval;
pub mod option;
pub mod release;

pub use interval::Interval;
pub use option::QueryOption;
pub use release::{Release, ReleaseResult, ReleaseSource};
