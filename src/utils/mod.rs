//! Small shared helpers.

pub mod error;
pub mod mime;
pub mod path;
pub mod plural;
