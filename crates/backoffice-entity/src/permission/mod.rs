//! Permission vocabulary and permission sets.

pub mod model;
pub mod set;

pub use model::Permission;
pub use set::PermissionSet;
