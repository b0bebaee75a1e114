//! Pure data structures and the status diff that runs on them.

pub mod diff;
pub mod order;
pub mod report;
pub mod snapshot;
pub mod user;

pub use diff::*;
pub use order::*;
pub use report::*;
pub use snapshot::*;
pub use user::*;
