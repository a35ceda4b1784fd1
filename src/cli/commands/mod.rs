//! CLI command implementations

pub mod cache;
pub mod run;
pub mod unlock;

pub use cache::execute as cache;
pub use run::execute as run;
pub use unlock::execute as unlock;
