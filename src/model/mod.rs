pub mod adjustment;
pub mod enrollment;
pub mod ledger;
pub mod policy;
pub mod punch;
pub mod summary;
