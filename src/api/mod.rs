pub mod adjustment;
pub mod assignment;
pub mod ledger;
pub mod punch;
pub mod summary;
