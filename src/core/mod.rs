pub mod adjustment;
pub mod calculator;
pub mod error;
pub mod policy;
pub mod recalc;
pub mod registrar;
pub mod sequence;
