//! Operations over the ledger and the slots it refers to

pub mod locations;
pub mod plates;
