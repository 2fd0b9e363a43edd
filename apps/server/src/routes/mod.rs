pub mod locations;
pub mod plates;
