//! Infrastructure layer - storage and event plumbing

pub mod db;
pub mod event;
