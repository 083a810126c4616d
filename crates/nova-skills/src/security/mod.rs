//! Security hygiene skills.

pub mod dark_web;
pub mod threat;
