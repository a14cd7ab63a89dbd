//! Integration flows.

pub mod flows;
pub mod on_disk;
