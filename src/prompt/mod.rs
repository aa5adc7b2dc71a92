pub mod composer;
pub mod tables;
