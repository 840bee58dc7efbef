pub mod logger;
pub mod tables;
