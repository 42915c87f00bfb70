pub mod config;
pub mod role;
pub mod storage;

pub use role::Role;
