pub mod ingestion;
pub mod principal;
pub mod shared;
pub mod upload;
