pub mod file_asset;
pub mod ingestion_intent;
pub mod principal;
pub mod upload;
