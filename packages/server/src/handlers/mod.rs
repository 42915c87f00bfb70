pub mod files;
pub mod ingestions;
pub mod principals;
pub mod uploads;
