mod auth;
mod listing;
mod uploads;
