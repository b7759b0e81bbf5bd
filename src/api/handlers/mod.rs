pub mod health;
pub mod listing;
pub mod registration;
pub mod webhook;
