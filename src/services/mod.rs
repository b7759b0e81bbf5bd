pub mod bot;
pub mod fetcher;
pub mod listing;
pub mod listing_page;
pub mod registration;
pub mod storage;
pub mod telegram;
