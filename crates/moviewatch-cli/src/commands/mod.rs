pub mod clear;
pub mod config;
pub mod discover;
pub mod movie;
pub mod progress;
pub mod prompts;
pub mod search;
pub mod watchlist;
