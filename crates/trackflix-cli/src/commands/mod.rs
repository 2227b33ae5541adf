pub mod account;
pub mod config;
pub mod context;
pub mod movies;
pub mod prompts;
pub mod serve;
pub mod ui;
