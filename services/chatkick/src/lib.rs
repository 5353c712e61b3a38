pub mod app;
pub mod command;
pub mod config;
pub mod player;
pub mod render;
