pub mod config;
pub mod engine;
pub mod presenter;
pub mod scheduler;
pub mod simulate;
pub mod story;
pub mod template;
