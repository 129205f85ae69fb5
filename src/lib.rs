pub mod catalog;
pub mod config;
pub mod content;
pub mod fixtures;
pub mod gemini;
pub mod http_client;
pub mod markup;
pub mod persist;
pub mod prompts;
pub mod provider;
pub mod service;
pub mod state;
