pub mod config;
pub mod session;
pub mod survey;
pub mod view;
