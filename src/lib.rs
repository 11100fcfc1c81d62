pub mod application;
pub mod infrastructure;
pub mod presentation;
