pub mod compose;
pub mod config;
pub mod console;
pub mod context;
pub mod ideas;
pub mod image;
pub mod publish;
pub mod wizard;
