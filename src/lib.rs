//! PeaceNet - learning and support core
//!
//! PeaceNet walks learners through short educational chapters ending in a
//! knowledge check, and offers an empathetic AI support chat backed by Gemini.

pub mod app;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod gemini;
pub mod learning;

pub use app::App;
pub use config::Config;
