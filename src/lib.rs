pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod store;

pub use error::{AppError, Result};
pub use pipeline::Pipeline;
