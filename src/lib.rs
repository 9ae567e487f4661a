// Paralympics + Iris web apps - Core Library
// Exposes all modules for use in the import CLI, both servers, and tests

pub mod config;
pub mod db;
pub mod error;
pub mod iris;        // Iris prediction app
pub mod logging;
pub mod paralympics; // Paralympics regions/events app
pub mod web;         // HTML helpers + shared connection

// Re-export commonly used types
pub use db::{count_rows, open_database, setup_database, StoreError};
pub use error::AppError;
pub use iris::{
    Classifier, Iris, LabelEncoder, LinearClassifier, Measurements, Predictor, User,
};
pub use paralympics::{Event, Region, RegionSchema, SchemaError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
