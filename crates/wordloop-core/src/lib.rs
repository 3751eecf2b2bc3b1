//! wordloop-core: spaced-repetition scheduling and the daily quiz pipeline.
//!
//! This crate defines the data model, the store traits, the interval
//! scheduler, quiz building and grading, and the service that ties them to a
//! store.

pub mod builder;
pub mod error;
pub mod grader;
pub mod model;
pub mod report;
pub mod scheduler;
pub mod service;
pub mod traits;
pub mod updater;
pub mod wordlist;

pub use error::{QuizError, StoreError};
pub use service::{QuizService, ServiceConfig};
