pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;
pub mod tui;
pub mod utils;
pub mod views;

pub use config::Config;
pub use models::{Budget, Expense, Note, Task, TimeBlock};
pub use services::ServiceError;
pub use store::{Backend, MemoryBackend, StoreError};
pub use utils::Profile;
