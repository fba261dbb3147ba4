pub mod memory;
pub mod sqlite;

pub use memory::InMemoryPredictionStore;
pub use sqlite::{database_file, SqlitePredictionStore};
