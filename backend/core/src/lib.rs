pub mod error;
pub mod traits;
pub mod types;

pub use error::PipelineError;
pub use traits::{InferenceClient, PredictionStore};
pub use types::{PredictionRecord, SpecificationResult, Upload};
