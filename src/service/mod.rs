pub mod cache;
pub mod classification;
pub mod diagnosis;
pub mod extraction;
pub mod generation;
pub mod query;
pub mod report;

pub use cache::DiagnosisCache;
pub use diagnosis::{DiagnosisError, DiagnosisInput, DiagnosisService};
pub use extraction::GasDataExtractor;
pub use generation::{NarrativeGenerator, OllamaGenerator};
