pub mod answer;
pub mod batch;
pub mod cases;
pub mod config;
pub mod frequency;
pub mod generator;
pub mod verify;

pub use config::{Distribution, GeneratorConfig};
pub use frequency::FrequencyTable;
pub use generator::{DatasetGenerator, GenerationReport};
