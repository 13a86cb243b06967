pub mod classification;
pub mod detection;
pub mod directory;
pub mod legacy;
pub mod matching;
pub mod ranking;
pub mod scoring;

pub use detection::DuplicateDetectionService;
pub use directory::{ProfessionalDirectory, SupabaseProfessionalDirectory};
