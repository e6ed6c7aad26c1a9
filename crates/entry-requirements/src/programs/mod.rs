pub mod requirements;
pub mod seed;

pub use seed::{ProgramSeedImporter, SeedImportError};
