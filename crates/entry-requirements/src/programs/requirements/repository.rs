use super::domain::{Program, ProgramId, ProgramRequirementSet};

/// Storage abstraction for programs; persistence lives outside this crate.
pub trait ProgramCatalog: Send + Sync {
    fn insert(&self, program: Program) -> Result<Program, CatalogError>;
    fn replace_requirements(
        &self,
        id: &ProgramId,
        requirements: ProgramRequirementSet,
    ) -> Result<Program, CatalogError>;
    fn fetch(&self, id: &ProgramId) -> Result<Option<Program>, CatalogError>;
    /// Programs in catalog order.
    fn list(&self) -> Result<Vec<Program>, CatalogError>;
}

/// Error enumeration for catalog failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("program already exists")]
    Conflict,
    #[error("program not found")]
    NotFound,
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}
