use entry_requirements::programs::requirements::{
    CatalogError, Program, ProgramCatalog, ProgramId, ProgramRequirementSet,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local catalog; programs keep the order they were inserted in.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProgramCatalog {
    programs: Arc<Mutex<Vec<Program>>>,
}

impl InMemoryProgramCatalog {
    pub(crate) fn with_programs(programs: Vec<Program>) -> Self {
        Self {
            programs: Arc::new(Mutex::new(programs)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Program>>, CatalogError> {
        self.programs
            .lock()
            .map_err(|_| CatalogError::Unavailable("catalog mutex poisoned".to_string()))
    }
}

impl ProgramCatalog for InMemoryProgramCatalog {
    fn insert(&self, program: Program) -> Result<Program, CatalogError> {
        let mut guard = self.lock()?;
        if guard.iter().any(|existing| existing.id == program.id) {
            return Err(CatalogError::Conflict);
        }
        guard.push(program.clone());
        Ok(program)
    }

    fn replace_requirements(
        &self,
        id: &ProgramId,
        requirements: ProgramRequirementSet,
    ) -> Result<Program, CatalogError> {
        let mut guard = self.lock()?;
        let program = guard
            .iter_mut()
            .find(|program| &program.id == id)
            .ok_or(CatalogError::NotFound)?;
        program.requirements = requirements;
        Ok(program.clone())
    }

    fn fetch(&self, id: &ProgramId) -> Result<Option<Program>, CatalogError> {
        let guard = self.lock()?;
        Ok(guard.iter().find(|program| &program.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Program>, CatalogError> {
        Ok(self.lock()?.clone())
    }
}
