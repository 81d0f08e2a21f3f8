use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::adaptive::types::LearnerStateSnapshot;

/// Learner snapshots keyed by learner id. Each learner has its own mutex, so an
/// update-then-decide cycle for one learner never interleaves with another
/// cycle for the same learner, while different learners run in parallel.
#[derive(Default)]
pub struct LearnerStore {
    learners: RwLock<HashMap<String, Arc<Mutex<LearnerStateSnapshot>>>>,
}

impl LearnerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, learner_id: &str) -> Arc<Mutex<LearnerStateSnapshot>> {
        if let Some(handle) = self.learners.read().get(learner_id) {
            return Arc::clone(handle);
        }
        let mut learners = self.learners.write();
        Arc::clone(
            learners
                .entry(learner_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(LearnerStateSnapshot::default()))),
        )
    }

    /// Runs `f` with exclusive access to the learner's snapshot, creating an
    /// empty one on first use.
    pub fn with_learner<R>(
        &self,
        learner_id: &str,
        f: impl FnOnce(&mut LearnerStateSnapshot) -> R,
    ) -> R {
        let handle = self.handle(learner_id);
        let mut state = handle.lock();
        f(&mut state)
    }

    pub fn snapshot(&self, learner_id: &str) -> Option<LearnerStateSnapshot> {
        let handle = self.learners.read().get(learner_id).map(Arc::clone)?;
        let state = handle.lock();
        Some(state.clone())
    }
}
