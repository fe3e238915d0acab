use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Identifies a diagnostic test created during the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientTestRef {
    pub patient_id: String,
    pub id: String,
}

/// Ids learned from successful creates, shared by every virtual user.
///
/// Both collections are append-only. Entries go in after a 201 and are never
/// removed, so a reader holding an index from one snapshot can never observe it
/// being invalidated.
#[derive(Debug, Default)]
pub struct ScenarioState {
    patient_ids: RwLock<Vec<String>>,
    patient_tests: RwLock<Vec<PatientTestRef>>,
}

impl ScenarioState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_patient(&self, id: impl Into<String>) {
        self.patient_ids.write().push(id.into());
    }

    pub fn record_test(&self, test: PatientTestRef) {
        self.patient_tests.write().push(test);
    }

    pub fn random_patient_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let ids = self.patient_ids.read();
        if ids.is_empty() {
            return None;
        }
        Some(ids[rng.gen_range(0..ids.len())].clone())
    }

    pub fn random_test<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PatientTestRef> {
        let tests = self.patient_tests.read();
        if tests.is_empty() {
            return None;
        }
        Some(tests[rng.gen_range(0..tests.len())].clone())
    }

    pub fn has_patients(&self) -> bool {
        !self.patient_ids.read().is_empty()
    }

    pub fn patient_count(&self) -> usize {
        self.patient_ids.read().len()
    }

    pub fn test_count(&self) -> usize {
        self.patient_tests.read().len()
    }

    pub fn patient_ids(&self) -> Vec<String> {
        self.patient_ids.read().clone()
    }

    pub fn patient_tests(&self) -> Vec<PatientTestRef> {
        self.patient_tests.read().clone()
    }
}
