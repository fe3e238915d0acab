//! # Scenario Model
//!
//! Weighted tasks against the patient tests API, the ids they share through
//! [`ScenarioState`], and the rules that classify each response.
//!
//! A harness only needs [`Scenario::user_context`] to set up a virtual user and
//! [`Scenario::run_weighted_task`] to drive it.

pub mod error;
pub mod outcome;
pub mod profile;
pub mod task_set;
pub mod tasks;

pub use error::ScenarioError;
pub use outcome::{Branch, Expectation, Failure, RequestRecord, TaskOutcome, Verdict};
pub use profile::Profile;
pub use task_set::{TaskEntry, TaskSet, TaskSetBuilder, WeightedEntry};
pub use tasks::{TaskKind, UserContext, INVALID_ID};

use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;

use crate::api::PatientApiClient;
use crate::state::ScenarioState;

pub struct Scenario {
    profile: Profile,
    task_set: TaskSet,
    client: PatientApiClient,
    state: Arc<ScenarioState>,
}

impl Scenario {
    pub fn new(
        profile: Profile,
        client: PatientApiClient,
        state: Arc<ScenarioState>,
    ) -> Result<Self, ScenarioError> {
        Ok(Self {
            profile,
            task_set: profile.task_set()?,
            client,
            state,
        })
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn task_set(&self) -> &TaskSet {
        &self.task_set
    }

    pub fn state(&self) -> &Arc<ScenarioState> {
        &self.state
    }

    /// Context for virtual user `user_id`. With a base seed every user gets its
    /// own deterministic stream, otherwise it is seeded from entropy.
    pub fn user_context(&self, user_id: usize, base_seed: Option<u64>) -> UserContext {
        let rng = match base_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(user_id as u64)),
            None => StdRng::from_entropy(),
        };
        UserContext {
            user_id,
            client: self.client.clone(),
            state: Arc::clone(&self.state),
            rng,
        }
    }

    /// Select one task by weight and run it.
    pub async fn run_weighted_task(&self, ctx: &mut UserContext) -> (TaskKind, TaskOutcome) {
        let task = self.task_set.pick(&mut ctx.rng);
        let outcome = task.run(ctx).await;
        (task, outcome)
    }
}
