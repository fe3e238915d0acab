use rand::rngs::StdRng;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use strum::{Display, EnumIter};

use super::outcome::{Branch, Expectation, TaskOutcome};
use crate::api::{Endpoint, PatientApiClient};
use crate::domain::PatientSearch;
use crate::fixtures;
use crate::state::{PatientTestRef, ScenarioState};

/// Id used wherever a request must reference something that does not exist.
pub const INVALID_ID: &str = "1";

const CREATED: Expectation = Expectation::valid(StatusCode::CREATED);
const OK: Expectation = Expectation::valid(StatusCode::OK);
const REJECTED: Expectation = Expectation::invalid(StatusCode::BAD_REQUEST);
const NOT_FOUND: Expectation = Expectation::invalid(StatusCode::NOT_FOUND);

/// Per virtual user execution context.
pub struct UserContext {
    pub user_id: usize,
    pub client: PatientApiClient,
    pub state: Arc<ScenarioState>,
    pub rng: StdRng,
}

#[derive(Deserialize)]
struct CreatedPatient {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedTest {
    patient_id: String,
    id: String,
}

/// Every task a virtual user can run. The variant name is reported as the
/// task name in failure diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum TaskKind {
    EchoTask,
    CreateValidPatient,
    CreateInvalidPatient,
    LoadValidPatient,
    LoadInvalidPatient,
    UpdatePatientTask,
    SearchPatientWithId,
    SearchAllPatients,
    CreateValidTest,
    CreateInvalidTest,
    LoadTestsWithValidPatient,
    LoadTestsWithInvalidPatient,
    LoadTestWithValidTest,
    LoadTestWithInvalidTest,
    /// Keeps a composite set selectable before any sub-task has state to work with.
    Noop,
}

impl TaskKind {
    pub fn branch(&self) -> Branch {
        match self {
            TaskKind::CreateInvalidPatient
            | TaskKind::LoadInvalidPatient
            | TaskKind::CreateInvalidTest
            | TaskKind::LoadTestsWithInvalidPatient
            | TaskKind::LoadTestWithInvalidTest => Branch::Invalid,
            _ => Branch::Valid,
        }
    }

    pub async fn run(self, ctx: &mut UserContext) -> TaskOutcome {
        match self {
            TaskKind::EchoTask => {
                let result = ctx.client.echo().await;
                TaskOutcome::completed(OK.classify(self, Endpoint::Echo, &result))
            }
            TaskKind::CreateValidPatient => self.create_valid_patient(ctx).await,
            TaskKind::CreateInvalidPatient => {
                let result = ctx.client.create_patient(&fixtures::invalid_patient()).await;
                TaskOutcome::completed(REJECTED.classify(self, Endpoint::CreatePatient, &result))
            }
            TaskKind::LoadValidPatient => {
                let Some(id) = ctx.state.random_patient_id(&mut ctx.rng) else {
                    return TaskOutcome::Skipped;
                };
                let result = ctx.client.load_patient(&id).await;
                TaskOutcome::completed(OK.classify(self, Endpoint::LoadPatient, &result))
            }
            TaskKind::LoadInvalidPatient => {
                let result = ctx.client.load_patient(INVALID_ID).await;
                TaskOutcome::completed(NOT_FOUND.classify(self, Endpoint::LoadPatient, &result))
            }
            TaskKind::UpdatePatientTask => self.update_patient(ctx).await,
            TaskKind::SearchPatientWithId => {
                let Some(id) = ctx.state.random_patient_id(&mut ctx.rng) else {
                    return TaskOutcome::Skipped;
                };
                let result = ctx.client.search_patients(&PatientSearch::by_id(id)).await;
                TaskOutcome::completed(OK.classify(self, Endpoint::SearchPatient, &result))
            }
            TaskKind::SearchAllPatients => {
                if !ctx.state.has_patients() {
                    return TaskOutcome::Skipped;
                }
                let result = ctx.client.search_patients(&PatientSearch::all()).await;
                TaskOutcome::completed(OK.classify(self, Endpoint::SearchPatient, &result))
            }
            TaskKind::CreateValidTest => self.create_valid_test(ctx).await,
            TaskKind::CreateInvalidTest => {
                let test = fixtures::random_test(&mut ctx.rng, INVALID_ID);
                let result = ctx.client.create_test(&test).await;
                TaskOutcome::completed(REJECTED.classify(self, Endpoint::CreateTest, &result))
            }
            TaskKind::LoadTestsWithValidPatient => {
                let Some(test) = ctx.state.random_test(&mut ctx.rng) else {
                    return TaskOutcome::Skipped;
                };
                let result = ctx.client.load_tests(&test.patient_id).await;
                TaskOutcome::completed(OK.classify(self, Endpoint::LoadTests, &result))
            }
            TaskKind::LoadTestsWithInvalidPatient => {
                let result = ctx.client.load_tests(INVALID_ID).await;
                TaskOutcome::completed(NOT_FOUND.classify(self, Endpoint::LoadTests, &result))
            }
            TaskKind::LoadTestWithValidTest => {
                let Some(test) = ctx.state.random_test(&mut ctx.rng) else {
                    return TaskOutcome::Skipped;
                };
                let result = ctx.client.load_test(&test.patient_id, &test.id).await;
                TaskOutcome::completed(OK.classify(self, Endpoint::LoadTest, &result))
            }
            TaskKind::LoadTestWithInvalidTest => {
                let Some(test) = ctx.state.random_test(&mut ctx.rng) else {
                    return TaskOutcome::Skipped;
                };
                let result = ctx.client.load_test(&test.patient_id, INVALID_ID).await;
                TaskOutcome::completed(NOT_FOUND.classify(self, Endpoint::LoadTest, &result))
            }
            TaskKind::Noop => TaskOutcome::Completed(Vec::new()),
        }
    }

    async fn create_valid_patient(self, ctx: &mut UserContext) -> TaskOutcome {
        let patient = fixtures::random_patient(&mut ctx.rng);
        let result = ctx.client.create_patient(&patient).await;
        let record = CREATED.classify(self, Endpoint::CreatePatient, &result);
        let Ok(response) = &result else {
            return TaskOutcome::completed(record);
        };
        if !record.is_success() {
            return TaskOutcome::completed(record);
        }

        match response.json::<CreatedPatient>() {
            Ok(created) => {
                ctx.state.record_patient(created.id);
                TaskOutcome::completed(record)
            }
            Err(_) => TaskOutcome::completed(
                record.fail(Some(response.status), response.body.clone()),
            ),
        }
    }

    async fn create_valid_test(self, ctx: &mut UserContext) -> TaskOutcome {
        let Some(patient_id) = ctx.state.random_patient_id(&mut ctx.rng) else {
            return TaskOutcome::Skipped;
        };
        let test = fixtures::random_test(&mut ctx.rng, &patient_id);
        let result = ctx.client.create_test(&test).await;
        let record = CREATED.classify(self, Endpoint::CreateTest, &result);
        let Ok(response) = &result else {
            return TaskOutcome::completed(record);
        };
        if !record.is_success() {
            return TaskOutcome::completed(record);
        }

        match response.json::<CreatedTest>() {
            Ok(created) => {
                ctx.state.record_test(PatientTestRef {
                    patient_id: created.patient_id,
                    id: created.id,
                });
                TaskOutcome::completed(record)
            }
            Err(_) => TaskOutcome::completed(
                record.fail(Some(response.status), response.body.clone()),
            ),
        }
    }

    /// GET an existing patient, refresh its contact number and PUT it back.
    /// The PUT is only sent after a 200 GET.
    async fn update_patient(self, ctx: &mut UserContext) -> TaskOutcome {
        let Some(id) = ctx.state.random_patient_id(&mut ctx.rng) else {
            return TaskOutcome::Skipped;
        };
        let loaded = ctx.client.load_patient(&id).await;
        let load_record = OK.classify(self, Endpoint::LoadPatient, &loaded);
        let Ok(response) = &loaded else {
            return TaskOutcome::completed(load_record);
        };
        if !load_record.is_success() {
            return TaskOutcome::completed(load_record);
        }

        let mut patient = match response.json::<Value>() {
            Ok(Value::Object(patient)) => patient,
            _ => {
                return TaskOutcome::completed(
                    load_record.fail(Some(response.status), response.body.clone()),
                )
            }
        };
        patient.insert(
            "preferredContactNumber".to_string(),
            Value::String(fixtures::random_digits(&mut ctx.rng)),
        );

        let updated = ctx.client.update_patient(&id, &patient).await;
        let update_record = OK.classify(self, Endpoint::UpdatePatient, &updated);
        TaskOutcome::Completed(vec![load_record, update_record])
    }
}
