use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::{ScenarioError, TaskKind, TaskSet};

/// Workload a run drives: one resource on its own, or the blended mix.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Profile {
    Echo,
    CreatePatient,
    LoadPatient,
    UpdatePatient,
    SearchPatient,
    CreateTest,
    LoadTests,
    LoadTest,
    All,
}

impl Profile {
    pub const RESOURCES: [Profile; 8] = [
        Profile::Echo,
        Profile::CreatePatient,
        Profile::LoadPatient,
        Profile::UpdatePatient,
        Profile::SearchPatient,
        Profile::CreateTest,
        Profile::LoadTests,
        Profile::LoadTest,
    ];

    pub fn task_set(&self) -> Result<TaskSet, ScenarioError> {
        let name = self.to_string();
        match self {
            Profile::Echo => TaskSet::builder(name).task(TaskKind::EchoTask).build(),
            Profile::CreatePatient => TaskSet::builder(name)
                .weighted_task(TaskKind::CreateValidPatient, 9)
                .weighted_task(TaskKind::CreateInvalidPatient, 1)
                .build(),
            Profile::LoadPatient => TaskSet::builder(name)
                .weighted_task(TaskKind::LoadValidPatient, 9)
                .weighted_task(TaskKind::LoadInvalidPatient, 1)
                .build(),
            Profile::UpdatePatient => TaskSet::builder(name)
                .task(TaskKind::UpdatePatientTask)
                .build(),
            Profile::SearchPatient => TaskSet::builder(name)
                .task(TaskKind::SearchPatientWithId)
                .task(TaskKind::SearchAllPatients)
                .build(),
            Profile::CreateTest => TaskSet::builder(name)
                .weighted_task(TaskKind::CreateValidTest, 9)
                .weighted_task(TaskKind::CreateInvalidTest, 1)
                .build(),
            Profile::LoadTests => TaskSet::builder(name)
                .weighted_task(TaskKind::LoadTestsWithValidPatient, 9)
                .weighted_task(TaskKind::LoadTestsWithInvalidPatient, 1)
                .build(),
            Profile::LoadTest => TaskSet::builder(name)
                .weighted_task(TaskKind::LoadTestWithValidTest, 9)
                .weighted_task(TaskKind::LoadTestWithInvalidTest, 1)
                .build(),
            Profile::All => {
                let mut builder = TaskSet::builder(name);
                for resource in Self::RESOURCES {
                    builder = builder.set(resource.task_set()?);
                }
                builder.task(TaskKind::Noop).build()
            }
        }
    }
}
