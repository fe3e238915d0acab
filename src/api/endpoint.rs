use reqwest::Method;
use std::fmt;
use strum::EnumIter;

/// Target API endpoints. Each maps to a fixed method and a request name that
/// statistics are grouped by, so `patient/3f1c…` and `patient/9ab0…` land in the
/// same bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum Endpoint {
    Echo,
    CreatePatient,
    LoadPatient,
    UpdatePatient,
    SearchPatient,
    CreateTest,
    LoadTests,
    LoadTest,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Echo | Endpoint::LoadPatient | Endpoint::LoadTests | Endpoint::LoadTest => {
                Method::GET
            }
            Endpoint::CreatePatient | Endpoint::SearchPatient | Endpoint::CreateTest => Method::POST,
            Endpoint::UpdatePatient => Method::PUT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Echo => "echo/resource",
            Endpoint::CreatePatient => "patient/",
            Endpoint::LoadPatient | Endpoint::UpdatePatient => "patient/{id}",
            Endpoint::SearchPatient => "patient/search",
            Endpoint::CreateTest => "patient/{id}/tests",
            Endpoint::LoadTests => "patient/{id}/tests/",
            Endpoint::LoadTest => "patient/{pid}/tests/{tid}",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.name())
    }
}
