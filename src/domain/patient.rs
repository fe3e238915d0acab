use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Administrative gender accepted by the patient API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

/// Patient record as sent to and returned by `patient/`.
///
/// `id` is assigned by the server and must be absent on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub gender: Gender,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub post_code: String,
    pub insurance_number: String,
    pub preferred_contact_number: String,
}

/// Filter body for `patient/search`. An empty filter matches every patient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl PatientSearch {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn sample() -> Patient {
        Patient {
            id: None,
            first_name: "ABCDEF".into(),
            last_name: "LT_GHIJKL".into(),
            full_name: "ABCDEF LT_GHIJKL".into(),
            gender: Gender::Female,
            date_of_birth: "1984-03-07".into(),
            post_code: "2040".into(),
            insurance_number: "1234567890".into(),
            preferred_contact_number: "0987654321".into(),
        }
    }

    #[test]
    fn test_create_body_omits_id_and_uses_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["firstName"], "ABCDEF");
        assert_eq!(value["dateOfBirth"], "1984-03-07");
        assert_eq!(value["gender"], "female");
    }

    #[test]
    fn test_server_fields_are_tolerated() {
        let patient: Patient = serde_json::from_value(json!({
            "id": "3f1c5bde-51a4-4c3a-8d3e-7a4c2b1f9e00",
            "firstName": "A",
            "lastName": "B",
            "fullName": "A B",
            "gender": "unknown",
            "dateOfBirth": "1920-01-01",
            "postCode": "1000",
            "insuranceNumber": "1",
            "preferredContactNumber": "2",
            "lastUpdated": "2020-05-01T10:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(patient.id.as_deref(), Some("3f1c5bde-51a4-4c3a-8d3e-7a4c2b1f9e00"));
        assert_eq!(patient.gender, Gender::Unknown);
    }

    #[test]
    fn test_gender_strings() {
        assert_eq!(Gender::Other.to_string(), "other");
        assert_eq!(Gender::from_str("male").unwrap(), Gender::Male);
        assert!(Gender::from_str("robot").is_err());
    }

    #[test]
    fn test_search_filters() {
        assert_eq!(serde_json::to_value(PatientSearch::all()).unwrap(), json!({}));
        assert_eq!(
            serde_json::to_value(PatientSearch::by_id("abc")).unwrap(),
            json!({ "id": "abc" })
        );
    }
}
