use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Diagnostic test attached to a patient, created through `patient/{id}/tests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticTest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_id: String,
    pub performer: String,
    pub order_reference: String,
    pub observations: Vec<Observation>,
}

/// Single observation embedded in a [`DiagnosticTest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub id: String,
    pub code: String,
    pub measurement: String,
    pub interpretation: String,
    #[serde(with = "utc_seconds")]
    pub issued: DateTime<Utc>,
    pub status: String,
}

/// Issued timestamps go out as `YYYY-MM-DDTHH:MM:SSZ` and are read back as any RFC 3339 value.
mod utc_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_issued_is_second_precision_utc() {
        let obs = Observation {
            id: "A".into(),
            code: "B".into(),
            measurement: "C".into(),
            interpretation: "D".into(),
            issued: Utc.with_ymd_and_hms(2020, 4, 30, 12, 5, 9).unwrap(),
            status: "E".into(),
        };
        let value = serde_json::to_value(&obs).unwrap();
        assert_eq!(value["issued"], "2020-04-30T12:05:09Z");
    }

    #[test]
    fn test_server_response_round_trips_into_model() {
        let test: DiagnosticTest = serde_json::from_value(json!({
            "id": "t-1",
            "patientId": "p-1",
            "performer": "PERF",
            "orderReference": "ORD",
            "observations": [{
                "id": "O", "code": "C", "measurement": "M", "interpretation": "I",
                "issued": "2020-04-30T12:05:09.000Z", "status": "S"
            }],
            "lastUpdated": "2020-04-30T12:05:10.000Z"
        }))
        .unwrap();
        assert_eq!(test.id.as_deref(), Some("t-1"));
        assert_eq!(test.patient_id, "p-1");
        assert_eq!(test.observations.len(), 1);
    }

    #[test]
    fn test_create_body_omits_id() {
        let test = DiagnosticTest {
            id: None,
            patient_id: "1".into(),
            performer: "P".into(),
            order_reference: "O".into(),
            observations: vec![],
        };
        let value = serde_json::to_value(&test).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["patientId"], "1");
        assert_eq!(value["orderReference"], "O");
    }
}
