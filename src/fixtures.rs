//! # Random Fixtures
//!
//! Synthetic request bodies for the patient API. Values are random but always
//! pass the API's validation rules:
//!
//! - names are uppercase ASCII, last names carry an `LT_` marker so load-test
//!   data can be told apart from real records
//! - date of birth is `YYYY-MM-DD` between 1920 and 2019, day capped at 27
//! - post codes are four digits, phone and insurance numbers ten digits
//!
//! Every generator takes an explicit RNG so a seeded virtual user produces a
//! reproducible stream of fixtures.

use chrono::{DateTime, Utc};
use rand::seq::IteratorRandom;
use rand::Rng;
use strum::IntoEnumIterator;
use serde_json::{json, Value};

use crate::domain::{DiagnosticTest, Gender, Observation, Patient};

pub const RANDOM_STRING_LEN: usize = 6;
pub const LAST_NAME_PREFIX: &str = "LT_";

/// Uppercase ASCII string of `len` characters.
pub fn random_string<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| rng.gen_range(b'A'..=b'Z') as char).collect()
}

/// Ten-digit numeric string.
pub fn random_digits<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(1_000_000_000u64..10_000_000_000).to_string()
}

fn random_date_of_birth<R: Rng + ?Sized>(rng: &mut R) -> String {
    let year = rng.gen_range(1920..2020);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..28);
    format!("{year:04}-{month:02}-{day:02}")
}

pub fn random_patient<R: Rng + ?Sized>(rng: &mut R) -> Patient {
    let first_name = random_string(rng, RANDOM_STRING_LEN);
    let last_name = format!("{LAST_NAME_PREFIX}{}", random_string(rng, RANDOM_STRING_LEN));
    Patient {
        id: None,
        full_name: format!("{first_name} {last_name}"),
        first_name,
        last_name,
        gender: Gender::iter().choose(rng).unwrap_or(Gender::Unknown),
        date_of_birth: random_date_of_birth(rng),
        post_code: rng.gen_range(1000..=9999).to_string(),
        insurance_number: random_digits(rng),
        preferred_contact_number: random_digits(rng),
    }
}

/// Test for `patient_id` with a single observation issued now.
pub fn random_test<R: Rng + ?Sized>(rng: &mut R, patient_id: &str) -> DiagnosticTest {
    random_test_issued_at(rng, patient_id, Utc::now())
}

pub fn random_test_issued_at<R: Rng + ?Sized>(
    rng: &mut R,
    patient_id: &str,
    issued: DateTime<Utc>,
) -> DiagnosticTest {
    DiagnosticTest {
        id: None,
        patient_id: patient_id.to_string(),
        performer: random_string(rng, RANDOM_STRING_LEN),
        order_reference: random_string(rng, RANDOM_STRING_LEN),
        observations: vec![Observation {
            id: random_string(rng, RANDOM_STRING_LEN),
            code: random_string(rng, RANDOM_STRING_LEN),
            measurement: random_string(rng, RANDOM_STRING_LEN),
            interpretation: random_string(rng, RANDOM_STRING_LEN),
            issued,
            status: random_string(rng, RANDOM_STRING_LEN),
        }],
    }
}

pub fn generate_random_patient() -> Patient {
    random_patient(&mut rand::thread_rng())
}

pub fn generate_random_test(patient_id: &str) -> DiagnosticTest {
    random_test(&mut rand::thread_rng(), patient_id)
}

/// Create body missing every required field but `lastName`; the API answers 400.
pub fn invalid_patient() -> Value {
    json!({ "lastName": "LT" })
}
