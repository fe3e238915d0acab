use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::scenario::Profile;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "PTLOAD__";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub target: TargetConfig,
    #[validate(nested)]
    pub load: LoadConfig,
    #[validate(nested)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TargetConfig {
    #[validate(length(min = 1))]
    pub base_url: String,
    /// Sent as `Ocp-Apim-Subscription-Key` on every request.
    pub subscription_key: String,
    #[validate(range(min = 1))]
    pub timeout_seconds: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7071/api".to_string(),
            subscription_key: String::new(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_load_timing"))]
pub struct LoadConfig {
    #[validate(range(min = 1))]
    pub users: usize,
    /// Virtual users started per second.
    #[validate(range(exclusive_min = 0.0))]
    pub spawn_rate: f64,
    #[validate(range(min = 1))]
    pub duration_seconds: u64,
    #[validate(range(min = 0.0))]
    pub wait_min_seconds: f64,
    #[validate(range(min = 0.0))]
    pub wait_max_seconds: f64,
    pub profile: Profile,
    pub random_seed: Option<u64>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            users: 10,
            spawn_rate: 1.0,
            duration_seconds: 60,
            wait_min_seconds: 1.0,
            wait_max_seconds: 5.0,
            profile: Profile::All,
            random_seed: None,
        }
    }
}

impl LoadConfig {
    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    pub fn think_time(&self) -> Result<ThinkTime> {
        Ok(ThinkTime::between(
            seconds("wait_min_seconds", self.wait_min_seconds)?,
            seconds("wait_max_seconds", self.wait_max_seconds)?,
        ))
    }

    /// Delay between two user starts.
    pub fn spawn_interval(&self) -> Result<Duration> {
        spawn_interval(self.spawn_rate)
    }
}

/// Time between two user starts at `spawn_rate` users per second.
pub fn spawn_interval(spawn_rate: f64) -> Result<Duration> {
    if spawn_rate.is_nan() || spawn_rate <= 0.0 {
        anyhow::bail!("spawn_rate must be positive, got {spawn_rate}");
    }
    seconds("spawn interval", 1.0 / spawn_rate)
}

fn seconds(field: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("{field} = {secs} is not a representable duration"))
}

fn validate_load_timing(load: &LoadConfig) -> Result<(), ValidationError> {
    let floats = [load.spawn_rate, load.wait_min_seconds, load.wait_max_seconds];
    if floats.iter().any(|v| !v.is_finite()) {
        return Err(ValidationError::new("spawn_rate and wait times must be finite"));
    }
    if load.wait_min_seconds > load.wait_max_seconds {
        return Err(ValidationError::new("wait_min_seconds must not exceed wait_max_seconds"));
    }
    if load.think_time().is_err() {
        return Err(ValidationError::new("wait times must fit in a duration"));
    }
    if load.spawn_interval().is_err() {
        return Err(ValidationError::new("spawn_rate is too small to schedule users"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportConfig {
    #[validate(range(min = 1))]
    pub interval_seconds: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { interval_seconds: 5 }
    }
}

/// Uniform think-time range between two consecutive tasks of a virtual user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkTime {
    pub min: Duration,
    pub max: Duration,
}

impl ThinkTime {
    pub fn between(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn none() -> Self {
        Self::between(Duration::ZERO, Duration::ZERO)
    }

    pub fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

impl Config {
    /// Defaults, then `config/default.toml` if present, then `PTLOAD__*` env vars.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        let cfg: Config = figment
            .extract()
            .with_context(|| format!("invalid configuration (file {})", path.display()))?;
        Ok(cfg)
    }

    pub fn validated(self) -> Result<Self> {
        self.validate().context("configuration rejected")?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = Config::default().validated().unwrap();
        assert_eq!(cfg.load.wait_min_seconds, 1.0);
        assert_eq!(cfg.load.wait_max_seconds, 5.0);
        assert_eq!(cfg.load.profile, Profile::All);
    }

    #[test]
    fn test_inverted_wait_range_is_rejected() {
        let mut cfg = Config::default();
        cfg.load.wait_min_seconds = 6.0;
        assert!(cfg.validated().is_err());
    }

    #[rstest]
    #[case::infinite_spawn_rate(f64::INFINITY, 1.0, 5.0)]
    #[case::nan_spawn_rate(f64::NAN, 1.0, 5.0)]
    #[case::tiny_spawn_rate(1e-30, 1.0, 5.0)]
    #[case::infinite_wait_max(1.0, 1.0, f64::INFINITY)]
    #[case::nan_wait_min(1.0, f64::NAN, 5.0)]
    #[case::nan_wait_max(1.0, 1.0, f64::NAN)]
    #[case::huge_wait_max(1.0, 1.0, 1e300)]
    fn test_unrepresentable_timings_are_rejected(
        #[case] spawn_rate: f64,
        #[case] wait_min: f64,
        #[case] wait_max: f64,
    ) {
        let mut cfg = Config::default();
        cfg.load.spawn_rate = spawn_rate;
        cfg.load.wait_min_seconds = wait_min;
        cfg.load.wait_max_seconds = wait_max;
        assert!(cfg.validated().is_err());
    }

    #[test]
    fn test_unvalidated_timings_error_instead_of_panicking() {
        let load = LoadConfig {
            spawn_rate: 1e-30,
            wait_max_seconds: f64::INFINITY,
            ..LoadConfig::default()
        };
        assert!(load.think_time().is_err());
        assert!(load.spawn_interval().is_err());
        assert!(spawn_interval(0.0).is_err());
        assert!(spawn_interval(-2.0).is_err());
        assert_eq!(spawn_interval(4.0).unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_default_think_time() {
        let think = LoadConfig::default().think_time().unwrap();
        assert_eq!(think.min, Duration::from_secs(1));
        assert_eq!(think.max, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_users_is_rejected() {
        let mut cfg = Config::default();
        cfg.load.users = 0;
        assert!(cfg.validated().is_err());
    }

    #[test]
    fn test_file_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "loadtest.toml",
                r#"
                [target]
                base_url = "https://apim.example.org/v1"

                [load]
                users = 25
                profile = "create-patient"
                "#,
            )?;
            jail.set_env("PTLOAD__TARGET__SUBSCRIPTION_KEY", "secret");
            jail.set_env("PTLOAD__LOAD__DURATION_SECONDS", "120");

            let cfg = Config::load_from(Path::new("loadtest.toml")).unwrap();
            assert_eq!(cfg.target.base_url, "https://apim.example.org/v1");
            assert_eq!(cfg.target.subscription_key, "secret");
            assert_eq!(cfg.load.users, 25);
            assert_eq!(cfg.load.duration_seconds, 120);
            assert_eq!(cfg.load.profile, Profile::CreatePatient);
            assert_eq!(cfg.report.interval_seconds, 5);
            Ok(())
        });
    }

    #[test]
    fn test_think_time_stays_in_range() {
        let think = ThinkTime::between(Duration::from_secs(1), Duration::from_secs(5));
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let d = think.sample(&mut rng);
            assert!(d >= Duration::from_secs(1) && d <= Duration::from_secs(5));
        }
        assert_eq!(ThinkTime::none().sample(&mut rng), Duration::ZERO);
    }
}
