use std::fs;

use anyhow::Result;
use log::LevelFilter;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct NordPool {
    pub delivery_area: String,
    pub currency: String,
}

#[derive(Deserialize)]
pub struct CarbonIntensity {
    pub host: String,
    pub port: u16,
    pub zone: String,
}

/// Day-ahead release rule (spec.md §6, §9): spot prices are published once
/// per calendar day at `release_hour` UTC. The source carries two
/// inconsistent hard-coded hours for this; this crate takes it from
/// config instead of guessing which one is right.
#[derive(Deserialize)]
pub struct Horizon {
    pub release_hour: u32,
    pub price_extend_by_minutes: i64,
    pub emission_extend_by_minutes: i64,
}

#[derive(Deserialize)]
pub struct MaxPermutationTasks {
    pub max_tasks: usize,
}

#[derive(Deserialize)]
pub struct MailParameters {
    pub smtp_user: String,
    pub smtp_password: String,
    pub smtp_endpoint: String,
    pub from: String,
    pub to: String,
}

#[derive(Deserialize)]
pub struct Files {
    pub request_path: String,
    pub response_path: String,
}

#[derive(Deserialize)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize)]
pub struct Config {
    pub nordpool: NordPool,
    pub carbon_intensity: CarbonIntensity,
    pub horizon: Horizon,
    pub scheduling: MaxPermutationTasks,
    pub mail: MailParameters,
    pub files: Files,
    pub general: General,
}

/// Loads the configuration file and returns a struct with all configuration items.
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config> {
    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;

    Ok(config)
}
