use std::env;

use log::info;

use crate::cache::{EmissionCache, PriceCache};
use crate::config::{load_config, Config};
use crate::errors::MyGridInitError;
use crate::logging::setup_logger;
use crate::manager_mail::Mail;
use crate::upstream::carbon_intensity::CarbonIntensity;
use crate::upstream::nordpool::NordPool;

/// Holds every long-lived, initialized collaborator a run needs: the two
/// upstream clients, the caches they backfill, and mail notification.
pub struct Mgr {
    pub nordpool: NordPool,
    pub carbon_intensity: CarbonIntensity,
    pub price_cache: PriceCache,
    pub emission_cache: EmissionCache,
    pub mail: Mail,
}

/// Initializes and returns configuration and a Mgr struct holding the
/// various initialized collaborators.
///
pub fn init() -> Result<(Config, Mgr), MyGridInitError> {
    let args: Vec<String> = env::args().collect();
    let config_path = args
        .iter()
        .find(|p| p.starts_with("--config="))
        .ok_or(MyGridInitError("config file argument should be present".into()))?;
    let config_path = config_path
        .split_once('=')
        .ok_or(MyGridInitError("config file argument should be correct".into()))?
        .1;

    // Load configuration
    let config = load_config(config_path).map_err(|e| MyGridInitError(e.to_string()))?;

    // Setup logging
    setup_logger(&config.general.log_path, config.general.log_level, config.general.log_to_stdout)
        .map_err(|e| MyGridInitError(e.to_string()))?;

    // Print version
    info!("starting load scheduler version: {}", env!("CARGO_PKG_VERSION"));

    // Instantiate collaborators
    let nordpool = NordPool::new(config.nordpool.delivery_area.clone(), config.nordpool.currency.clone())?;
    let carbon_intensity =
        CarbonIntensity::new(config.carbon_intensity.host.clone(), config.carbon_intensity.port, config.carbon_intensity.zone.clone())?;
    let price_cache = PriceCache::new();
    let emission_cache = EmissionCache::new();
    let mail = Mail::new(&config.mail)?;

    let mgr = Mgr { nordpool, carbon_intensity, price_cache, emission_cache, mail };

    Ok((config, mgr))
}
