use std::fmt;
use std::fmt::Formatter;

use crate::cache::CacheError;
use crate::error::EngineError;
use crate::manager_mail::errors::MailError;
use crate::upstream::carbon_intensity::CarbonIntensityError;
use crate::upstream::nordpool::NordPoolError;


/// Error depicting errors that occur during initialization of the main program
///
#[derive(Debug)]
pub struct MyGridInitError(pub String);

impl fmt::Display for MyGridInitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "MyGridInitError: {}", self.0)
    }
}
impl std::error::Error for MyGridInitError {}
impl From<ConfigError> for MyGridInitError {
    fn from(e: ConfigError) -> Self {
        MyGridInitError(e.to_string())
    }
}
impl From<MailError> for MyGridInitError {
    fn from(e: MailError) -> Self { MyGridInitError(e.to_string()) }
}
impl From<NordPoolError> for MyGridInitError {
    fn from(e: NordPoolError) -> Self { MyGridInitError(e.to_string()) }
}
impl From<CarbonIntensityError> for MyGridInitError {
    fn from(e: CarbonIntensityError) -> Self { MyGridInitError(e.to_string()) }
}
impl From<&str> for MyGridInitError {
    fn from(e: &str) -> Self { MyGridInitError(e.to_string()) }
}


/// Error depicting errors that occur while running the main program
///
#[derive(Debug)]
pub struct MyGridWorkerError(pub String);

impl fmt::Display for MyGridWorkerError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "MyGridWorkerError: {}", self.0)
    }
}
impl std::error::Error for MyGridWorkerError {}
impl From<SchedulingError> for MyGridWorkerError {
    fn from(e: SchedulingError) -> Self {
        MyGridWorkerError(e.to_string())
    }
}
impl From<WireError> for MyGridWorkerError {
    fn from(e: WireError) -> Self {
        MyGridWorkerError(e.to_string())
    }
}
impl From<MailError> for MyGridWorkerError {
    fn from(e: MailError) -> Self {
        MyGridWorkerError(e.to_string())
    }
}
impl From<EngineError> for MyGridWorkerError {
    fn from(e: EngineError) -> Self {
        MyGridWorkerError(e.to_string())
    }
}
impl From<CacheError> for MyGridWorkerError {
    fn from(e: CacheError) -> Self {
        MyGridWorkerError(e.to_string())
    }
}
impl From<NordPoolError> for MyGridWorkerError {
    fn from(e: NordPoolError) -> Self {
        MyGridWorkerError(e.to_string())
    }
}
impl From<CarbonIntensityError> for MyGridWorkerError {
    fn from(e: CarbonIntensityError) -> Self {
        MyGridWorkerError(e.to_string())
    }
}
impl From<&str> for MyGridWorkerError {
    fn from(e: &str) -> Self { MyGridWorkerError(e.to_string()) }
}


/// Error depicting errors that occur while doing config operations
///
#[derive(Debug)]
pub struct ConfigError(String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}
impl std::error::Error for ConfigError {}
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<log4rs::config::runtime::ConfigErrors> for ConfigError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self { ConfigError(e.to_string()) }
}
impl From<log::SetLoggerError> for ConfigError {
    fn from(e: log::SetLoggerError) -> Self { ConfigError(e.to_string()) }
}

/// Error depicting errors that occur while building or recommending a schedule
///
#[derive(Debug)]
pub struct SchedulingError(pub String);

impl fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "SchedulingError: {}", self.0)
    }
}
impl From<&str> for SchedulingError {
    fn from(e: &str) -> Self {
        SchedulingError(e.to_string())
    }
}
impl From<EngineError> for SchedulingError {
    fn from(e: EngineError) -> Self {
        SchedulingError(e.to_string())
    }
}
impl From<CacheError> for SchedulingError {
    fn from(e: CacheError) -> Self {
        SchedulingError(e.to_string())
    }
}
impl From<NordPoolError> for SchedulingError {
    fn from(e: NordPoolError) -> Self {
        SchedulingError(e.to_string())
    }
}
impl From<CarbonIntensityError> for SchedulingError {
    fn from(e: CarbonIntensityError) -> Self {
        SchedulingError(e.to_string())
    }
}
impl From<WireError> for SchedulingError {
    fn from(e: WireError) -> Self {
        SchedulingError(e.to_string())
    }
}
impl std::error::Error for SchedulingError {}

/// Error depicting errors that occur while reading or writing the request/response wire files
///
#[derive(Debug)]
pub struct WireError(pub String);

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "WireError: {}", self.0)
    }
}
impl From<std::io::Error> for WireError {
    fn from(e: std::io::Error) -> Self {
        WireError(e.to_string())
    }
}
impl From<serde_json::Error> for WireError {
    fn from(e: serde_json::Error) -> Self {
        WireError(e.to_string())
    }
}
impl std::error::Error for WireError {}

