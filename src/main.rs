use rayon::ThreadPoolBuilder;
use anyhow::Result;
use log::error;
use crate::errors::SchedulingError;
use crate::initialization::init;
use crate::worker::run;

mod errors;
mod error;
mod manager_mail;
mod config;
mod initialization;
mod logging;
mod macros;
mod worker;

mod domain;
mod function;
mod task;
mod schedule;
mod scheduler;
mod recommender;
mod wire;
mod cache;
mod upstream;

fn main() -> Result<()> {
    ThreadPoolBuilder::new().num_threads(2).build_global()?;

    // Load config and set up all collaborators. If initialization fails, we are pretty much out
    // of luck and can't even log or send notification mail.
    let (config, mgr) = match init() {
        Ok((c, m)) => (c, m),
        Err(e) => {
            return Err(SchedulingError(format!("Initialization failed: {}", e)))?;
        }
    };

    // Run one scheduling pass
    match run(&mgr, &config) {
        Ok(_) => {
            mgr.mail.send_mail("Report".into(), "Successfully created new schedule".into())?;
        },
        Err(e) => {
            error!("Run failed: {}", e);
            mgr.mail.send_mail("Error in scheduler".into(), format!("Run failed: {}", e))?;
            return Err(e)?;
        }
    }

    Ok(())
}


