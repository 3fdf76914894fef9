use std::io;

use anyhow::Context;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod console;
mod session;
mod view;

use appointment_cell::{AppointmentBookingService, FileAppointmentStore, SlotGrid, SystemClock};
use auth_cell::AccountStore;
use shared_config::AppConfig;

use crate::console::Console;
use crate::session::App;

fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Logs go to stderr so they never interleave with the menus
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Starting clinic appointment scheduler");

    let config = AppConfig::from_env();

    let grid = SlotGrid::from_config(&config).context("invalid business hours")?;
    let store = FileAppointmentStore::from_config(&config).context("invalid obfuscation shift")?;
    let booking = AppointmentBookingService::load(store, SystemClock, grid).with_context(|| {
        format!(
            "failed to load appointments from {}",
            config.appointments_path().display()
        )
    })?;

    let mut accounts = AccountStore::from_config(&config).with_context(|| {
        format!(
            "failed to load user accounts from {}",
            config.users_path().display()
        )
    })?;
    if accounts
        .ensure_admin(&config.admin_username, &config.admin_password)
        .context("failed to create the administrator account")?
    {
        println!(
            "No users found. Created administrator account '{}'.",
            config.admin_username
        );
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock());

    let mut app = App::new(accounts, booking);
    app.run(&mut console)?;

    info!("Scheduler exited");
    Ok(())
}
