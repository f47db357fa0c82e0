//! `user-directory` entry point: wires settings, adapters, and the terminal
//! session, then runs one subcommand.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use clap::Parser;
use client::config::ClientSettings;
use client::inbound::cli::{Cli, Session};
use client::outbound::http::HttpUserApi;
use client::outbound::notifications::NotificationCentre;
use client::outbound::runtime::TokioSleeper;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let mut settings = ClientSettings::load_from_iter([OsString::from("user-directory")])
        .map_err(|error| eyre!("load settings: {error}"))?;
    cli.apply_overrides(&mut settings);

    let base_url = settings.api_base_url()?;
    let api = HttpUserApi::with_timeout(base_url, settings.request_timeout())
        .wrap_err("build user api client")?;
    let notifications = Arc::new(NotificationCentre::with_ttl(
        Arc::new(DefaultClock),
        settings.notification_ttl(),
    ));

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;

    let stdin = io::stdin();
    let mut session = Session::new(
        Arc::new(api),
        Arc::new(TokioSleeper),
        notifications,
        settings.form_config(),
        stdin.lock(),
        io::stdout(),
        io::stderr(),
    );
    runtime.block_on(session.run(cli.command))?;
    Ok(())
}
