use anyhow::{Context as _, Result};
use ecocharge_client::{default_data_dir, ClientConfig, EcoChargeClient};

use crate::cli::{
    AccountCommands, Cli, Commands, DeviceCommands, PasswordCommands, ProfileCommands,
    RatingCommands, ReportCommands, WatchTarget,
};
use crate::{
    admin_commands, auth_commands, config_commands, public_commands, watch_commands,
};

/// What every handler needs: the API client and the output mode.
pub struct Context {
    pub client: EcoChargeClient,
    pub json: bool,
}

/// Configuration from `config.json`, with flags and env vars layered on top.
fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir()?,
    };
    let mut config = ClientConfig::load(&data_dir)
        .with_context(|| format!("Failed to load configuration from {}", data_dir.display()))?;

    if let Some(url) = &cli.api_url {
        config.base_url = url.clone();
    }
    if let Some(url) = &cli.feed_url {
        config.feed_url = Some(url.clone());
    }
    config.normalize();
    config.check()?;
    Ok(config)
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    tracing::debug!(base_url = %config.base_url, "Using API");
    let client = EcoChargeClient::with_file_store(config).context("Failed to create API client")?;
    let ctx = Context { client, json: cli.json };

    match cli.command {
        Commands::Login { username, password } => {
            auth_commands::login(&ctx, username, password).await
        },
        Commands::Logout => auth_commands::logout(&ctx),
        Commands::Whoami => auth_commands::whoami(&ctx),
        Commands::Password(cmd) => match cmd {
            PasswordCommands::SendOtp { email } => auth_commands::send_otp(&ctx, email).await,
            PasswordCommands::VerifyOtp { email, otp } => {
                auth_commands::verify_otp(&ctx, email, otp).await
            },
            PasswordCommands::Reset { email, otp, new_password } => {
                auth_commands::reset_password(&ctx, email, otp, new_password).await
            },
        },
        Commands::Profile(cmd) => match cmd {
            ProfileCommands::Show => admin_commands::show_profile(&ctx).await,
            ProfileCommands::Update { full_name, email, phone } => {
                admin_commands::update_profile(&ctx, full_name, email, phone).await
            },
        },
        Commands::Account(cmd) => match cmd {
            AccountCommands::ChangeUsername { new_username, current_password } => {
                admin_commands::change_username(&ctx, new_username, current_password).await
            },
            AccountCommands::ChangePassword => admin_commands::change_password(&ctx).await,
        },
        Commands::Sql { query: Some(query) } => admin_commands::run_sql(&ctx, &query).await,
        Commands::Sql { query: None } => admin_commands::sql_console(&ctx).await,
        Commands::Contact { name, email, subject, message } => {
            public_commands::send_contact(&ctx, name, email, subject, message).await
        },
        Commands::Rating(cmd) => match cmd {
            RatingCommands::Submit(args) => public_commands::submit_rating(&ctx, args).await,
            RatingCommands::Edit { id, rating } => {
                public_commands::edit_rating(&ctx, &id, rating).await
            },
            RatingCommands::List => public_commands::list_ratings(&ctx).await,
            RatingCommands::Summary => public_commands::rating_summary(&ctx).await,
        },
        Commands::Report(cmd) => match cmd {
            ReportCommands::Submit { name, category, description, email, location } => {
                public_commands::submit_report(&ctx, name, category, description, email, location)
                    .await
            },
            ReportCommands::List => admin_commands::list_reports(&ctx).await,
        },
        Commands::Devices(DeviceCommands::List) => public_commands::list_devices(&ctx).await,
        Commands::Watch { collection: WatchTarget::Ratings } => {
            watch_commands::watch_ratings(&ctx).await
        },
        Commands::Watch { collection: WatchTarget::Devices } => {
            watch_commands::watch_devices(&ctx).await
        },
        Commands::Config(cmd) => config_commands::handle_config_command(cmd, &ctx),
    }
}
