use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ecocharge",
    about = "EcoCharge - campus EV charging admin console",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, env = "ECOCHARGE_API_URL", help = "Base URL of the EcoCharge API")]
    pub api_url: Option<String>,

    #[arg(long, global = true, env = "ECOCHARGE_FEED_URL", help = "Base URL of the change feed")]
    pub feed_url: Option<String>,

    #[arg(long, global = true, env = "ECOCHARGE_DATA_DIR", help = "Directory for config and session")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Output as JSON")]
    pub json: bool,

    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in as an administrator")]
    Login {
        #[arg(short, long, help = "Admin username")]
        username: String,

        #[arg(short, long, env = "ECOCHARGE_PASSWORD", hide_env_values = true, help = "Password (prompted if omitted)")]
        password: Option<String>,
    },

    #[command(about = "Forget the cached admin session")]
    Logout,

    #[command(about = "Show the signed-in admin and login cooldown")]
    Whoami,

    #[command(subcommand, about = "Reset a forgotten password with an emailed code")]
    Password(PasswordCommands),

    #[command(subcommand, about = "View or edit the admin profile")]
    Profile(ProfileCommands),

    #[command(subcommand, about = "Change admin username or password")]
    Account(AccountCommands),

    #[command(about = "Run SQL on the diagnostic console (interactive if no query given)")]
    Sql {
        #[arg(help = "Statement to run")]
        query: Option<String>,
    },

    #[command(about = "Send a message through the contact form")]
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        subject: Option<String>,

        #[arg(short, long)]
        message: String,
    },

    #[command(subcommand, about = "Submit, edit and list station ratings")]
    Rating(RatingCommands),

    #[command(subcommand, about = "File and list problem reports")]
    Report(ReportCommands),

    #[command(subcommand, about = "Charging devices and their locations")]
    Devices(DeviceCommands),

    #[command(about = "Follow live changes to ratings or devices")]
    Watch {
        #[arg(value_enum)]
        collection: WatchTarget,
    },

    #[command(subcommand, about = "View and modify client configuration")]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum PasswordCommands {
    #[command(about = "Email a verification code")]
    SendOtp {
        #[arg(long)]
        email: String,
    },

    #[command(about = "Check a verification code")]
    VerifyOtp {
        #[arg(long)]
        email: String,

        #[arg(long)]
        otp: String,
    },

    #[command(about = "Set a new password using a verified code")]
    Reset {
        #[arg(long)]
        email: String,

        #[arg(long)]
        otp: String,

        #[arg(long, help = "New password (prompted if omitted)")]
        new_password: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    #[command(about = "Show the current profile")]
    Show,

    #[command(about = "Update profile fields")]
    Update {
        #[arg(long)]
        full_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    #[command(about = "Rename the signed-in admin")]
    ChangeUsername {
        #[arg(help = "New username")]
        new_username: String,

        #[arg(long, help = "Current password (prompted if omitted)")]
        current_password: Option<String>,
    },

    #[command(about = "Change the signed-in admin's password (prompts for both)")]
    ChangePassword,
}

#[derive(Args, Clone)]
pub struct RatingArgs {
    #[arg(long, help = "Name shown with the rating")]
    pub name: String,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub stars: u8,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long, help = "Station the rating is for")]
    pub station: Option<String>,

    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Subcommand)]
pub enum RatingCommands {
    #[command(about = "Submit a rating")]
    Submit(RatingArgs),

    #[command(about = "Edit an existing rating")]
    Edit {
        #[arg(help = "Rating id")]
        id: String,

        #[command(flatten)]
        rating: RatingArgs,
    },

    #[command(about = "List all ratings")]
    List,

    #[command(about = "Average and star distribution")]
    Summary,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(about = "Report a problem at a station")]
    Submit {
        #[arg(long)]
        name: String,

        #[arg(long, help = "e.g. charger, parking, payment")]
        category: String,

        #[arg(short, long)]
        description: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        location: Option<String>,
    },

    #[command(about = "List reports (admin)")]
    List,
}

#[derive(Subcommand)]
pub enum DeviceCommands {
    #[command(about = "List devices with coordinates")]
    List,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "Set a configuration value")]
    Set {
        #[arg(help = "Configuration key (base_url, feed_url, timeout_secs)")]
        key: String,

        #[arg(help = "New value")]
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum WatchTarget {
    Ratings,
    Devices,
}
