use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use jot_core::{Category, CategoryFilter, SignInFailureMode};

#[derive(Parser)]
#[command(name = "jot")]
#[command(about = "Keep personal, work and other notes on a remote notes service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name (backend URLs and stored session)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and show the dashboard
    #[command(alias = "login")]
    Signin {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long, value_name = "NAME")]
        full_name: String,
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Forget the stored session for this profile
    #[command(alias = "logout")]
    Signout,
    /// List notes
    #[command(alias = "ls")]
    List {
        /// Only show notes in this category
        #[arg(short, long, value_enum, default_value_t = FilterArg::All)]
        category: FilterArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new note
    #[command(alias = "new")]
    Add {
        #[arg(short, long)]
        title: String,
        /// Note body (read from piped stdin when omitted)
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short = 'k', long, value_enum, default_value_t = CategoryArg::Personal)]
        category: CategoryArg,
    },
    /// Edit an existing note; opens $EDITOR on the body when no field is given
    Edit {
        /// Note ID
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short = 'k', long, value_enum)]
        category: Option<CategoryArg>,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or edit the account
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CategoryArg {
    Personal,
    Work,
    Other,
}

impl From<CategoryArg> for Category {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Personal => Self::Personal,
            CategoryArg::Work => Self::Work,
            CategoryArg::Other => Self::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum FilterArg {
    All,
    Personal,
    Work,
    Other,
}

impl From<FilterArg> for CategoryFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => Self::All,
            FilterArg::Personal => Self::Only(Category::Personal),
            FilterArg::Work => Self::Only(Category::Work),
            FilterArg::Other => Self::Only(Category::Other),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum FailureModeArg {
    Silent,
    Generic,
}

impl From<FailureModeArg> for SignInFailureMode {
    fn from(value: FailureModeArg) -> Self {
        match value {
            FailureModeArg::Silent => Self::Silent,
            FailureModeArg::Generic => Self::Generic,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the signed-in account
    Show,
    /// Update full name and/or email
    Edit {
        #[arg(long, value_name = "NAME")]
        full_name: Option<String>,
        #[arg(long, value_name = "EMAIL")]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// Base URL of the notes service
        #[arg(long, value_name = "URL")]
        notes_api_url: Option<String>,
        /// Base URL of the account service
        #[arg(long, value_name = "URL")]
        account_api_url: Option<String>,
        /// How a rejected sign-in is reported
        #[arg(long, value_enum)]
        sign_in_failure: Option<FailureModeArg>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Show the effective configuration
    Show,
}
