use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use userpass_core::VERSION;

/// Userpass - credentials kept in one encrypted file per host, merged on read
#[derive(Parser)]
#[command(name = "userpass")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the per-host source files
    #[arg(short, long, global = true, env = "USERPASS_DIR")]
    pub dir: Option<String>,

    /// Host whose source file receives writes (defaults to this machine)
    #[arg(long, global = true, env = "USERPASS_HOST")]
    pub host: Option<String>,

    /// Read only these source files instead of discovering them
    #[arg(short, long = "source", value_name = "PATH", global = true)]
    pub sources: Vec<String>,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,

    /// Skip the keychain and ask for the passphrase
    #[arg(long, global = true)]
    pub no_agent: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Key pattern (regex; all keys when omitted)
    #[arg(value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Match the key exactly instead of as a regex
    #[arg(long)]
    pub exact: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Key pattern (regex)
    #[arg(value_name = "PATTERN")]
    pub pattern: String,

    /// Match the key exactly instead of as a regex
    #[arg(long)]
    pub exact: bool,

    /// Show every record, including colliding and older ones
    #[arg(short, long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Where a new password comes from
#[derive(Args)]
#[group(multiple = false)]
pub struct PasswordArgs {
    /// Password to store (prompted when neither this nor --generate is given)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Generate a random password
    #[arg(short, long)]
    pub generate: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Key (site or account name)
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Username (prompted when omitted)
    #[arg(short, long)]
    pub username: Option<String>,

    #[command(flatten)]
    pub password: PasswordArgs,

    /// Length of a generated password
    #[arg(long, default_value_t = userpass_core::generate::DEFAULT_LENGTH)]
    pub length: usize,
}

/// Arguments for the `update` command
#[derive(Args)]
pub struct UpdateArgs {
    /// Key pattern; must match exactly one key
    #[arg(value_name = "PATTERN")]
    pub pattern: String,

    /// Match the key exactly instead of as a regex
    #[arg(long)]
    pub exact: bool,

    /// Replace the username too
    #[arg(short, long)]
    pub username: Option<String>,

    #[command(flatten)]
    pub password: PasswordArgs,

    /// Length of a generated password
    #[arg(long, default_value_t = userpass_core::generate::DEFAULT_LENGTH)]
    pub length: usize,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List keys
    List(ListArgs),

    /// Show usernames and passwords for matching keys
    Show(ShowArgs),

    /// Add a credential to this host's file
    Add(AddArgs),

    /// Record a new password for an existing key
    Update(UpdateArgs),

    /// List the source files that would be read
    Sources,

    /// Print the effective configuration
    Config,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
