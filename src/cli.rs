use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

#[derive(Parser)]
#[command(name = "linear-connector")]
#[command(about = "Run Linear connector operations and trigger hooks from the shell", version)]
#[command(after_help = "EXAMPLES:
    linear-connector exec -r issues -p listIssues --param returnAll=true
    linear-connector exec --items items.json --continue-on-fail
    linear-connector trigger activate --url https://hooks.example.com/linear --event issueCreated
    linear-connector trigger deliver --event issueCreated --body payload.json")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, compact)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Show debug logs and the full error chain
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a resource operation over one or more items
    #[command(after_help = "EXAMPLES:
    linear-connector exec -r teams -p listTeams
    linear-connector exec -r issues -p getIssue --param issueId=ENG-123
    linear-connector exec -r issues -p listIssues --param 'filters={\"priority\":1}'
    linear-connector exec --items items.json --continue-on-fail")]
    Exec(ExecArgs),
    /// Manage the webhook behind a trigger and replay deliveries
    #[command(after_help = "EXAMPLES:
    linear-connector trigger status --url https://hooks.example.com/linear
    linear-connector trigger activate --url https://hooks.example.com/linear --event commentCreated --secret s3cret
    linear-connector trigger deactivate --url https://hooks.example.com/linear
    linear-connector trigger sign --body payload.json --secret s3cret")]
    Trigger {
        #[command(subcommand)]
        action: TriggerCommands,
    },
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    linear-connector completions bash > ~/.bash_completion.d/linear-connector
    linear-connector completions zsh > ~/.zfunc/_linear-connector")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    #[command(after_help = "EXAMPLES:
    linear-connector init")]
    Init,
}

#[derive(Args)]
pub struct ExecArgs {
    /// Resource name (e.g., issues, projectUpdates)
    #[arg(long, short, required_unless_present = "items")]
    pub resource: Option<String>,

    /// Operation name (e.g., listIssues)
    #[arg(long = "operation", short = 'p', required_unless_present = "items")]
    pub operation: Option<String>,

    /// Parameter as key=value; values that parse as JSON are used as JSON
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// JSON file with one parameter object per item
    #[arg(long, conflicts_with_all = ["resource", "operation", "params"])]
    pub items: Option<PathBuf>,

    /// Report failing items as `{error}` instead of stopping
    #[arg(long)]
    pub continue_on_fail: bool,
}

#[derive(Subcommand)]
pub enum TriggerCommands {
    /// Show whether a webhook is registered for the callback URL
    Status {
        /// Callback URL Linear delivers to
        #[arg(long)]
        url: String,
    },
    /// Register a webhook for the callback URL unless one exists
    Activate(ActivateArgs),
    /// Remove the registered webhook
    Deactivate {
        /// Callback URL Linear delivers to
        #[arg(long)]
        url: String,
    },
    /// Run a recorded delivery through the trigger
    Deliver(DeliverArgs),
    /// Print the signature Linear would send for a body
    Sign {
        /// File with the raw delivery body
        #[arg(long)]
        body: PathBuf,

        #[arg(long)]
        secret: String,
    },
}

#[derive(Args)]
pub struct ActivateArgs {
    /// Callback URL Linear delivers to
    #[arg(long)]
    pub url: String,

    /// Event to subscribe to (e.g., issueCreated)
    #[arg(long)]
    pub event: String,

    /// Team ID; all public teams when omitted
    #[arg(long)]
    pub team: Option<String>,

    /// Signing secret for deliveries
    #[arg(long)]
    pub secret: Option<String>,

    /// Webhook label shown in Linear
    #[arg(long)]
    pub label: Option<String>,
}

#[derive(Args)]
pub struct DeliverArgs {
    /// Event the trigger listens for
    #[arg(long)]
    pub event: String,

    /// File with the raw delivery body
    #[arg(long)]
    pub body: PathBuf,

    /// Value of the linear-signature header
    #[arg(long)]
    pub signature: Option<String>,

    #[arg(long)]
    pub secret: Option<String>,

    /// Accept deliveries without checking the signature
    #[arg(long)]
    pub no_verify: bool,
}
