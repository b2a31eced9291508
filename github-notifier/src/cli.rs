use std::path::PathBuf;

use clap::Parser;

const HELP_EPILOG: &str = r#"Config resolution order:
  1) --config/-c PATH
  2) $GITHUB_NOTIFIER_CONFIG
  3) platform default: ~/.config/github-notifier/config.yaml (optional)

Environment:
  GITHUB_TOKEN            token; falls back to ~/.github_token
  GITHUB_NOTIFIER_FILTER  only alert for repositories whose full name starts with this
"#;

#[derive(Debug, Parser)]
#[command(
    name = "github-notifier",
    version,
    about = "Desktop alerts for new GitHub notifications",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
