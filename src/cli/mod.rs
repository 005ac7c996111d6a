use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "solar-api")]
#[command(about = "Solar panel asset management API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Bind address, overrides API_HOST")]
        host: Option<String>,

        #[arg(long, help = "Listen port, overrides API_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

impl Cli {
    pub fn effective_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve { host: None, port: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::parse_from(["solar-api"]);
        assert_eq!(cli.effective_command(), Commands::Serve { host: None, port: None });
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::parse_from(["solar-api", "serve", "--host", "0.0.0.0", "--port", "9000"]);
        assert_eq!(
            cli.effective_command(),
            Commands::Serve {
                host: Some("0.0.0.0".to_string()),
                port: Some(9000)
            }
        );
    }

    #[test]
    fn migrate_subcommand() {
        let cli = Cli::parse_from(["solar-api", "migrate"]);
        assert_eq!(cli.effective_command(), Commands::Migrate);
    }
}
