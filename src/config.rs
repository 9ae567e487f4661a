// Command line / environment configuration for the binaries.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Paralympics web server
#[derive(Debug, Clone, Parser)]
#[command(name = "paralympics-server", version, about = "Paralympics regions and events web app")]
pub struct ParalympicsConfig {
    /// SQLite database file (created if missing)
    #[arg(long, env = "PARALYMPICS_DB", default_value = "paralympics.db")]
    pub db: PathBuf,

    /// Address to listen on
    #[arg(long, env = "PARALYMPICS_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,
}

/// Iris prediction web server
#[derive(Debug, Clone, Parser)]
#[command(name = "iris-server", version, about = "Iris species prediction web app")]
pub struct IrisConfig {
    /// SQLite database file (created if missing)
    #[arg(long, env = "IRIS_DB", default_value = "iris.db")]
    pub db: PathBuf,

    /// Address to listen on
    #[arg(long, env = "IRIS_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Classifier artifact (JSON); the bundled model is used when omitted
    #[arg(long, env = "IRIS_MODEL", requires = "encoder")]
    pub model: Option<PathBuf>,

    /// Label encoder (JSON) matching the classifier
    #[arg(long, env = "IRIS_ENCODER", requires = "model")]
    pub encoder: Option<PathBuf>,
}

/// Data import CLI
#[derive(Debug, Parser)]
#[command(name = "paralympics-iris", version, about = "Load data into the app databases")]
pub struct Cli {
    /// SQLite database file to write to
    #[arg(long, env = "PARALYMPICS_IRIS_DB", default_value = "paralympics.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the tables and report row counts
    Init,

    /// Import regions from a CSV with NOC,region,notes columns
    ImportRegions { csv: PathBuf },

    /// Import Games editions from a CSV
    ImportEvents { csv: PathBuf },

    /// Import labelled iris measurements from a CSV
    ImportIris { csv: PathBuf },

    /// Create a login for the Iris app
    CreateUser { email: String, password: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paralympics_flags() {
        let config = ParalympicsConfig::try_parse_from([
            "paralympics-server",
            "--db",
            "/tmp/para.db",
            "--bind",
            "0.0.0.0:8080",
        ])
        .unwrap();

        assert_eq!(config.db, PathBuf::from("/tmp/para.db"));
        assert_eq!(config.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_iris_model_needs_encoder() {
        let result = IrisConfig::try_parse_from(["iris-server", "--model", "m.json"]);
        assert!(result.is_err());

        let config = IrisConfig::try_parse_from([
            "iris-server",
            "--model",
            "m.json",
            "--encoder",
            "e.json",
        ])
        .unwrap();
        assert_eq!(config.model, Some(PathBuf::from("m.json")));
        assert_eq!(config.encoder, Some(PathBuf::from("e.json")));
    }

    #[test]
    fn test_cli_subcommands() {
        let cli = Cli::try_parse_from([
            "paralympics-iris",
            "--db",
            "x.db",
            "import-regions",
            "data/noc_regions.csv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::ImportRegions { .. }));

        let cli = Cli::try_parse_from([
            "paralympics-iris",
            "create-user",
            "ada@example.com",
            "secret",
        ])
        .unwrap();
        match cli.command {
            Command::CreateUser { email, password } => {
                assert_eq!(email, "ada@example.com");
                assert_eq!(password, "secret");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_definitions_are_consistent() {
        use clap::CommandFactory;

        Cli::command().debug_assert();
        ParalympicsConfig::command().debug_assert();
        IrisConfig::command().debug_assert();
    }
}
