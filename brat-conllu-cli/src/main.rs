//! Batch converter from brat to CoNLL-U.
//!
//! Usage:
//!   brat-conllu --root data_UD --ud-table ud_pos.txt
//!   brat-conllu --config brat-conllu.toml --exclude data_UD/am/draft --verbose
//!
//! Settings come from the config file (default `brat-conllu.toml` if present),
//! and command line flags override them. Log level follows `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use brat_conllu::{run_batch, ConvertConfig, Converter, UdTagTable, UnresolvedPolicy, DEFAULT_CONFIG_FILE};

/// Convert brat `.txt`/`.ann` pairs under a directory into `.conllu` files
#[derive(Parser, Debug)]
#[command(name = "brat-conllu")]
#[command(about = "Convert brat annotations into CoNLL-U treebanks")]
struct Args {
    /// Configuration file
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory searched for .txt files
    #[arg(long, short = 'r')]
    root: Option<PathBuf>,

    /// POS to UD tag table
    #[arg(long, short = 'u')]
    ud_table: Option<PathBuf>,

    /// Document to skip, by stem or path without extension (can be repeated)
    #[arg(long, short = 'x')]
    exclude: Vec<String>,

    /// Fail a document when a token span matches no token
    #[arg(long)]
    abort_on_unresolved: bool,

    /// Print every converted document
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<ConvertConfig, brat_conllu::ConvertError> {
        let mut config = ConvertConfig::load(&self.config)?;

        if let Some(root) = self.root {
            config.root_dir = root;
        }
        if let Some(ud_table) = self.ud_table {
            config.ud_table = ud_table;
        }
        config.exclude.extend(self.exclude);
        if self.abort_on_unresolved {
            config.unresolved = UnresolvedPolicy::Abort;
        }
        config.verbose |= self.verbose;

        Ok(config)
    }
}

/// `RUST_LOG` when set and valid, `info` otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return ExitCode::from(2);
        }
    };

    let table = match UdTagTable::load(&config.ud_table) {
        Ok(table) => table,
        Err(err) => {
            error!("{}", err);
            return ExitCode::from(2);
        }
    };

    let converter = Converter::new(table)
        .with_policy(config.unresolved)
        .with_verbose(config.verbose);

    match run_batch(&converter, &config) {
        Ok(report) => {
            for (path, err) in &report.failed {
                eprintln!("FAILED {}: {}", path.display(), err);
            }
            eprintln!(
                "{} converted, {} skipped, {} failed",
                report.converted.len(),
                report.skipped.len(),
                report.failed.len()
            );
            ExitCode::from(report.exit_code() as u8)
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config_defaults() {
        let args = Args::parse_from([
            "brat-conllu",
            "--config",
            "/nonexistent/brat-conllu.toml",
            "--root",
            "corpus",
            "--exclude",
            "draft",
            "--exclude",
            "corpus/old",
            "--abort-on-unresolved",
        ]);

        let config = args.into_config().unwrap();
        assert_eq!(config.root_dir, PathBuf::from("corpus"));
        assert_eq!(config.ud_table, PathBuf::from("ud_pos.txt"));
        assert_eq!(config.exclude, vec!["draft".to_string(), "corpus/old".to_string()]);
        assert_eq!(config.unresolved, UnresolvedPolicy::Abort);
        assert!(!config.verbose);
    }

    #[test]
    fn test_log_filter_follows_rust_log() {
        std::env::set_var("RUST_LOG", "warn");
        assert_eq!(log_filter().to_string(), "warn");

        std::env::set_var("RUST_LOG", "brat_conllu=debug");
        assert_eq!(log_filter().to_string(), "brat_conllu=debug");

        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter().to_string(), "info");
    }

    #[test]
    fn test_args_are_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
