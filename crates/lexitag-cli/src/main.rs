mod cli;
mod report;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use lexitag_core::config::AppConfig;
use lexitag_core::{detect, AnnotateOptions, Dataset, DictionaryStore, LexitagError, Session};

use crate::cli::{Cli, Command, DictArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "lexitag=debug,lexitag_core=debug"
    } else {
        "lexitag=info,lexitag_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), LexitagError> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Command::Classify {
            input,
            output,
            text_column,
            detail,
            parallel,
            report: show_report,
            json,
            dicts,
        } => {
            let store = build_store(&config, &dicts)?;
            let mut options = AnnotateOptions::from_config(&config);
            if let Some(column) = text_column {
                options.text_column = column;
            }
            options.detail |= detail;
            if parallel && options.parallel_chunk.is_none() {
                options.parallel_chunk = Some(config.annotation.chunk_size.max(1));
            }

            let dataset = Dataset::from_csv_path(&input)?;
            info!(path = %input.display(), records = dataset.len(), "Loaded dataset");

            let dictionaries = store.snapshot();
            let text_column = options.text_column.clone();
            let mut session = Session::new(store, options);
            let outcome = session.run(&dataset)?;
            outcome.annotated.to_csv_path(&output)?;

            if json {
                print_json(&outcome.summary)?;
            } else {
                print!("{}", report::summary(&outcome.summary));
                if show_report {
                    println!();
                    print!(
                        "{}",
                        report::details(
                            outcome,
                            &dictionaries,
                            &text_column,
                            config.dataset.id_column.as_deref(),
                        )
                    );
                }
                println!();
                println!("Results saved to: {}", output.display());
            }
            Ok(())
        }
        Command::Dictionaries { json, dicts } => {
            let store = build_store(&config, &dicts)?;
            if json {
                print_json(&store.list())?;
            } else {
                for dict in store.list() {
                    println!("{} ({} terms)", dict.name(), dict.terms().len());
                    for term in dict.terms().iter() {
                        println!("  {term}");
                    }
                }
            }
            Ok(())
        }
        Command::Check { text, dicts } => {
            let store = build_store(&config, &dicts)?;
            for dict in store.list() {
                let detection = detect(Some(text.as_str()), dict.terms());
                if detection.flag() == 1 {
                    println!("{}: 1 ({})", dict.name(), detection.matches().join(", "));
                } else {
                    println!("{}: 0", dict.name());
                }
            }
            Ok(())
        }
    }
}

/// Seed built-ins (unless disabled), then apply config sources and `--dict`
/// files in that order. A later dictionary with the same name replaces an
/// earlier one.
fn build_store(config: &AppConfig, args: &DictArgs) -> Result<DictionaryStore, LexitagError> {
    let mut store = DictionaryStore::new();
    if config.dictionaries.seed_defaults && !args.no_defaults {
        store.initialize();
    }

    let sources = config
        .dictionaries
        .sources
        .iter()
        .map(|s| (s.name.as_str(), s.path.as_path()))
        .chain(args.dicts.iter().map(|(n, p)| (n.as_str(), p.as_path())));
    for (raw_name, path) in sources {
        let name = load_dictionary(&mut store, raw_name, path)?;
        debug!(name = %name, path = %path.display(), "Loaded dictionary");
    }

    Ok(store)
}

fn load_dictionary(
    store: &mut DictionaryStore,
    raw_name: &str,
    path: &Path,
) -> Result<String, LexitagError> {
    let blob = std::fs::read_to_string(path)?;
    store.create(raw_name, &blob)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), LexitagError> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(dicts: Vec<(String, PathBuf)>, no_defaults: bool) -> DictArgs {
        DictArgs { dicts, no_defaults }
    }

    #[test]
    fn test_build_store_defaults_then_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tier.txt");
        std::fs::write(&path, "foo\nbar\nfoo\n").unwrap();

        let store = build_store(
            &AppConfig::default(),
            &args(vec![("New Tier!!".into(), path)], false),
        )
        .unwrap();
        let names: Vec<&str> = store.list().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["urgency_marketing", "exclusive_marketing", "new_tier__"]);
        assert_eq!(store.get("new_tier__").unwrap().terms().len(), 2);
    }

    #[test]
    fn test_build_store_without_defaults() {
        let store = build_store(&AppConfig::default(), &args(vec![], true)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_build_store_missing_file() {
        let err = build_store(
            &AppConfig::default(),
            &args(vec![("x".into(), PathBuf::from("/nonexistent/terms.txt"))], false),
        )
        .unwrap_err();
        assert!(matches!(err, LexitagError::Io(_)));
    }

    #[test]
    fn test_build_store_rejects_blank_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt");
        std::fs::write(&path, "foo").unwrap();
        let err = build_store(&AppConfig::default(), &args(vec![("  ".into(), path)], false))
            .unwrap_err();
        assert!(matches!(err, LexitagError::Validation(_)));
    }
}
