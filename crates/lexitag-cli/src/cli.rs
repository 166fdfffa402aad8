use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lexitag")]
#[command(about = "Tag free-text records against editable term dictionaries", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// Config file (defaults to the platform config dir).
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Annotate a CSV with one detection column per dictionary.
    Classify {
        input: PathBuf,
        /// Output CSV path.
        #[arg(short, long, default_value = "classified_data.csv")]
        output: PathBuf,
        /// Column holding the text to classify.
        #[arg(long)]
        text_column: Option<String>,
        /// Also write match counts and matched terms per dictionary.
        #[arg(long)]
        detail: bool,
        /// Shard records across worker threads.
        #[arg(long)]
        parallel: bool,
        /// Print a per-record breakdown with matched terms.
        #[arg(long)]
        report: bool,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        dicts: DictArgs,
    },

    /// List dictionaries and their terms.
    Dictionaries {
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        dicts: DictArgs,
    },

    /// Classify a single text against every dictionary.
    Check {
        text: String,
        #[command(flatten)]
        dicts: DictArgs,
    },
}

#[derive(Args)]
pub(crate) struct DictArgs {
    /// Add or replace a dictionary from a term file: NAME=PATH (repeatable).
    #[arg(long = "dict", value_name = "NAME=PATH", value_parser = parse_dict_arg)]
    pub(crate) dicts: Vec<(String, PathBuf)>,
    /// Skip the built-in dictionaries.
    #[arg(long)]
    pub(crate) no_defaults: bool,
}

fn parse_dict_arg(raw: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got '{raw}'"))?;
    if path.trim().is_empty() {
        return Err(format!("missing path in '{raw}'"));
    }
    Ok((name.to_string(), PathBuf::from(path)))
}
