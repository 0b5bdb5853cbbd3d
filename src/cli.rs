// nc_loader/src/cli.rs
// Command Line Interface (CLI) specific logic for nc_loader.

use std::path::PathBuf;

use clap::Parser;

use crate::config::LoaderConfig;

/// Streams delimited text files into MongoDB collections.
#[derive(Parser, Debug,)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file. Flags given on the command line take precedence.
    #[clap(long, env = "NC_LOADER_CONFIG")]
    pub config: Option<PathBuf,>,

    /// Connection string for MongoDB (overrides --host/--port)
    #[clap(long, env = "MONGO_URI")]
    pub uri: Option<String,>,

    /// MongoDB host
    #[clap(long)]
    pub host: Option<String,>,

    /// MongoDB port
    #[clap(long)]
    pub port: Option<u16,>,

    /// Target database name
    #[clap(long)]
    pub database: Option<String,>,

    /// Collection to source file mapping (e.g., --collection users:data/users.csv)
    #[clap(long = "collection", value_parser = parse_key_val)]
    pub collections: Vec<(String, PathBuf,),>,

    /// Only ingest these collections, in this order
    #[clap(long)]
    pub only: Vec<String,>,

    /// Drop each target collection before inserting
    #[clap(long)]
    pub clear: bool,

    /// Fields to keep, in output order (mutually exclusive with --exclude)
    #[clap(long, value_delimiter = ',')]
    pub include: Vec<String,>,

    /// Fields to remove (mutually exclusive with --include)
    #[clap(long, value_delimiter = ',')]
    pub exclude: Vec<String,>,

    /// Number of documents per bulk insert
    #[clap(long)]
    pub batch_size: Option<usize,>,

    /// Field delimiter (a single byte, or \t)
    #[clap(long)]
    pub delimiter: Option<String,>,

    /// Character encoding label of the source files (e.g., utf-8, latin1)
    #[clap(long)]
    pub encoding: Option<String,>,

    /// Line terminator: \n, \r, \r\n, lf, cr or crlf
    #[clap(long)]
    pub line_terminator: Option<String,>,

    /// Halt execution immediately when a collection fails.
    #[clap(long)]
    pub strict: bool,

    /// Generate a structured run summary report (ingestion_report.json) at the end.
    #[clap(long)]
    pub report: bool,
}

impl Cli {
    /// Applies command line values on top of a configuration loaded from file.
    pub fn apply(&self, mut config: LoaderConfig,) -> LoaderConfig {
        if let Some(uri,) = &self.uri {
            config.uri = Some(uri.clone(),);
        }
        if let Some(host,) = &self.host {
            config.host = host.clone();
        }
        if let Some(port,) = self.port {
            config.port = port;
        }
        if let Some(database,) = &self.database {
            config.database = database.clone();
        }
        for (name, path,) in &self.collections {
            config.collections.insert(name.clone(), path.clone(),);
        }
        if self.clear {
            config.clear_before_insert = true;
        }
        // A projection given on the command line replaces the file's projection entirely.
        if !self.include.is_empty() || !self.exclude.is_empty() {
            config.include = self.include.clone();
            config.exclude = self.exclude.clone();
        }
        if let Some(batch_size,) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(delimiter,) = &self.delimiter {
            config.text.delimiter = delimiter.clone();
        }
        if let Some(encoding,) = &self.encoding {
            config.text.encoding = encoding.clone();
        }
        if let Some(line_terminator,) = &self.line_terminator {
            config.text.line_terminator = line_terminator.clone();
        }
        config
    }

    /// Collections to ingest: `--only` order if given, otherwise every configured name.
    pub fn selected(&self, config: &LoaderConfig,) -> Vec<String,> {
        if self.only.is_empty() {
            config.collections.keys().cloned().collect()
        } else {
            self.only.clone()
        }
    }
}

/// Parse a single NAME:PATH pair
fn parse_key_val(s: &str,) -> Result<(String, PathBuf,), String,> {
    let pos = s
        .find(':',)
        .ok_or_else(|| format!("invalid NAME:PATH: no `:` found in `{}`", s),)?;
    if pos == 0 {
        return Err(format!("invalid NAME:PATH: empty collection name in `{}`", s),);
    }
    Ok((s[..pos].to_string(), PathBuf::from(&s[pos + 1..],),),)
}
