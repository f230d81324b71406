use std::path::PathBuf;

use clap::Parser;
use tributario_core::TableSource;
use tributario_data::{FileSource, UrlSource};

/// Simples Nacional vs. Lucro Presumido comparison service.
///
/// Loads a tax table bundle at startup and serves the comparison over HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "tributario-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Table bundle loaded at startup: a JSON/CSV file path or an http(s) URL.
    #[arg(long, env = "TRIBUTARIO_TABLES", default_value = "config/sample_tables.json")]
    pub tables: String,

    /// Log filter: a level ("info", "debug") or any EnvFilter directive.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Also append log records to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Source for the startup bundle, chosen by the shape of `--tables`.
    pub fn table_source(&self) -> Box<dyn TableSource> {
        if self.tables.starts_with("http://") || self.tables.starts_with("https://") {
            Box::new(UrlSource::new(&self.tables))
        } else {
            Box::new(FileSource::new(&self.tables))
        }
    }
}
