use chrono::NaiveDate;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

/// The dataset blob is several times larger than the file it came from, so the JSON
/// routes that carry it back accept this multiple of the upload limit.
pub const DATASET_BODY_FACTOR: usize = 8;

/// Command-line flags, each backed by a `DASHBOARD_*` environment variable
///
/// A flag given on the command line wins over its environment variable.
#[derive(Parser, Debug, Default)]
#[command(name = "dashboard", about = "Interactive sales data dashboard server")]
pub struct DashboardArgs {
    /// Address to bind
    #[arg(long, env = "DASHBOARD_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "DASHBOARD_PORT")]
    pub port: Option<u16>,

    /// Verbose logging
    #[arg(
        long,
        env = "DASHBOARD_DEBUG",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,

    /// Run mode; turns debug off even when the environment enables it
    #[arg(long)]
    pub run: bool,

    /// Largest accepted upload body in bytes
    #[arg(long = "max-upload", value_name = "BYTES", env = "DASHBOARD_MAX_UPLOAD")]
    pub max_upload: Option<usize>,

    /// Directory served under /static
    #[arg(long = "static-dir", value_name = "PATH", env = "DASHBOARD_STATIC_DIR")]
    pub static_dir: Option<String>,
}

/// Server settings
///
/// Built from defaults, then [`DashboardArgs`].
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,

    /// Debug mode: verbose logging
    pub debug: bool,

    /// Initial value of the page's date range picker
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,

    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,

    /// Directory served under `/static`
    pub static_dir: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            debug: false,
            default_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            default_end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
            max_upload_bytes: 16 * 1024 * 1024,
            static_dir: "static".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by the process arguments and environment
    ///
    /// Invalid values stop the process with a usage message.
    pub fn load() -> Self {
        Self::from_args(DashboardArgs::parse())
    }

    pub fn from_args(args: DashboardArgs) -> Self {
        let mut config = Self::default();

        if let Some(host) = args.host {
            config.host = host;
        }
        if let Some(port) = args.port {
            config.port = port;
        }
        if let Some(limit) = args.max_upload {
            config.max_upload_bytes = limit;
        }
        if let Some(dir) = args.static_dir {
            config.static_dir = dir;
        }
        config.debug = args.debug && !args.run;

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Body limit for the routes that carry the dataset blob
    pub fn dataset_body_limit(&self) -> usize {
        self.max_upload_bytes.saturating_mul(DATASET_BODY_FACTOR)
    }

    /// Logger filter used when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}
