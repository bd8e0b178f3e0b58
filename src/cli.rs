use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "qpkginfo")]
#[command(version)]
#[command(about = "Show the qpkg.cfg metadata of a QNAP package, local or over HTTP", long_about = None)]
#[command(after_help = "Examples:\n  \
  qpkginfo Demo_1.0.qpkg                  print all KEY=value pairs\n  \
  qpkginfo Demo_1.0.qpkg QPKG_VER         print a single value\n  \
  qpkginfo -r https://example.com/x.qpkg  dump qpkg.cfg of a remote package")]
pub struct Cli {
    /// QPKG file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Keys to print (default: all)
    #[arg(value_name = "KEYS")]
    pub keys: Vec<String>,

    /// Print qpkg.cfg as stored in the package
    #[arg(short = 'r', long = "raw", conflicts_with_all = ["json", "keys"])]
    pub raw: bool,

    /// Print the parsed keys as JSON
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode, no transfer statistics
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    /// Default log filter for the selected verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
