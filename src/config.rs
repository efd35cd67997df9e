use clap::Parser;

/// Linktester — polls a cable/PoE tester until its diagnostic run
/// completes and prints the decoded report.
#[derive(Parser, Debug, Clone)]
#[command(name = "linktester")]
pub struct CliArgs {
    /// URL of the tester's status/report endpoint
    #[arg(default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Maximum number of poll attempts before giving up
    #[arg(short = 'a', long = "attempts", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub attempts: u32,

    /// Seconds to wait between poll attempts
    #[arg(short = 'i', long = "interval-secs", default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub interval_secs: u64,

    /// Absolute wall-clock bound in seconds for the whole poll (in addition
    /// to the attempt budget)
    #[arg(long = "deadline-secs")]
    pub deadline_secs: Option<u64>,

    /// Per-request HTTP timeout in seconds
    #[arg(long = "http-timeout-secs", default_value_t = HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,
}

// The tester's status endpoint when it joins as a DHCP client on its
// default management network.
pub const DEFAULT_ENDPOINT: &str = "http://172.16.9.9/linktest/report";

// Polling constants
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;
pub const HTTP_TIMEOUT_SECS: u64 = 5;
