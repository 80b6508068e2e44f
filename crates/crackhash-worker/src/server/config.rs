use anyhow::bail;
use clap::Parser;
use core::time::Duration;

/// Runtime configuration for the `crackhash-worker` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first), with defaults suitable for a single node on
/// a developer machine.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "crackhash-worker",
    version,
    about = "A worker node that brute-forces MD5 hashes over rank ranges"
)]
pub struct CliArgs {
    /// Base URL of the manager this worker registers with and reports to.
    ///
    /// `http://` is assumed when no scheme is given.
    ///
    /// Environment variable: `MANAGER_ADDRESS`
    #[arg(long, env = "MANAGER_ADDRESS")]
    pub manager_address: String,

    /// Address to listen on for task submissions.
    ///
    /// Environment variable: `HOST`
    #[arg(long, env = "HOST", default_value_t = String::from("0.0.0.0"))]
    pub host: String,

    /// Port to listen on. Also reported to the manager at registration.
    ///
    /// Environment variable: `PORT`
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Number of pool threads searching parts concurrently.
    ///
    /// Every task is split into exactly this many parts, so it should match
    /// the number of cores the worker may use.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS", default_value_t = num_cpus::get())]
    pub num_workers: usize,

    /// Deadline for searching a single part. A part that runs out of time is
    /// reported as failed and its whole task is dropped.
    ///
    /// Environment variable: `PART_TIMEOUT_SECS`
    #[arg(long, env = "PART_TIMEOUT_SECS", default_value_t = 60)]
    pub part_timeout_secs: u64,

    /// Upper bound on graceful shutdown after a termination signal.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT_SECS`
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,

    /// Timeout for each request sent to the manager.
    ///
    /// Environment variable: `REQUEST_TIMEOUT_SECS`
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub manager_address: String,
    pub host: String,
    pub port: u16,
    pub num_workers: usize,
    pub part_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub request_timeout: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.num_workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        if args.part_timeout_secs == 0 {
            bail!("PART_TIMEOUT_SECS must be greater than 0");
        }

        let manager_address = args.manager_address.trim().trim_end_matches('/');
        if manager_address.is_empty() {
            bail!("MANAGER_ADDRESS must not be empty");
        }
        let manager_address = if manager_address.contains("://") {
            manager_address.to_string()
        } else {
            format!("http://{manager_address}")
        };

        Ok(Self {
            manager_address,
            host: args.host,
            port: args.port,
            num_workers: args.num_workers,
            part_timeout: Duration::from_secs(args.part_timeout_secs),
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout_secs),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<ServerConfig> {
        let args = CliArgs::try_parse_from(["crackhash-worker"].iter().chain(args))?;
        ServerConfig::try_from(args)
    }

    #[test]
    fn defaults_are_valid() {
        let config = parse(&["--manager-address", "manager:8080"]).unwrap();
        assert!(config.num_workers > 0);
        assert!(config.part_timeout > Duration::ZERO);
    }

    #[test]
    fn manager_address_gets_scheme() {
        let config = parse(&["--manager-address", "manager:8080"]).unwrap();
        assert_eq!(config.manager_address, "http://manager:8080");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let config = parse(&["--manager-address", "https://manager.internal/"]).unwrap();
        assert_eq!(config.manager_address, "https://manager.internal");
    }

    #[test]
    fn rejects_zero_workers() {
        let err = parse(&["--manager-address", "m", "--num-workers", "0"]).unwrap_err();
        assert!(err.to_string().contains("NUM_WORKERS"));
    }

    #[test]
    fn rejects_zero_part_timeout() {
        let err = parse(&["--manager-address", "m", "--part-timeout-secs", "0"]).unwrap_err();
        assert!(err.to_string().contains("PART_TIMEOUT_SECS"));
    }
}
