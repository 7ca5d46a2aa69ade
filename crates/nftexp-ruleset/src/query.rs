//! The seam to the ruleset query engine.
//!
//! [`RulesetQuery`] abstracts "run `list ruleset` and hand back whatever
//! the engine said". [`NftCli`] implements it by spawning the `nft`
//! binary; tests inject in-process fakes.

use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{RulesetError, RulesetResult};

/// Boxed future returned by [`RulesetQuery::list_ruleset`].
pub type QueryFuture<'a> = Pin<Box<dyn Future<Output = RulesetResult<QueryOutput>> + Send + 'a>>;

/// Raw reply of one engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutput {
    /// Exit status; `0` means success. `-1` when the engine was killed by a signal.
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl QueryOutput {
    /// A successful reply carrying `stdout`.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed reply with the given status and diagnostic.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Something that can list the complete ruleset.
///
/// Implementations hold only read-only configuration, so one instance is
/// shared by every concurrent scrape.
pub trait RulesetQuery: Send + Sync {
    /// Run one `list ruleset` query.
    ///
    /// Returns `Err` only when the engine could not be run at all; a
    /// non-zero engine status is reported through [`QueryOutput::status`].
    fn list_ruleset(&self) -> QueryFuture<'_>;
}

/// Engine invocation settings.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Path to the `nft` binary.
    pub program: PathBuf,
    /// Arguments placed before the query arguments, for wrappers such as
    /// `ip netns exec <ns> nft` or `sudo -n nft`.
    pub leading_args: Vec<OsString>,
    /// Upper bound on a single query.
    pub timeout: Duration,
}

impl QueryConfig {
    /// JSON output with numeric protocols. Service names, reverse DNS and
    /// stateless mode stay off: counters are included and no lookups happen.
    pub const QUERY_ARGS: [&'static str; 4] = ["--json", "--numeric-protocol", "list", "ruleset"];

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(Self::QUERY_ARGS)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("nft"),
            leading_args: Vec::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Queries the ruleset by running the `nft` command-line tool.
#[derive(Debug, Clone)]
pub struct NftCli {
    config: QueryConfig,
}

impl NftCli {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    async fn run(&self) -> RulesetResult<QueryOutput> {
        let mut cmd = self.config.command();
        debug!(command = ?cmd.as_std(), "querying ruleset");

        let spawn_err = |source| RulesetError::Spawn {
            program: self.config.program.clone(),
            source,
        };

        let child = cmd.spawn().map_err(spawn_err)?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| RulesetError::Timeout(self.config.timeout))?
            .map_err(spawn_err)?;

        let reply = QueryOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(status = reply.status, stdout = %reply.stdout, "ruleset query finished");
        Ok(reply)
    }
}

impl RulesetQuery for NftCli {
    fn list_ruleset(&self) -> QueryFuture<'_> {
        Box::pin(self.run())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Runs `script` through `sh -c`; the query arguments land in `$0..$3`.
    fn shell(script: &str) -> NftCli {
        NftCli::new(QueryConfig::new("sh").with_leading_args(["-c", script]))
    }

    #[test]
    fn default_config_targets_nft() {
        let config = QueryConfig::default();
        assert_eq!(config.program, PathBuf::from("nft"));
        assert!(config.leading_args.is_empty());
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn query_args_request_json_without_lookups() {
        let args = QueryConfig::QUERY_ARGS;
        assert!(args.contains(&"--json"));
        assert!(args.contains(&"--numeric-protocol"));
        assert!(!args.contains(&"--stateless"));
        assert!(!args.contains(&"--reversedns"));
        assert!(!args.contains(&"--service"));
        assert_eq!(&args[2..], ["list", "ruleset"]);
    }

    #[test]
    fn command_places_leading_args_first() {
        let config = QueryConfig::new("ip").with_leading_args(["netns", "exec", "fw", "nft"]);
        let cmd = config.command();
        let args: Vec<_> = cmd.as_std().get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            ["netns", "exec", "fw", "nft", "--json", "--numeric-protocol", "list", "ruleset"]
        );
    }

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let cli = shell(r#"printf '%s' '{"nftables": []}'"#);
        let out = cli.list_ruleset().await.unwrap();
        assert_eq!(out.status, 0);
        assert_eq!(out.stdout, r#"{"nftables": []}"#);
    }

    #[tokio::test]
    async fn receives_query_arguments() {
        let cli = shell(r#"printf '%s %s %s' "$1" "$2" "$3""#);
        let out = cli.list_ruleset().await.unwrap();
        assert_eq!(out.stdout, "--numeric-protocol list ruleset");
    }

    #[tokio::test]
    async fn reports_nonzero_status_and_stderr() {
        let cli = shell("echo 'Operation not permitted' >&2; exit 1");
        let out = cli.list_ruleset().await.unwrap();
        assert_eq!(out.status, 1);
        assert_eq!(out.stderr.trim(), "Operation not permitted");
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let cli = NftCli::new(QueryConfig::new("/nonexistent/nft"));
        let err = cli.list_ruleset().await.unwrap_err();
        assert!(matches!(err, RulesetError::Spawn { .. }));
    }

    #[tokio::test]
    async fn slow_query_times_out() {
        let cli = NftCli::new(
            QueryConfig::new("sh")
                .with_leading_args(["-c", "exec sleep 5"])
                .with_timeout(Duration::from_millis(100)),
        );
        let err = cli.list_ruleset().await.unwrap_err();
        assert!(matches!(err, RulesetError::Timeout(_)));
    }
}
