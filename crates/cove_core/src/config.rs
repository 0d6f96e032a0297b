use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::account::AccountId;

pub const DEFAULT_ROLE_NAME: &str = "OrganizationAccountAccessRole";
pub const DEFAULT_PARTITION: &str = "aws";
pub const DEFAULT_WORKERS: usize = 20;

/// Scheduling strategy used for both session acquisition and execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerKind {
    #[default]
    Pooled,
    Sequential,
    Streaming,
}

impl RunnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pooled => "pooled",
            Self::Sequential => "sequential",
            Self::Streaming => "streaming",
        }
    }
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunnerKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "pooled" | "pool" | "threaded" => Ok(Self::Pooled),
            "sequential" | "mono" => Ok(Self::Sequential),
            "streaming" | "stream" => Ok(Self::Streaming),
            _ => Err(format!(
                "Unsupported runner '{raw}' (expected pooled, sequential, or streaming)"
            )),
        }
    }
}

/// Parameters of one fan-out run.
///
/// `target_ids: None` means "every active account of the organization except
/// the caller's own". Role names are resolved at call time, so no process-wide
/// defaults are mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoveConfig {
    pub target_ids: Option<Vec<AccountId>>,
    pub ignore_ids: Option<Vec<String>>,
    pub role_name: Option<String>,
    pub role_session_name: Option<String>,
    pub partition: String,
    /// Abort the whole run on the first operation error.
    pub raise_exception: bool,
    /// Enrich records with directory metadata (requires organization read access).
    pub org_master: bool,
    pub session_workers: usize,
    pub operation_workers: usize,
    pub runner: RunnerKind,
    pub show_progress: bool,
}

impl Default for CoveConfig {
    fn default() -> Self {
        Self {
            target_ids: None,
            ignore_ids: None,
            role_name: None,
            role_session_name: None,
            partition: DEFAULT_PARTITION.to_string(),
            raise_exception: false,
            org_master: true,
            session_workers: DEFAULT_WORKERS,
            operation_workers: DEFAULT_WORKERS,
            runner: RunnerKind::default(),
            show_progress: false,
        }
    }
}

impl CoveConfig {
    pub fn resolved_role_name(&self) -> &str {
        self.role_name.as_deref().unwrap_or(DEFAULT_ROLE_NAME)
    }

    /// Falls back to the role name when no session name is configured.
    pub fn resolved_role_session_name(&self) -> &str {
        self.role_session_name
            .as_deref()
            .unwrap_or_else(|| self.resolved_role_name())
    }

    pub fn with_target_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<AccountId>,
    {
        self.target_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ignore_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_role_name(mut self, role_name: impl Into<String>) -> Self {
        self.role_name = Some(role_name.into());
        self
    }

    pub fn with_role_session_name(mut self, role_session_name: impl Into<String>) -> Self {
        self.role_session_name = Some(role_session_name.into());
        self
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }

    pub fn with_raise_exception(mut self, raise_exception: bool) -> Self {
        self.raise_exception = raise_exception;
        self
    }

    pub fn with_org_master(mut self, org_master: bool) -> Self {
        self.org_master = org_master;
        self
    }

    pub fn with_workers(mut self, session_workers: usize, operation_workers: usize) -> Self {
        self.session_workers = session_workers.max(1);
        self.operation_workers = operation_workers.max(1);
        self
    }

    pub fn with_runner(mut self, runner: RunnerKind) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}
