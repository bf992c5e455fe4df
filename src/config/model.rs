// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::pool::DEFAULT_MAX_PER_KIND;
use crate::sched::DEFAULT_MAX_PER_TICK;

/// Top-level runner configuration as read from a TOML file.
///
/// ```toml
/// [scheduler.Default]
/// kind = "frame"
/// max_per_tick = 8
///
/// [scheduler.Priority]
/// kind = "priority"
/// max_per_tick = 2
///
/// [pool]
/// max_per_kind = 64
/// ```
///
/// All sections are optional; the canonical "Default" and "Priority"
/// schedulers exist whether or not the file mentions them.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RunnerConfig {
    /// Scheduler sections from `[scheduler.<name>]`, keyed by name.
    #[serde(default)]
    pub scheduler: BTreeMap<String, SchedulerConfig>,

    /// `[pool]` section.
    #[serde(default)]
    pub pool: PoolConfig,
}

/// One `[scheduler.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Scheduling policy; defaults to `"frame"`.
    #[serde(default)]
    pub kind: SchedulerKind,

    /// Maximum tasks serviced per tick. Must be >= 1.
    #[serde(default = "default_max_per_tick")]
    pub max_per_tick: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            kind: SchedulerKind::default(),
            max_per_tick: default_max_per_tick(),
        }
    }
}

/// Scheduling policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    #[default]
    Frame,
    Priority,
}

/// `[pool]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Upper bound on each per-kind freelist.
    #[serde(default = "default_pool_cap")]
    pub max_per_kind: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_per_kind: default_pool_cap(),
        }
    }
}

fn default_max_per_tick() -> usize {
    DEFAULT_MAX_PER_TICK
}

fn default_pool_cap() -> usize {
    DEFAULT_MAX_PER_KIND
}
