//! Process resource usage sampled at stage boundaries. Without the `cli`
//! feature the monitor is a no-op and sysinfo is not linked.

use crate::domain::model::Stage;
use std::time::{Duration, Instant};

/// One reading of this process, in whole megabytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    pub cpu_percent: f32,
    pub rss_mb: u64,
    pub peak_rss_mb: u64,
    pub elapsed: Duration,
}

#[cfg(feature = "cli")]
struct ProcessSampler {
    system: sysinfo::System,
    pid: sysinfo::Pid,
    peak_rss_mb: u64,
}

#[cfg(feature = "cli")]
impl ProcessSampler {
    fn read(&mut self) -> Option<(f32, u64)> {
        self.system
            .refresh_processes(sysinfo::ProcessesToUpdate::Some(&[self.pid]), true);
        let process = self.system.process(self.pid)?;
        let rss_mb = process.memory() / 1024 / 1024;
        self.peak_rss_mb = self.peak_rss_mb.max(rss_mb);
        Some((process.cpu_usage(), rss_mb))
    }
}

pub struct SystemMonitor {
    #[cfg(feature = "cli")]
    sampler: Option<std::sync::Mutex<ProcessSampler>>,
    #[cfg_attr(not(feature = "cli"), allow(dead_code))]
    started: Instant,
}

impl SystemMonitor {
    /// A disabled monitor never touches the process table.
    #[cfg(feature = "cli")]
    pub fn new(enabled: bool) -> Self {
        let sampler = enabled
            .then(sysinfo::get_current_pid)
            .and_then(|pid| pid.ok())
            .map(|pid| {
                std::sync::Mutex::new(ProcessSampler {
                    system: sysinfo::System::new(),
                    pid,
                    peak_rss_mb: 0,
                })
            });
        Self {
            sampler,
            started: Instant::now(),
        }
    }

    #[cfg(not(feature = "cli"))]
    pub fn new(_enabled: bool) -> Self {
        Self {
            started: Instant::now(),
        }
    }

    #[cfg(feature = "cli")]
    pub fn is_enabled(&self) -> bool {
        self.sampler.is_some()
    }

    #[cfg(not(feature = "cli"))]
    pub fn is_enabled(&self) -> bool {
        false
    }

    #[cfg(feature = "cli")]
    pub fn sample(&self) -> Option<ResourceSample> {
        let mut sampler = self.sampler.as_ref()?.lock().ok()?;
        let (cpu_percent, rss_mb) = sampler.read()?;
        Some(ResourceSample {
            cpu_percent,
            rss_mb,
            peak_rss_mb: sampler.peak_rss_mb,
            elapsed: self.started.elapsed(),
        })
    }

    #[cfg(not(feature = "cli"))]
    pub fn sample(&self) -> Option<ResourceSample> {
        None
    }

    pub fn log_stats(&self, stage: Stage) {
        if let Some(sample) = self.sample() {
            tracing::info!(
                stage = %stage,
                cpu_percent = f64::from(sample.cpu_percent),
                rss_mb = sample.rss_mb,
                peak_rss_mb = sample.peak_rss_mb,
                elapsed_ms = sample.elapsed.as_millis() as u64,
                "stage resources"
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(sample) = self.sample() {
            tracing::info!(
                peak_rss_mb = sample.peak_rss_mb,
                elapsed_ms = sample.elapsed.as_millis() as u64,
                "run resources"
            );
        }
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
