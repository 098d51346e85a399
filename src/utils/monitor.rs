#[cfg(feature = "cli")]
use std::sync::{Arc, Mutex};
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct RunStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
}

/// 追蹤單次報告執行的資源用量與各階段耗時
#[cfg(feature = "cli")]
pub struct RunMonitor {
    system: Arc<Mutex<System>>,
    pid: Pid,
    start_time: Instant,
    phase_start: Mutex<Instant>,
    phases: Mutex<Vec<(String, Duration)>>,
    peak_memory: Arc<Mutex<u64>>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_with_specifics(RefreshKind::everything());
        let pid = sysinfo::get_current_pid().expect("Failed to get current PID");

        // 初始刷新
        system.refresh_all();

        let now = Instant::now();
        Self {
            system: Arc::new(Mutex::new(system)),
            pid,
            start_time: now,
            phase_start: Mutex::new(now),
            phases: Mutex::new(Vec::new()),
            peak_memory: Arc::new(Mutex::new(0)),
            enabled,
        }
    }

    pub fn get_stats(&self) -> Option<RunStats> {
        if !self.enabled {
            return None;
        }

        let mut system = self.system.lock().ok()?;
        system.refresh_all();

        let process = system.process(self.pid)?;
        let memory_mb = process.memory() / 1024 / 1024;

        // 更新峰值記憶體
        let mut peak = self.peak_memory.lock().ok()?;
        if memory_mb > *peak {
            *peak = memory_mb;
        }
        let peak_memory = *peak;

        Some(RunStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb: peak_memory,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    /// 記錄一個階段結束並重置階段計時器
    pub fn finish_phase(&self, phase: &str) {
        if !self.enabled {
            return;
        }

        let elapsed = {
            let mut start = match self.phase_start.lock() {
                Ok(s) => s,
                Err(_) => return,
            };
            let elapsed = start.elapsed();
            *start = Instant::now();
            elapsed
        };

        if let Ok(mut phases) = self.phases.lock() {
            phases.push((phase.to_string(), elapsed));
        }

        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 {} finished in {:?} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB",
                phase,
                elapsed,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                stats.elapsed_time,
                stats.peak_memory_mb
            );
            if let Ok(phases) = self.phases.lock() {
                for (phase, elapsed) in phases.iter() {
                    tracing::info!("📊   {} took {:?}", phase, elapsed);
                }
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 為非CLI環境提供空實現
#[cfg(not(feature = "cli"))]
pub struct RunMonitor;

#[cfg(not(feature = "cli"))]
impl RunMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn finish_phase(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
