//! Host counter sampling
//!
//! CPU usage in sysinfo is computed between two refreshes, so every sample
//! waits [`sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`] between them. Network rates
//! are derived from the interface byte counters of the previous sample, which
//! makes the very first sample report `0` for both directions.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use sysinfo::{Disks, Networks, System};
use tracing::trace;

const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Metrics as reported to the hub
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HostMetrics {
    pub cpu_percent: f64,
    pub load_avg_1m: f64,
    pub uptime_seconds: u64,
    pub memory_total_mb: f64,
    pub memory_used_mb: f64,
    pub memory_percent: f64,
    pub disk_total_gb: f64,
    pub disk_used_gb: f64,
    pub disk_percent: f64,
    pub network_in_bytes_per_sec: f64,
    pub network_out_bytes_per_sec: f64,
}

#[derive(Debug, Clone, Copy)]
struct NetworkCounters {
    at: Instant,
    received: u64,
    transmitted: u64,
}

/// Samples host counters through sysinfo
pub struct HostSampler {
    system: System,
    disks: Disks,
    networks: Networks,
    last_network: Option<NetworkCounters>,
}

impl HostSampler {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();

        Self {
            system,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            last_network: None,
        }
    }

    /// Take one sample
    pub async fn sample(&mut self) -> HostMetrics {
        self.system.refresh_cpu_usage();
        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.disks.refresh(true);
        self.networks.refresh(true);

        let total_memory = self.system.total_memory();
        let used_memory = self.system.used_memory();
        let (disk_total, disk_used) = self.root_disk_usage();
        let (network_in, network_out) = self.network_rates();

        let metrics = HostMetrics {
            cpu_percent: round2(self.system.global_cpu_usage() as f64),
            load_avg_1m: System::load_average().one,
            uptime_seconds: System::uptime(),
            memory_total_mb: round2(total_memory as f64 / MIB),
            memory_used_mb: round2(used_memory as f64 / MIB),
            memory_percent: percent(used_memory, total_memory),
            disk_total_gb: round2(disk_total as f64 / GIB),
            disk_used_gb: round2(disk_used as f64 / GIB),
            disk_percent: percent(disk_used, disk_total),
            network_in_bytes_per_sec: network_in,
            network_out_bytes_per_sec: network_out,
        };

        trace!("sampled host metrics: {metrics:?}");
        metrics
    }

    /// (total, used) bytes of the root filesystem, or of the largest disk if
    /// nothing is mounted at `/`
    fn root_disk_usage(&self) -> (u64, u64) {
        let list = self.disks.list();
        let disk = list
            .iter()
            .find(|disk| disk.mount_point() == Path::new("/"))
            .or_else(|| list.iter().max_by_key(|disk| disk.total_space()));

        match disk {
            Some(disk) => {
                let total = disk.total_space();
                (total, total.saturating_sub(disk.available_space()))
            }
            None => (0, 0),
        }
    }

    fn network_rates(&mut self) -> (f64, f64) {
        let (received, transmitted) = self
            .networks
            .iter()
            .fold((0u64, 0u64), |(rx, tx), (_, data)| {
                (rx + data.total_received(), tx + data.total_transmitted())
            });

        let current = NetworkCounters {
            at: Instant::now(),
            received,
            transmitted,
        };
        let rates = match self.last_network {
            Some(previous) => rates_between(previous, current),
            None => (0.0, 0.0),
        };
        self.last_network = Some(current);
        rates
    }
}

impl Default for HostSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn rates_between(previous: NetworkCounters, current: NetworkCounters) -> (f64, f64) {
    let elapsed = current.at.duration_since(previous.at).as_secs_f64();
    if elapsed <= 0.0 {
        return (0.0, 0.0);
    }

    // counters reset when an interface goes away, never report negative rates
    let received = current.received.saturating_sub(previous.received) as f64;
    let transmitted = current.transmitted.saturating_sub(previous.transmitted) as f64;

    (round2(received / elapsed), round2(transmitted / elapsed))
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(used as f64 / total as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
