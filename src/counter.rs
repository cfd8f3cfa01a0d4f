use std::str::FromStr;
use std::time::Duration;

use strum::IntoEnumIterator;
use sysinfo::{MINIMUM_CPU_UPDATE_INTERVAL, Networks, ProcessesToUpdate, System};
use tracemon_core::{MetricSource, OpenError, PollError};

/// Upper bound on the measurement window of rate counters.
const MAX_RATE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum MemoryField {
    Used,
    Available,
    Total,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Rx,
    Tx,
}

/// A parsed counter identifier.
///
/// Grammar:
/// - `cpu`, `cpu/<core>`: usage percent
/// - `memory/<used|available|total>`, `swap/used`: bytes
/// - `network/<rx|tx>`, `network/<iface>/<rx|tx>`: bytes per second
/// - `processes`: process count
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Counter {
    Cpu { core: Option<usize> },
    Memory(MemoryField),
    SwapUsed,
    Network {
        interface: Option<String>,
        direction: Direction,
    },
    Processes,
}

impl Counter {
    /// Rate counters sleep inside `poll` to measure a delta.
    pub fn is_rate(&self) -> bool {
        matches!(self, Counter::Cpu { .. } | Counter::Network { .. })
    }
}

impl FromStr for Counter {
    type Err = OpenError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let unknown = || OpenError::UnknownCounter(id.to_string());
        let parts: Vec<&str> = id.split('/').collect();

        let counter = match parts.as_slice() {
            ["cpu"] => Counter::Cpu { core: None },
            ["cpu", core] => Counter::Cpu {
                core: Some(core.parse().map_err(|_| unknown())?),
            },
            ["memory", field] => Counter::Memory(field.parse().map_err(|_| unknown())?),
            ["swap", "used"] => Counter::SwapUsed,
            ["network", direction] => Counter::Network {
                interface: None,
                direction: direction.parse().map_err(|_| unknown())?,
            },
            ["network", interface, direction] if !interface.is_empty() => Counter::Network {
                interface: Some(interface.to_string()),
                direction: direction.parse().map_err(|_| unknown())?,
            },
            ["processes"] => Counter::Processes,
            _ => return Err(unknown()),
        };
        Ok(counter)
    }
}

/// Every identifier form this build understands, for `--list-counters`.
pub fn describe_counters() -> Vec<String> {
    let mut lines = vec![
        "cpu                      total CPU usage, percent".to_string(),
        "cpu/<core>               one core's usage, percent".to_string(),
    ];
    lines.extend(
        MemoryField::iter().map(|f| format!("{:<25}{f} memory, bytes", format!("memory/{f}"))),
    );
    lines.push("swap/used                used swap, bytes".to_string());
    lines.extend(
        Direction::iter().map(|d| format!("{:<25}all interfaces, bytes/s", format!("network/{d}"))),
    );
    lines.push("network/<iface>/<rx|tx>  one interface, bytes/s".to_string());
    lines.push("processes                running process count".to_string());
    lines
}

/// Counter source backed by `sysinfo`.
pub struct HostCounter {
    identifier: String,
    counter: Counter,
    system: System,
    networks: Networks,
    window: Duration,
}

impl HostCounter {
    /// Parse `identifier` and check the named instance exists on this host.
    ///
    /// `interval` is the poll interval; rate counters measure over
    /// `min(interval, 1s)`.
    pub fn open(identifier: &str, interval: Duration) -> Result<Self, OpenError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(OpenError::Unsupported);
        }
        let counter: Counter = identifier.parse()?;

        let mut system = System::new();
        let networks = Networks::new_with_refreshed_list();

        match &counter {
            Counter::Cpu { core: Some(core) } => {
                system.refresh_cpu_all();
                if *core >= system.cpus().len() {
                    return Err(OpenError::NoSuchInstance {
                        counter: "cpu".into(),
                        instance: core.to_string(),
                    });
                }
            }
            Counter::Network {
                interface: Some(interface),
                ..
            } if !networks.list().contains_key(interface) => {
                return Err(OpenError::NoSuchInstance {
                    counter: "network".into(),
                    instance: interface.clone(),
                });
            }
            _ => {}
        }

        let mut window = interval.min(MAX_RATE_WINDOW);
        if matches!(counter, Counter::Cpu { .. }) {
            window = window.max(MINIMUM_CPU_UPDATE_INTERVAL);
        }

        Ok(Self {
            identifier: identifier.to_string(),
            counter,
            system,
            networks,
            window,
        })
    }

    pub fn is_rate(&self) -> bool {
        self.counter.is_rate()
    }

    /// Measurement window of rate counters.
    pub fn sample_window(&self) -> Duration {
        self.window
    }

    fn poll_cpu(&mut self, core: Option<usize>) -> Result<i64, PollError> {
        self.system.refresh_cpu_usage();
        std::thread::sleep(self.window);
        self.system.refresh_cpu_usage();

        let usage = match core {
            None => self.system.global_cpu_usage(),
            Some(i) => self
                .system
                .cpus()
                .get(i)
                .map(|cpu| cpu.cpu_usage())
                .ok_or_else(|| PollError::Unavailable(format!("cpu {i} went away")))?,
        };
        Ok(usage.round() as i64)
    }

    fn poll_network(
        &mut self,
        interface: Option<&str>,
        direction: Direction,
    ) -> Result<i64, PollError> {
        // Two refreshes bracket the window; `received`/`transmitted` are the
        // deltas between them.
        self.networks.refresh(true);
        std::thread::sleep(self.window);
        self.networks.refresh(true);

        let bytes: u64 = self
            .networks
            .list()
            .iter()
            .filter(|(name, _)| interface.is_none_or(|wanted| wanted == name.as_str()))
            .map(|(_, data)| match direction {
                Direction::Rx => data.received(),
                Direction::Tx => data.transmitted(),
            })
            .sum();

        if let Some(wanted) = interface
            && !self.networks.list().contains_key(wanted)
        {
            return Err(PollError::Unavailable(format!("interface {wanted} went away")));
        }

        let per_second = bytes as f64 / self.window.as_secs_f64();
        Ok(per_second.round() as i64)
    }
}

fn to_sample(value: u64) -> Result<i64, PollError> {
    i64::try_from(value).map_err(|_| PollError::Unavailable(format!("{value} out of range")))
}

impl MetricSource for HostCounter {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn poll(&mut self) -> Result<i64, PollError> {
        match self.counter.clone() {
            Counter::Cpu { core } => self.poll_cpu(core),
            Counter::Memory(field) => {
                self.system.refresh_memory();
                to_sample(match field {
                    MemoryField::Used => self.system.used_memory(),
                    MemoryField::Available => self.system.available_memory(),
                    MemoryField::Total => self.system.total_memory(),
                })
            }
            Counter::SwapUsed => {
                self.system.refresh_memory();
                to_sample(self.system.used_swap())
            }
            Counter::Network {
                interface,
                direction,
            } => self.poll_network(interface.as_deref(), direction),
            Counter::Processes => {
                self.system.refresh_processes(ProcessesToUpdate::All, true);
                to_sample(self.system.processes().len() as u64)
            }
        }
    }
}
