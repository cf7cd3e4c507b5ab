//! Dashboard overview widgets.
//!
//! None of these figures has a backend endpoint; they are fixed demo content
//! shown on the landing page next to the live alert state.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackStat {
    pub name: &'static str,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Attack,
    Security,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecentEvent {
    pub kind: EventKind,
    pub title: &'static str,
    pub timestamp: &'static str,
    pub outcome: EventOutcome,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoDeviceRole {
    Attack,
    Monitor,
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DemoDevice {
    pub name: &'static str,
    pub role: DemoDeviceRole,
    pub online: bool,
    pub ip: &'static str,
}

pub fn attack_stats() -> &'static [AttackStat] {
    const STATS: &[AttackStat] = &[
        AttackStat { name: "DoS Attacks", count: 12 },
        AttackStat { name: "BadUSB Attacks", count: 8 },
        AttackStat { name: "Network Scans", count: 15 },
    ];
    STATS
}

/// Share of each attack type, as whole percentages.
pub fn attack_shares() -> Vec<(&'static str, u32)> {
    let total: u32 = attack_stats().iter().map(|s| s.count).sum();
    attack_stats()
        .iter()
        .map(|s| (s.name, (s.count * 100 + total / 2) / total.max(1)))
        .collect()
}

pub fn recent_events() -> &'static [RecentEvent] {
    const EVENTS: &[RecentEvent] = &[
        RecentEvent {
            kind: EventKind::Attack,
            title: "DoS Attack Simulation",
            timestamp: "2025-04-07 09:15:22",
            outcome: EventOutcome::Success,
            description: "Successfully simulated DoS attack using ESP8266",
        },
        RecentEvent {
            kind: EventKind::Security,
            title: "Intrusion Detected",
            timestamp: "2025-04-07 08:30:45",
            outcome: EventOutcome::Warning,
            description: "Reed switch triggered on main entry point",
        },
        RecentEvent {
            kind: EventKind::Network,
            title: "Device Disconnected",
            timestamp: "2025-04-07 07:45:12",
            outcome: EventOutcome::Error,
            description: "Device went offline unexpectedly",
        },
        RecentEvent {
            kind: EventKind::Attack,
            title: "BadUSB Attack Simulation",
            timestamp: "2025-04-06 16:22:37",
            outcome: EventOutcome::Success,
            description: "Successfully executed notepad payload",
        },
        RecentEvent {
            kind: EventKind::Security,
            title: "Network Scan Completed",
            timestamp: "2025-04-06 15:10:03",
            outcome: EventOutcome::Success,
            description: "Identified 12 devices on network",
        },
    ];
    EVENTS
}

pub fn device_status() -> &'static [DemoDevice] {
    const DEVICES: &[DemoDevice] = &[
        DemoDevice { name: "ESP8266 DoS Simulator", role: DemoDeviceRole::Attack, online: true, ip: "192.168.1.101" },
        DemoDevice { name: "Arduino Leonardo BadUSB", role: DemoDeviceRole::Attack, online: true, ip: "192.168.1.102" },
        DemoDevice { name: "Network Scanner Node", role: DemoDeviceRole::Monitor, online: true, ip: "192.168.1.103" },
        DemoDevice { name: "Entry Sensor (Reed Switch)", role: DemoDeviceRole::Monitor, online: true, ip: "192.168.1.104" },
        DemoDevice { name: "Relay Control Unit", role: DemoDeviceRole::Control, online: true, ip: "192.168.1.105" },
        DemoDevice { name: "PIR Motion Detector", role: DemoDeviceRole::Monitor, online: false, ip: "192.168.1.106" },
    ];
    DEVICES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_shares_round_to_whole_percent() {
        assert_eq!(
            attack_shares(),
            vec![("DoS Attacks", 34), ("BadUSB Attacks", 23), ("Network Scans", 43)]
        );
    }

    #[test]
    fn one_demo_device_is_offline() {
        let offline: Vec<_> = device_status().iter().filter(|d| !d.online).collect();
        assert_eq!(offline.len(), 1);
        assert_eq!(offline[0].name, "PIR Motion Detector");
    }
}
