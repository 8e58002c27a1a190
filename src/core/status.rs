// Author: Dustin Pilgrim
// License: MIT

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A worker's activity state. Exactly one is current at any time.
///
/// Declaration order is display order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum StatusKey {
    Online,
    #[serde(rename = "On-call")]
    OnCall,
    Break,
    #[serde(rename = "Lunch Time", alias = "Lunch-Time")]
    LunchTime,
    Evaluation,
    #[default]
    Offline,
}

impl StatusKey {
    pub const ALL: [StatusKey; 6] = [
        StatusKey::Online,
        StatusKey::OnCall,
        StatusKey::Break,
        StatusKey::LunchTime,
        StatusKey::Evaluation,
        StatusKey::Offline,
    ];

    /// Name used on the wire and in user-facing output.
    pub fn wire_name(self) -> &'static str {
        match self {
            StatusKey::Online => "Online",
            StatusKey::OnCall => "On-call",
            StatusKey::Break => "Break",
            StatusKey::LunchTime => "Lunch Time",
            StatusKey::Evaluation => "Evaluation",
            StatusKey::Offline => "Offline",
        }
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Lowercases and drops separators so `Lunch Time`, `lunch-time` and
/// `LUNCH_TIME` all compare equal.
fn fold(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for StatusKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "online" => Ok(StatusKey::Online),
            "oncall" => Ok(StatusKey::OnCall),
            "break" => Ok(StatusKey::Break),
            "lunchtime" | "lunch" => Ok(StatusKey::LunchTime),
            "evaluation" => Ok(StatusKey::Evaluation),
            "offline" => Ok(StatusKey::Offline),
            _ => Err(format!("unknown status '{}'", s.trim())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    BranchManager,
    #[serde(rename = "HR")]
    Hr,
    Employee,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::BranchManager => write!(f, "BranchManager"),
            Role::Hr => write!(f, "HR"),
            Role::Employee => write!(f, "Employee"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "branchmanager" | "manager" => Ok(Role::BranchManager),
            "hr" => Ok(Role::Hr),
            "employee" => Ok(Role::Employee),
            _ => Err(format!("unknown role '{}'", s.trim())),
        }
    }
}

/// Seconds accrued per status today. Absent keys read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationMap(BTreeMap<StatusKey, u64>);

impl DurationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, status: StatusKey) -> u64 {
        self.0.get(&status).copied().unwrap_or(0)
    }

    /// Saturating add into one bucket.
    pub fn add(&mut self, status: StatusKey, seconds: u64) {
        let slot = self.0.entry(status).or_insert(0);
        *slot = slot.saturating_add(seconds);
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatusKey, u64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl<const N: usize> From<[(StatusKey, u64); N]> for DurationMap {
    fn from(entries: [(StatusKey, u64); N]) -> Self {
        Self(BTreeMap::from(entries))
    }
}

/// Authoritative status + durations pair, as served by the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub current_status: StatusKey,
    #[serde(default)]
    pub durations: DurationMap,
}

impl Snapshot {
    pub fn new(current_status: StatusKey, durations: DurationMap) -> Self {
        Self { current_status, durations }
    }
}
