// Author: Dustin Pilgrim
// License: MIT

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::format::format_duration;
use crate::core::permissions;
use crate::core::status::{DurationMap, Role, Snapshot, StatusKey};
use crate::core::store::Session;
use crate::core::thresholds;

pub fn status_line(session: &Session) -> String {
    let mut line = format!(
        "{}  {}",
        session.status,
        format_duration(session.durations.get(session.status))
    );

    if session.busy {
        line.push_str("  (updating…)");
    }

    line
}

fn short_limit(seconds: u64) -> String {
    if seconds % 3600 == 0 {
        format!("{}h", seconds / 3600)
    } else if seconds % 60 == 0 {
        format!("{}m", seconds / 60)
    } else {
        format!("{seconds}s")
    }
}

/// One row per status offered to `role`. Limited rows show the limit, and
/// a `!` marker once it is passed.
pub fn durations_text(role: Role, current: StatusKey, durations: &DurationMap) -> String {
    let mut out = String::new();

    for status in permissions::offered(role) {
        let marker = if status == current { '*' } else { ' ' };
        let mut row = format!(
            "{marker} {:<12}{}",
            status.wire_name(),
            format_duration(durations.get(status))
        );

        if let Some(limit) = thresholds::limit(status) {
            row.push_str(&format!(" / {}", short_limit(limit)));
            if thresholds::exceeded(status, durations) {
                row.push_str("  ! over limit");
            }
        }

        out.push_str(&row);
        out.push('\n');
    }

    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoJson<'a> {
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    role: Role,
    offered: Vec<StatusKey>,
    exceeded: BTreeMap<StatusKey, bool>,
}

pub fn info_json(role: Role, snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(&InfoJson {
        snapshot,
        role,
        offered: permissions::offered(role),
        exceeded: thresholds::evaluate(&snapshot.durations),
    })
}

pub fn options_text(role: Role) -> String {
    permissions::offered(role)
        .into_iter()
        .map(|s| s.wire_name())
        .collect::<Vec<_>>()
        .join("\n")
}
