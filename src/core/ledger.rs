// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::core::authority::Authority;
use crate::core::error::{AuthorityError, LedgerError};
use crate::core::permissions;
use crate::core::status::{DurationMap, Role, Snapshot, StatusKey};
use crate::{pdebug, pinfo, pwarn};

/// Persisted part of the ledger. Times are local wall-clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub status: StatusKey,
    pub durations: DurationMap,
    pub day: NaiveDate,
    /// Accrual is settled up to this instant.
    pub since: NaiveDateTime,
}

/// Authoritative record of one worker's day.
///
/// Unlike the tracker, every status accrues here, Offline included. The role
/// comes from the daemon's own configuration and is checked on every
/// transition.
#[derive(Debug, Clone)]
pub struct Ledger {
    role: Role,
    record: LedgerRecord,
}

impl Ledger {
    pub fn new(role: Role, now: NaiveDateTime) -> Self {
        Self {
            role,
            record: LedgerRecord {
                status: StatusKey::Offline,
                durations: DurationMap::new(),
                day: now.date(),
                since: now,
            },
        }
    }

    pub fn from_record(role: Role, record: LedgerRecord) -> Self {
        Self { role, record }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn record(&self) -> &LedgerRecord {
        &self.record
    }

    /// Credits elapsed whole seconds to the current status, splitting at
    /// midnight and starting a fresh map for each new day.
    pub fn settle(&mut self, now: NaiveDateTime) {
        let rec = &mut self.record;

        if now < rec.since {
            // The day and its map stay; this also covers falling back across
            // midnight.
            pwarn!("Ledger", "clock moved backwards ({} -> {}); not crediting", rec.since, now);
            rec.since = now;
            return;
        }

        while rec.day < now.date() {
            let Some(next) = rec.day.succ_opt() else {
                break;
            };
            let Some(midnight) = next.and_hms_opt(0, 0, 0) else {
                break;
            };

            credit(rec, midnight);
            pinfo!("Ledger", "day rolled over to {}", next);
            rec.day = next;
            rec.durations = DurationMap::new();
        }

        credit(rec, now);
    }

    pub fn current(&mut self, now: NaiveDateTime) -> Snapshot {
        self.settle(now);
        self.snapshot()
    }

    pub fn transition(
        &mut self,
        status: StatusKey,
        now: NaiveDateTime,
    ) -> Result<Snapshot, LedgerError> {
        self.settle(now);

        if !permissions::allows(self.role, status) {
            pwarn!("Ledger", "rejected {} for role {}", status, self.role);
            return Err(LedgerError::NotPermitted { role: self.role, status });
        }

        if self.record.status != status {
            pinfo!("Ledger", "{} -> {}", self.record.status, status);
            self.record.status = status;
        }

        Ok(self.snapshot())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.record.status, self.record.durations.clone())
    }

    /// `Ok(None)` when no ledger has been written yet.
    pub fn load(path: &Path) -> io::Result<Option<LedgerRecord>> {
        let raw = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Write-then-rename so a crash never leaves a truncated ledger.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let tmp = PathBuf::from(format!("{}.tmp", path.display()));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)
    }
}

fn credit(rec: &mut LedgerRecord, until: NaiveDateTime) {
    let secs = (until - rec.since).num_seconds();
    if secs <= 0 {
        return;
    }
    rec.durations.add(rec.status, secs as u64);
    rec.since += TimeDelta::seconds(secs);
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// A ledger shared between IPC connections, stamped with wall-clock time and
/// saved after every accepted transition.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
    path: Option<PathBuf>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger, path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
            path,
        }
    }

    pub async fn current(&self) -> Snapshot {
        self.inner.lock().await.current(local_now())
    }

    pub async fn transition(&self, status: StatusKey) -> Result<Snapshot, LedgerError> {
        let mut ledger = self.inner.lock().await;
        let snap = ledger.transition(status, local_now())?;
        self.persist(&ledger);
        Ok(snap)
    }

    /// Settles and writes the ledger, if a path is configured.
    pub async fn save(&self) -> io::Result<()> {
        let mut ledger = self.inner.lock().await;
        ledger.settle(local_now());
        match &self.path {
            Some(path) => ledger.save(path),
            None => Ok(()),
        }
    }

    fn persist(&self, ledger: &Ledger) {
        let Some(path) = &self.path else {
            return;
        };
        match ledger.save(path) {
            Ok(()) => pdebug!("Ledger", "saved to {}", path.display()),
            Err(e) => pwarn!("Ledger", "failed to save {}: {}", path.display(), e),
        }
    }
}

impl Authority for SharedLedger {
    fn fetch_current(&self) -> BoxFuture<'_, Result<Snapshot, AuthorityError>> {
        Box::pin(async move { Ok(self.current().await) })
    }

    fn post_transition(&self, status: StatusKey) -> BoxFuture<'_, Result<Snapshot, AuthorityError>> {
        Box::pin(async move {
            self.transition(status)
                .await
                .map_err(|e| AuthorityError::rejected(e.to_string()))
        })
    }
}
