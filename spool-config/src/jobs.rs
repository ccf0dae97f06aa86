//! Print queue job records and sweeps
//!
//! The job path is an enumerate-then-command loop: list what the queue
//! holds, then issue a per-job control command. It opens its own handle
//! and never touches the device mode.

use serde::Serialize;
use tracing::{info, instrument};

use crate::api::{PrinterAccess, PrinterGuard, SpoolApi};
use crate::config::Spooler;
use crate::error::SpoolResult;

pub const JOB_STATUS_PAUSED: u32 = 0x0000_0001;
pub const JOB_STATUS_ERROR: u32 = 0x0000_0002;
pub const JOB_STATUS_DELETING: u32 = 0x0000_0004;
pub const JOB_STATUS_SPOOLING: u32 = 0x0000_0008;
pub const JOB_STATUS_PRINTING: u32 = 0x0000_0010;
pub const JOB_STATUS_OFFLINE: u32 = 0x0000_0020;
pub const JOB_STATUS_PAPEROUT: u32 = 0x0000_0040;
pub const JOB_STATUS_PRINTED: u32 = 0x0000_0080;
pub const JOB_STATUS_DELETED: u32 = 0x0000_0100;
pub const JOB_STATUS_BLOCKED: u32 = 0x0000_0200;
pub const JOB_STATUS_USER_INTERVENTION: u32 = 0x0000_0400;
pub const JOB_STATUS_RESTART: u32 = 0x0000_0800;

const STATUS_LABELS: &[(u32, &str)] = &[
    (JOB_STATUS_PAUSED, "paused"),
    (JOB_STATUS_ERROR, "error"),
    (JOB_STATUS_DELETING, "deleting"),
    (JOB_STATUS_SPOOLING, "spooling"),
    (JOB_STATUS_PRINTING, "printing"),
    (JOB_STATUS_OFFLINE, "offline"),
    (JOB_STATUS_PAPEROUT, "paper_out"),
    (JOB_STATUS_PRINTED, "printed"),
    (JOB_STATUS_DELETED, "deleted"),
    (JOB_STATUS_BLOCKED, "blocked"),
    (JOB_STATUS_USER_INTERVENTION, "user_intervention"),
    (JOB_STATUS_RESTART, "restart"),
];

/// One outstanding job as the queue reports it
#[derive(Debug, Clone, Serialize)]
pub struct JobInfo {
    pub id: u32,
    pub document: String,
    pub user: String,
    pub status: u32,
    pub priority: u32,
    pub pages: u32,
}

impl JobInfo {
    /// Human-readable labels for the set status bits
    pub fn status_labels(&self) -> Vec<&'static str> {
        STATUS_LABELS
            .iter()
            .filter(|(bit, _)| self.status & bit != 0)
            .map(|(_, label)| *label)
            .collect()
    }
}

/// Per-job control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCommand {
    /// Stop the job where it is
    Cancel,
    /// Remove the job from the queue
    Delete,
}

impl<A: SpoolApi> Spooler<A> {
    /// List the outstanding jobs on a printer's queue
    #[instrument(skip(self))]
    pub fn jobs(&self, printer: Option<&str>) -> SpoolResult<Vec<JobInfo>> {
        let name = self.resolve_printer(printer)?;
        let guard = PrinterGuard::open(self.api(), &name, PrinterAccess::All)?;
        self.api().jobs(guard.handle())
    }

    /// Abort every outstanding job on a printer.
    ///
    /// Returns the number of jobs commanded.
    #[instrument(skip(self))]
    pub fn abort_jobs(&self, printer: Option<&str>) -> SpoolResult<usize> {
        self.sweep(printer, JobCommand::Cancel)
    }

    /// Delete every outstanding job on a printer.
    ///
    /// Returns the number of jobs commanded.
    #[instrument(skip(self))]
    pub fn purge_jobs(&self, printer: Option<&str>) -> SpoolResult<usize> {
        self.sweep(printer, JobCommand::Delete)
    }

    fn sweep(&self, printer: Option<&str>, command: JobCommand) -> SpoolResult<usize> {
        let name = self.resolve_printer(printer)?;
        let guard = PrinterGuard::open(self.api(), &name, PrinterAccess::All)?;
        let handle = guard.handle();

        let jobs = self.api().jobs(handle)?;
        for job in &jobs {
            self.api().set_job(handle, job.id, command)?;
        }

        info!(printer = %name, count = jobs.len(), ?command, "job sweep complete");
        Ok(jobs.len())
    }
}
