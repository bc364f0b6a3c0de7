//! Scheduled jobs for PayWatch.
//!
//! This crate provides:
//! - The daily notification batch with per-user failure isolation
//! - The daily email digest
//! - A job executor that dispatches jobs by name
//! - A cron scheduler that triggers them at fixed local times
//! - Runtime wiring shared by the server and the CLI

pub mod executor;
pub mod jobs;
pub mod runtime;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, RunContext, ScheduledJob};
pub use jobs::{BatchReport, DailyDigestJob, DailyNotificationJob, DigestReport};
pub use runtime::WorkerRuntime;
pub use scheduler::CronScheduler;
