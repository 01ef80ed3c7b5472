use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::database::SurveyStore;
use crate::services::{Mailer, PdfRenderer, TextGenerator};

/// Process counters exported on `/metrics`.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    responses_recorded: AtomicU64,
    invitations_completed: AtomicU64,
    reports_generated: AtomicU64,
    report_failures: AtomicU64,
    emails_sent: AtomicU64,
    email_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub responses_recorded: u64,
    pub invitations_completed: u64,
    pub reports_generated: u64,
    pub report_failures: u64,
    pub emails_sent: u64,
    pub email_failures: u64,
}

impl ServiceMetrics {
    pub fn response_recorded(&self) {
        self.responses_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn invitation_completed(&self) {
        self.invitations_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report_generated(&self) {
        self.reports_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report_failed(&self) {
        self.report_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn emails(&self, sent: usize, failed: usize) {
        self.emails_sent.fetch_add(sent as u64, Ordering::Relaxed);
        self.email_failures.fetch_add(failed as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            responses_recorded: self.responses_recorded.load(Ordering::Relaxed),
            invitations_completed: self.invitations_completed.load(Ordering::Relaxed),
            reports_generated: self.reports_generated.load(Ordering::Relaxed),
            report_failures: self.report_failures.load(Ordering::Relaxed),
            emails_sent: self.emails_sent.load(Ordering::Relaxed),
            email_failures: self.email_failures.load(Ordering::Relaxed),
        }
    }
}

/// Shared handler state: every external collaborator, injected once at startup.
pub struct AppState {
    pub store: Arc<dyn SurveyStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub mailer: Arc<dyn Mailer>,
    pub renderer: Arc<dyn PdfRenderer>,
    pub metrics: ServiceMetrics,
    pub generation_timeout: Duration,
    /// Public base for respondent links.
    pub base_url: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SurveyStore>,
        generator: Arc<dyn TextGenerator>,
        mailer: Arc<dyn Mailer>,
        renderer: Arc<dyn PdfRenderer>,
        generation_timeout: Duration,
        base_url: &str,
    ) -> Self {
        Self {
            store,
            generator,
            mailer,
            renderer,
            metrics: ServiceMetrics::default(),
            generation_timeout,
            base_url: base_url.to_string(),
        }
    }
}
