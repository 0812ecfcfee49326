use crate::client::Service;
use crate::error::Error;
use crate::topup::TopupResponse;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One independent top-up job, as loaded from a CSV row or JSON record.
/// Constructed by the caller and consumed exactly once by a worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopupJob {
    pub number: String,
    pub amount: f64,
    pub country: String,
    #[serde(default)]
    pub tolerance: Option<f64>,
    /// Exact operator name; auto-detection is used when absent.
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub custom_identifier: Option<String>,
}

impl TopupJob {
    fn operator_name(&self) -> Option<&str> {
        self.operator.as_deref().filter(|name| !name.is_empty())
    }
}

/// Result of one batch job: the provider's echo on success, or the job's
/// own fields echoed back alongside the error, so failed rows stay
/// traceable without a row index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupOutcome {
    #[serde(flatten)]
    pub response: TopupResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl TopupOutcome {
    fn success(response: TopupResponse) -> Self {
        Self {
            response,
            error_message: None,
            error_code: None,
        }
    }

    fn failure(job: &TopupJob, err: &Error) -> Self {
        let response = TopupResponse {
            recipient_phone: job.number.clone(),
            country_code: job.country.clone(),
            requested_amount: job.amount,
            operator_name: job.operator.clone().unwrap_or_default(),
            custom_identifier: job.custom_identifier.clone(),
            ..Default::default()
        };
        Self {
            response,
            error_message: Some(err.to_string()),
            error_code: err.error_code().map(str::to_string),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_message.is_none()
    }
}

/// Run every job with at most `concurrency` submissions in flight.
///
/// Each job gets a fresh [`Topups`](crate::Topups) builder over the shared
/// transport, so no mutable state crosses worker boundaries. A job's failure
/// is folded into its own outcome and never affects siblings. Outcomes are
/// collected in completion order, not input order; correlate by the echoed
/// fields (phone, country, amount), not by position.
pub async fn run_batch(
    service: &Service,
    jobs: Vec<TopupJob>,
    concurrency: usize,
) -> Vec<TopupOutcome> {
    let concurrency = concurrency.max(1);
    let total = jobs.len();
    info!(jobs = total, concurrency, "starting batch run");

    let outcomes: Vec<TopupOutcome> = stream::iter(jobs.into_iter().map(|job| {
        let service = service.clone();
        async move { run_job(&service, job).await }
    }))
    .buffer_unordered(concurrency)
    .collect()
    .await;

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    info!(jobs = total, failed, "batch run finished");
    outcomes
}

async fn run_job(service: &Service, job: TopupJob) -> TopupOutcome {
    let tolerance = job.tolerance.unwrap_or(0.0);

    let mut topups = match job.operator_name() {
        Some(name) => {
            service
                .topups()
                .find_operator(&job.country, name)
                .await
                .suggested_amount(tolerance)
                .auto_fallback()
        }
        None => service
            .topups()
            .auto_detect(&job.country)
            .suggested_amount(tolerance),
    };

    if let Some(identifier) = job.custom_identifier.as_deref().filter(|s| !s.is_empty()) {
        topups = topups.custom_identifier(identifier);
    }

    match topups.topup(&job.number, job.amount).await {
        Ok(response) => TopupOutcome::success(response),
        Err(err) => {
            warn!(
                number = %job.number,
                country = %job.country,
                amount = job.amount,
                error = %err,
                "job failed"
            );
            TopupOutcome::failure(&job, &err)
        }
    }
}
