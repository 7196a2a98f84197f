//! The benchmark scenario.
//!
//! One run per transport: search, count, insert, update, pause, delete, bulk.
//! A failing step is logged and recorded; the run always continues with the
//! next step.

use std::sync::Arc;
use std::time::{Duration, Instant};

use promo_usage_repository::{
    HistogramTimer, MetricsSink, PromoOrderUsageRepository, SearchError, TransportKind,
};
use promo_usage_shared::{Promo, SearchParameters};
use tracing::{error, info};

/// Filter used by the search and count steps.
pub const MARKETPLACE_FILTER: &str = "source:marketplace";

/// Order IDs written by the bulk step.
pub const BULK_ORDER_IDS: [i64; 2] = [66666666, 99999999];

/// How the delete step removes the record written earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteMode {
    /// Delete by a query-string filter.
    ByQuery(String),
    /// Delete by document ID.
    ById(String),
}

/// Inputs of one scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioPlan {
    /// Caller label attached to searches.
    pub source: String,
    /// Filter for search and count.
    pub filter: String,
    /// Order inserted, updated and then deleted.
    pub order_id: i64,
    pub delete: DeleteMode,
    /// Orders written by the bulk step.
    pub bulk_order_ids: Vec<i64>,
    /// Pause between the writes and the delete.
    pub pause: Duration,
}

impl ScenarioPlan {
    /// The plan historically run against each transport.
    ///
    /// The proxy deletes by query and the official client by ID, so each
    /// delete form is exercised once per full run.
    pub fn for_kind(kind: TransportKind) -> Self {
        let (source, order_id, delete) = match kind {
            TransportKind::Proxy => (
                "api.benchmark",
                69696969,
                DeleteMode::ByQuery("order_id:69696969".to_string()),
            ),
            TransportKind::Official => (
                "officialclient.benchmark",
                96969696,
                DeleteMode::ById("96969696".to_string()),
            ),
        };

        Self {
            source: source.to_string(),
            filter: MARKETPLACE_FILTER.to_string(),
            order_id,
            delete,
            bulk_order_ids: BULK_ORDER_IDS.to_vec(),
            pause: Duration::from_secs(1),
        }
    }

    /// Override the pause between writes and delete.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }
}

/// Result of one scenario step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: &'static str,
    /// What the step produced, or the error it failed with.
    pub detail: String,
    pub succeeded: bool,
}

/// Result of a full scenario run against one transport.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub kind: TransportKind,
    pub steps: Vec<StepOutcome>,
    pub elapsed: Duration,
}

impl ScenarioOutcome {
    /// Number of steps that failed.
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|step| !step.succeeded).count()
    }
}

fn record<T>(
    kind: TransportKind,
    steps: &mut Vec<StepOutcome>,
    step: &'static str,
    result: Result<T, SearchError>,
    describe: impl FnOnce(&T) -> String,
) {
    let outcome = match result {
        Ok(value) => {
            let detail = describe(&value);
            info!(transport = %kind, step, detail = %detail, "Step completed");
            StepOutcome {
                step,
                detail,
                succeeded: true,
            }
        }
        Err(e) => {
            error!(transport = %kind, step, error = %e, "Step failed");
            StepOutcome {
                step,
                detail: e.to_string(),
                succeeded: false,
            }
        }
    };
    steps.push(outcome);
}

/// Run the scenario against `repository`.
///
/// The whole run is timed as `handler.<transport>.run.promo_order_usage`.
pub async fn run_scenario(
    repository: &PromoOrderUsageRepository,
    plan: &ScenarioPlan,
    metrics: Arc<dyn MetricsSink>,
) -> ScenarioOutcome {
    let kind = repository.kind();
    let started = Instant::now();
    let _timer = HistogramTimer::start(
        metrics,
        format!("handler.{}.run.promo_order_usage", kind),
    );
    let mut steps = Vec::new();

    info!(
        transport = %kind,
        index = %repository.index_name(),
        "Starting scenario"
    );

    let parameters = SearchParameters::new(plan.filter.clone()).with_source(plan.source.clone());
    let result = repository.get(&parameters).await;
    record(kind, &mut steps, "get", result, |promos| {
        format!("{} results", promos.len())
    });

    let result = repository.count(&plan.filter).await;
    record(kind, &mut steps, "count", result, |count| {
        format!("{} documents", count)
    });

    let promo = Promo::with_order_id(plan.order_id);
    let result = repository.insert(&promo).await;
    record(kind, &mut steps, "insert", result, |outcome| {
        outcome.result.clone()
    });

    let result = repository.update(&promo).await;
    record(kind, &mut steps, "update", result, |outcome| {
        outcome.result.clone()
    });

    if !plan.pause.is_zero() {
        tokio::time::sleep(plan.pause).await;
    }

    match &plan.delete {
        DeleteMode::ByQuery(filter) => {
            let result = repository.delete_by_query(filter).await;
            record(kind, &mut steps, "delete", result, |deleted| {
                format!("{} deleted", deleted)
            });
        }
        DeleteMode::ById(id) => {
            let result = repository.delete_by_id(id).await;
            record(kind, &mut steps, "delete", result, |status| status.to_string());
        }
    }

    let promos: Vec<Promo> = plan
        .bulk_order_ids
        .iter()
        .map(|order_id| Promo::with_order_id(*order_id))
        .collect();
    let result = async {
        let payload = repository.bulk_payload(&promos)?;
        repository.bulk(&payload).await
    }
    .await;
    record(kind, &mut steps, "bulk", result, |report| {
        format!(
            "{}/{} succeeded, created: {}",
            report.succeeded(),
            report.total(),
            report.created
        )
    });

    let outcome = ScenarioOutcome {
        kind,
        steps,
        elapsed: started.elapsed(),
    };

    info!(
        transport = %kind,
        failures = outcome.failures(),
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "Scenario finished"
    );
    outcome
}
