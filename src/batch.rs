//! Parallel batch computation.
//!
//! A batch is every employee of one company for one period. Employees are
//! independent: they are split across tokio's blocking pool and computed
//! against the same shared, read-only [`ConfigLoader`]. A failing employee
//! is reported next to the successful results; a missing rate table fails
//! the whole batch before any employee is computed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::calculation::compute_payslip;
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeInput, PayPeriod, PayslipResult};

/// Shared flag used to stop a running batch.
///
/// Workers check it before each employee and discard the employee they were
/// computing if it is raised in the meantime.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates a flag that is not raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once the flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A per-employee failure reported alongside the batch results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFailure {
    /// The employee that failed.
    pub employee_id: String,
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl EmployeeFailure {
    fn from_error(employee_id: &str, error: &EngineError) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Everything a batch produced. Result order is not guaranteed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// One payslip per successfully computed employee.
    pub results: Vec<PayslipResult>,
    /// One entry per employee that failed.
    pub failures: Vec<EmployeeFailure>,
    /// True when the batch was cancelled before every employee was computed.
    pub cancelled: bool,
}

struct ChunkOutcome {
    results: Vec<PayslipResult>,
    failures: Vec<EmployeeFailure>,
    fatal: Option<EngineError>,
    cancelled: bool,
}

fn run_chunk(
    config: &ConfigLoader,
    period: PayPeriod,
    employees: Vec<EmployeeInput>,
    cancel: &CancellationFlag,
) -> ChunkOutcome {
    let mut outcome = ChunkOutcome {
        results: Vec::with_capacity(employees.len()),
        failures: Vec::new(),
        fatal: None,
        cancelled: false,
    };

    for employee in employees {
        if cancel.is_cancelled() {
            outcome.cancelled = true;
            break;
        }

        let computed = compute_payslip(&employee, period, config);

        if cancel.is_cancelled() {
            outcome.cancelled = true;
            break;
        }

        match computed {
            Ok(payslip) => outcome.results.push(payslip),
            Err(error) if error.is_fatal() => {
                outcome.fatal = Some(error);
                break;
            }
            Err(error) => {
                tracing::warn!(
                    employee_id = %employee.employee_id,
                    code = error.code(),
                    error = %error,
                    "Employee failed"
                );
                outcome
                    .failures
                    .push(EmployeeFailure::from_error(&employee.employee_id, &error));
            }
        }
    }

    outcome
}

/// Computes payslips for every employee of a batch.
///
/// # Arguments
///
/// * `config` - Shared configuration; must hold a rate table for `period.year`
/// * `period` - The pay period
/// * `employees` - Normalized inputs, one per employee
/// * `cancel` - Cooperative cancellation flag
///
/// # Errors
///
/// Returns `RateTableNotFound` (or another configuration-class error) when
/// the batch cannot be computed at all. Per-employee errors never fail the
/// batch; they are listed in [`BatchOutcome::failures`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use payroll_engine::batch::{CancellationFlag, run_batch};
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::{EmployeeInput, EmploymentClass, PayPeriod};
/// use rust_decimal::Decimal;
///
/// # async fn example() -> Result<(), payroll_engine::error::EngineError> {
/// let config = Arc::new(ConfigLoader::load("./config/monaco")?);
/// let employees = vec![
///     EmployeeInput::new("S001", Decimal::from(3500), EmploymentClass::Standard, "MC"),
///     EmployeeInput::new("S002", Decimal::from(4200), EmploymentClass::Standard, "FR"),
/// ];
/// let outcome = run_batch(config, PayPeriod::new(2025, 3), employees, CancellationFlag::new()).await?;
/// assert_eq!(outcome.results.len(), 2);
/// # Ok(())
/// # }
/// ```
pub async fn run_batch(
    config: Arc<ConfigLoader>,
    period: PayPeriod,
    employees: Vec<EmployeeInput>,
    cancel: CancellationFlag,
) -> EngineResult<BatchOutcome> {
    let start = Instant::now();
    config.rate_table(period.year)?;

    let total = employees.len();
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .clamp(1, total.max(1));
    let chunk_size = total.div_ceil(workers).max(1);

    let mut chunks: Vec<Vec<EmployeeInput>> = Vec::with_capacity(workers);
    let mut remaining = employees.into_iter().peekable();
    while remaining.peek().is_some() {
        chunks.push(remaining.by_ref().take(chunk_size).collect());
    }

    let mut tasks = JoinSet::new();
    for chunk in chunks {
        let config = Arc::clone(&config);
        let cancel = cancel.clone();
        let ids: Vec<String> = chunk.iter().map(|e| e.employee_id.clone()).collect();
        tasks.spawn(async move {
            let joined =
                tokio::task::spawn_blocking(move || run_chunk(&config, period, chunk, &cancel))
                    .await;
            (ids, joined)
        });
    }

    let mut outcome = BatchOutcome::default();
    let mut fatal = None;

    while let Some(joined) = tasks.join_next().await {
        let (ids, chunk) = match joined {
            Ok(pair) => pair,
            Err(error) => {
                return Err(EngineError::CalculationError {
                    message: format!("batch worker failed: {}", error),
                });
            }
        };
        match chunk {
            Ok(chunk) => {
                outcome.results.extend(chunk.results);
                outcome.failures.extend(chunk.failures);
                outcome.cancelled |= chunk.cancelled;
                if fatal.is_none() {
                    fatal = chunk.fatal;
                }
            }
            Err(error) => {
                let failure = EngineError::CalculationError {
                    message: format!("worker aborted: {}", error),
                };
                outcome.failures.extend(
                    ids.iter()
                        .map(|id| EmployeeFailure::from_error(id, &failure)),
                );
            }
        }
    }

    if let Some(error) = fatal {
        tracing::error!(error = %error, "Batch aborted by configuration error");
        return Err(error);
    }

    tracing::info!(
        period = %period.label(),
        employees = total,
        results = outcome.results.len(),
        failures = outcome.failures.len(),
        cancelled = outcome.cancelled,
        duration_ms = start.elapsed().as_millis() as u64,
        "Batch completed"
    );

    Ok(outcome)
}
