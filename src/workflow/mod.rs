//! Multi-step workflows over the gateway.
//!
//! A workflow validates everything it can with reads first, then issues its
//! mutations strictly one after another. Each planned step ends up
//! `Succeeded`, `Failed` or `Skipped`. Steps that already succeeded are never
//! undone: a half-finished run is reported for manual reconciliation.

pub mod purchase;
pub mod sale;

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use thiserror::Error;
use tracing::{error, info};

use crate::error::ClientError;
use crate::models::MovementType;
use crate::types::Id;

pub use purchase::complete_purchase;
pub use sale::{complete_sale, create_sale};

/// Errors raised before any mutation is sent
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Id },

    #[error("{kind} {id} is {status}; only pending ones can be completed")]
    NotPending { kind: &'static str, id: Id, status: String },

    #[error("{kind} has no line items to process")]
    NoLineItems { kind: &'static str },

    #[error("line {line_id} has no product")]
    MissingProduct { line_id: Id },

    #[error("line {line_id} has no warehouse; pass one explicitly")]
    MissingWarehouse { line_id: Id },

    #[error("warehouse {0} does not exist")]
    UnknownWarehouse(Id),

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationPolicy {
    /// Completed steps stay in place when a later one fails
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    CompletePurchase { purchase_id: Id },
    CreateInvoice { sale_id: Id, amount: Decimal },
    CompleteSale { sale_id: Id },
    CreateSale { cliente_id: Id, total: Decimal },
    AddSaleLine { product_id: Id, quantity: i64, unit_price: Decimal },
    RegisterMovement {
        movement_type: MovementType,
        product_id: Id,
        quantity: Decimal,
        warehouse_id: Id,
    },
}

impl Step {
    pub fn is_movement(&self) -> bool {
        matches!(self, Step::RegisterMovement { .. })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::CompletePurchase { purchase_id } => write!(f, "mark purchase {} completed", purchase_id),
            Step::CreateInvoice { sale_id, amount } => write!(f, "invoice sale {} for {}", sale_id, amount),
            Step::CompleteSale { sale_id } => write!(f, "mark sale {} completed", sale_id),
            Step::CreateSale { cliente_id, total } => write!(f, "open sale for client {} totalling {}", cliente_id, total),
            Step::AddSaleLine {
                product_id,
                quantity,
                unit_price,
            } => write!(f, "add {} x product {} at {}", quantity, product_id, unit_price),
            Step::RegisterMovement {
                movement_type,
                product_id,
                quantity,
                warehouse_id,
            } => write!(
                f,
                "{} {} of product {} at warehouse {}",
                movement_type, quantity, product_id, warehouse_id
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Failed(String),
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    #[serde(flatten)]
    pub step: Step,
    #[serde(flatten)]
    pub outcome: StepOutcome,
    /// Id of the record the step created or changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Id>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Completed,
    /// Some steps went through before one failed
    Partial,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub workflow: &'static str,
    pub subject_id: Option<Id>,
    pub policy: CompensationPolicy,
    pub steps: Vec<StepRecord>,
    /// A step failed because the session ended mid-run
    pub session_expired: bool,
}

impl WorkflowReport {
    /// Every step starts out `Skipped` until it runs
    pub(crate) fn plan(workflow: &'static str, subject_id: Option<Id>, steps: Vec<Step>) -> Self {
        info!(workflow, subject = ?subject_id, steps = steps.len(), "Starting workflow");
        Self {
            workflow,
            subject_id,
            policy: CompensationPolicy::None,
            steps: steps
                .into_iter()
                .map(|step| StepRecord {
                    step,
                    outcome: StepOutcome::Skipped,
                    record_id: None,
                })
                .collect(),
            session_expired: false,
        }
    }

    /// Await one step and record its outcome. Returns whether to go on.
    pub(crate) async fn run<F>(&mut self, index: usize, action: F) -> bool
    where
        F: Future<Output = Result<Id, ClientError>>,
    {
        let result = action.await;
        let workflow = self.workflow;
        let Some(record) = self.steps.get_mut(index) else {
            return false;
        };

        match result {
            Ok(id) => {
                info!(workflow, step = index + 1, record = id, "{}", record.step);
                record.outcome = StepOutcome::Succeeded;
                record.record_id = Some(id);
                true
            }
            Err(e) => {
                error!(workflow, step = index + 1, "{} failed: {}", record.step, e);
                record.outcome = StepOutcome::Failed(e.to_string());
                if matches!(e, ClientError::SessionExpired) {
                    self.session_expired = true;
                }
                false
            }
        }
    }

    pub fn status(&self) -> WorkflowStatus {
        let succeeded = self.count(|r| r.outcome == StepOutcome::Succeeded);
        if succeeded == self.steps.len() {
            WorkflowStatus::Completed
        } else if succeeded == 0 {
            WorkflowStatus::Failed
        } else {
            WorkflowStatus::Partial
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == WorkflowStatus::Completed
    }

    /// The step that stopped the run, if any
    pub fn failure(&self) -> Option<&StepRecord> {
        self.steps
            .iter()
            .find(|r| matches!(r.outcome, StepOutcome::Failed(_)))
    }

    pub fn movements_registered(&self) -> usize {
        self.count(|r| r.step.is_movement() && r.outcome == StepOutcome::Succeeded)
    }

    fn count(&self, predicate: impl Fn(&StepRecord) -> bool) -> usize {
        self.steps.iter().filter(|r| predicate(r)).count()
    }
}
