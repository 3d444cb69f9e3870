//! # Transaction Commands

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::AppState;
use tally_core::{CoreError, NewTransaction, TransactionDetail, TransactionStatus};
use tally_db::{Pagination, TransactionFilter, TransactionPage};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateTransactionParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub request: NewTransaction,
    /// Cashier ringing up the sale
    pub creator_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateStatusParams {
    pub id: String,
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetTransactionsParams {
    #[serde(flatten)]
    pub filter: TransactionFilter,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionIdParams {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionNumberParams {
    pub transaction_number: String,
}

pub async fn create_transaction(
    state: &AppState,
    params: CreateTransactionParams,
) -> Result<TransactionDetail, ApiError> {
    debug!(
        creator = %params.creator_id,
        lines = params.request.items.len(),
        "createTransaction command"
    );

    let detail = state
        .db
        .engine()
        .create_transaction(&params.request, &params.creator_id)
        .await?;

    Ok(detail)
}

pub async fn update_transaction_status(
    state: &AppState,
    params: UpdateStatusParams,
) -> Result<TransactionDetail, ApiError> {
    debug!(id = %params.id, status = %params.status, "updateTransactionStatus command");

    let detail = state
        .db
        .engine()
        .update_transaction_status(&params.id, params.status)
        .await?;

    Ok(detail)
}

pub async fn get_transactions(
    state: &AppState,
    params: GetTransactionsParams,
) -> Result<TransactionPage, ApiError> {
    debug!(?params, "getTransactions command");

    if let (Some(from), Some(to)) = (params.filter.date_from, params.filter.date_to) {
        if from > to {
            return Err(ApiError::validation("date_from must not be after date_to"));
        }
    }

    let pagination = Pagination::new(params.page, params.limit);
    let page = state.db.transactions().list(&params.filter, pagination).await?;

    Ok(page)
}

pub async fn get_transaction_by_id(
    state: &AppState,
    params: TransactionIdParams,
) -> Result<TransactionDetail, ApiError> {
    debug!(id = %params.id, "getTransactionById command");

    state
        .db
        .transactions()
        .get_by_id(&params.id)
        .await?
        .ok_or_else(|| CoreError::TransactionNotFound(params.id).into())
}

pub async fn get_transaction_by_number(
    state: &AppState,
    params: TransactionNumberParams,
) -> Result<TransactionDetail, ApiError> {
    debug!(number = %params.transaction_number, "getTransactionByNumber command");

    state
        .db
        .transactions()
        .get_by_number(&params.transaction_number)
        .await?
        .ok_or_else(|| CoreError::TransactionNotFound(params.transaction_number).into())
}
