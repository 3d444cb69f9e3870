//! # Report Commands
//!
//! Dashboard widgets: today's takings, month-to-date revenue, and products
//! that need restocking.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::AppState;
use tally_core::{Money, Product};
use tally_db::SalesSummary;

const DEFAULT_LOW_STOCK_LIMIT: u32 = 10;
const MAX_LOW_STOCK_LIMIT: u32 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LowStockParams {
    #[serde(default)]
    pub limit: Option<u32>,
}

pub async fn get_today_sales_summary(state: &AppState) -> Result<SalesSummary, ApiError> {
    debug!("getTodaySalesSummary command");
    Ok(state.db.reports().today_sales_summary().await?)
}

pub async fn get_monthly_revenue(state: &AppState) -> Result<Money, ApiError> {
    debug!("getMonthlyRevenue command");
    Ok(state.db.reports().monthly_revenue().await?)
}

pub async fn get_low_stock_products(
    state: &AppState,
    params: LowStockParams,
) -> Result<Vec<Product>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LOW_STOCK_LIMIT)
        .clamp(1, MAX_LOW_STOCK_LIMIT);
    debug!(limit, "getLowStockProducts command");

    Ok(state.db.reports().low_stock_products(limit).await?)
}
