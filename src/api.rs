use alloy::primitives::Address;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::aggregator::{self, EventLists, OverviewLists, RankBy, ReportOptions, TrendLists, UserStakeLists};
use crate::config::Config;
use crate::error::ReportError;
use crate::models::{
    AggregateReport, Approval, BenefactorAdded, BeneficiaryAdded, Deposit, HistoricalTrends,
    Mint, MinterUpdated, OwnershipTransferred, PriceQuote, ProtocolOverview, RewardReceived,
    TokenStats, Transfer, UserStakeReport, Withdrawal,
};
use crate::price::PriceClient;
use crate::subgraph::{self, SubgraphClient};
use crate::units;

/// Shared handles, built once in `main` and injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub stake: SubgraphClient,
    pub token: SubgraphClient,
    pub mint: SubgraphClient,
    pub price: PriceClient,
    pub price_symbol: String,
    pub options: ReportOptions,
}

/// Error type for the API. Upstream and aggregation failures surface as
/// 500s with the reason in the body; a dashboard must show "unavailable",
/// never a silent zero.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("{0}")]
    Upstream(eyre::Report),
}

impl From<eyre::Report> for ApiError {
    fn from(err: eyre::Report) -> Self {
        Self::Upstream(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Report(_) | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("api error, code {}: {:?}", code, self);

        (code, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Query parameters shared by the list routes; each route reads the subset
/// its entity supports and ignores the rest.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub first: Option<u32>,
    pub order_by: Option<String>,
    pub order_direction: Option<String>,
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub owner: Option<String>,
    pub spender: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "contractId_")]
    pub contract_id: Option<String>,
    pub new_minter: Option<String>,
    pub old_minter: Option<String>,
    pub previous_owner: Option<String>,
    pub new_owner: Option<String>,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
}

impl ListQuery {
    fn first(&self) -> u32 {
        self.first.unwrap_or(10)
    }

    fn order_by(&self) -> &str {
        self.order_by.as_deref().unwrap_or("timestamp_")
    }

    fn order_direction(&self) -> &str {
        self.order_direction.as_deref().unwrap_or("desc")
    }

    fn variables(&self, filters: Map<String, Value>) -> Value {
        json!({
            "first": self.first(),
            "orderBy": self.order_by(),
            "orderDirection": self.order_direction(),
            "where": filters,
        })
    }
}

/// Per-request overrides for the stats report.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub top_n: Option<usize>,
    pub rank_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserStakeQuery {
    pub owner: Option<String>,
}

/// Validate an address-typed query parameter and normalize it to the
/// lowercase hex form the subgraphs index by.
fn parse_address(name: &'static str, value: &str) -> Result<String, ApiError> {
    let addr: Address = value
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid address for `{name}`: {value}")))?;
    Ok(format!("{addr:#x}"))
}

/// Insert `param` into `filters` as a validated, normalized address.
fn address_filter(
    filters: &mut Map<String, Value>,
    name: &'static str,
    param: &Option<String>,
) -> Result<(), ApiError> {
    if let Some(value) = param {
        filters.insert(name.to_string(), parse_address(name, value)?.into());
    }
    Ok(())
}

// ---------- response envelopes per entity ----------

#[derive(Debug, Deserialize)]
struct DepositsData {
    deposits: Vec<Deposit>,
}

#[derive(Debug, Deserialize)]
struct WithdrawsData {
    withdraws: Vec<Withdrawal>,
}

#[derive(Debug, Deserialize)]
struct RewardsData {
    #[serde(rename = "rewardsReceiveds")]
    rewards_receiveds: Vec<RewardReceived>,
}

#[derive(Debug, Deserialize)]
struct ApprovalsData {
    approvals: Vec<Approval>,
}

#[derive(Debug, Deserialize)]
struct TransfersData {
    transfers: Vec<Transfer>,
}

#[derive(Debug, Deserialize)]
struct MinterUpdatedsData {
    #[serde(rename = "minterUpdateds")]
    minter_updateds: Vec<MinterUpdated>,
}

#[derive(Debug, Deserialize)]
struct OwnershipTransferredsData {
    #[serde(rename = "ownershipTransferreds")]
    ownership_transferreds: Vec<OwnershipTransferred>,
}

#[derive(Debug, Deserialize)]
struct MintsData {
    mints: Vec<Mint>,
}

#[derive(Debug, Deserialize)]
struct BenefactorAddedsData {
    #[serde(rename = "benefactorAddeds")]
    benefactor_addeds: Vec<BenefactorAdded>,
}

#[derive(Debug, Deserialize)]
struct BeneficiaryAddedsData {
    #[serde(rename = "beneficiaryAddeds")]
    beneficiary_addeds: Vec<BeneficiaryAdded>,
}

// ---------- handlers ----------

/// Full aggregate report over the staking window.
async fn stake_stats(
    State(state): State<Arc<AppState>>,
    Query(q): Query<StatsQuery>,
) -> Result<Json<AggregateReport>, ApiError> {
    let mut opts = state.options;
    if let Some(top_n) = q.top_n {
        opts.top_n = top_n;
    }
    if let Some(rank_by) = q.rank_by.as_deref() {
        opts.rank_by = rank_by.parse::<RankBy>().map_err(ApiError::BadRequest)?;
    }

    let lists: EventLists = state.stake.query(subgraph::STAKE_STATS_QUERY, json!({})).await?;
    let report = aggregator::build_report(&lists, &opts)?;
    Ok(Json(report))
}

async fn protocol_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProtocolOverview>, ApiError> {
    let lists: OverviewLists =
        state.token.query(subgraph::PROTOCOL_OVERVIEW_QUERY, json!({})).await?;
    let overview = aggregator::build_protocol_overview(&lists, state.options.decimals)?;
    Ok(Json(overview))
}

async fn historical_trends(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HistoricalTrends>, ApiError> {
    let lists: TrendLists =
        state.stake.query(subgraph::HISTORICAL_TRENDS_QUERY, json!({})).await?;
    let trends = aggregator::build_historical_trends(&lists)?;
    Ok(Json(trends))
}

async fn user_stake(
    State(state): State<Arc<AppState>>,
    Query(q): Query<UserStakeQuery>,
) -> Result<Json<UserStakeReport>, ApiError> {
    let owner = q.owner.as_deref().ok_or_else(|| {
        ApiError::BadRequest("owner is required".to_string())
    })?;
    let owner = parse_address("owner", owner)?;

    let lists: UserStakeLists =
        state.token.query(subgraph::USER_STAKE_QUERY, json!({ "owner": owner })).await?;
    let report = aggregator::build_user_stake(lists, state.options.decimals)?;
    Ok(Json(report))
}

async fn stake_deposits(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Deposit>>, ApiError> {
    let mut filters = Map::new();
    address_filter(&mut filters, "sender", &q.sender)?;
    address_filter(&mut filters, "owner", &q.owner)?;
    address_filter(&mut filters, "contractId_", &q.contract_id)?;

    let data: DepositsData =
        state.stake.query(subgraph::DEPOSITS_QUERY, q.variables(filters)).await?;
    Ok(Json(data.deposits))
}

async fn stake_withdraws(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Withdrawal>>, ApiError> {
    let mut filters = Map::new();
    address_filter(&mut filters, "sender", &q.sender)?;
    address_filter(&mut filters, "receiver", &q.receiver)?;
    address_filter(&mut filters, "owner", &q.owner)?;

    let data: WithdrawsData =
        state.stake.query(subgraph::WITHDRAWS_QUERY, q.variables(filters)).await?;
    Ok(Json(data.withdraws))
}

async fn stake_rewards_received(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<RewardReceived>>, ApiError> {
    let data: RewardsData = state
        .stake
        .query(subgraph::REWARDS_RECEIVED_QUERY, q.variables(Map::new()))
        .await?;
    Ok(Json(data.rewards_receiveds))
}

async fn stake_approvals(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Approval>>, ApiError> {
    let mut filters = Map::new();
    address_filter(&mut filters, "owner", &q.owner)?;
    address_filter(&mut filters, "spender", &q.spender)?;

    let data: ApprovalsData =
        state.stake.query(subgraph::APPROVALS_QUERY, q.variables(filters)).await?;
    Ok(Json(data.approvals))
}

async fn stake_transfers(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Transfer>>, ApiError> {
    let mut filters = Map::new();
    address_filter(&mut filters, "from", &q.from)?;
    address_filter(&mut filters, "to", &q.to)?;

    let data: TransfersData =
        state.stake.query(subgraph::TRANSFERS_QUERY, q.variables(filters)).await?;
    Ok(Json(data.transfers))
}

async fn token_transfers(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Transfer>>, ApiError> {
    let mut filters = Map::new();
    address_filter(&mut filters, "from", &q.from)?;
    address_filter(&mut filters, "to", &q.to)?;

    let data: TransfersData =
        state.token.query(subgraph::TRANSFERS_QUERY, q.variables(filters)).await?;
    Ok(Json(data.transfers))
}

async fn token_approvals(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Approval>>, ApiError> {
    let mut filters = Map::new();
    address_filter(&mut filters, "owner", &q.owner)?;
    address_filter(&mut filters, "spender", &q.spender)?;
    if let Some(min) = q.min_value.as_deref() {
        let min = units::parse_base_amount("minValue", min)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        filters.insert("value_gte".to_string(), min.to_string().into());
    }
    if let Some(max) = q.max_value.as_deref() {
        let max = units::parse_base_amount("maxValue", max)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        filters.insert("value_lte".to_string(), max.to_string().into());
    }

    let data: ApprovalsData =
        state.token.query(subgraph::APPROVALS_QUERY, q.variables(filters)).await?;
    Ok(Json(data.approvals))
}

async fn token_minter_updated(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<MinterUpdated>>, ApiError> {
    let mut filters = Map::new();
    address_filter(&mut filters, "newMinter", &q.new_minter)?;
    address_filter(&mut filters, "oldMinter", &q.old_minter)?;

    let data: MinterUpdatedsData =
        state.token.query(subgraph::MINTER_UPDATED_QUERY, q.variables(filters)).await?;
    Ok(Json(data.minter_updateds))
}

async fn token_ownership_transfers(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<OwnershipTransferred>>, ApiError> {
    let mut filters = Map::new();
    address_filter(&mut filters, "previousOwner", &q.previous_owner)?;
    address_filter(&mut filters, "newOwner", &q.new_owner)?;

    let data: OwnershipTransferredsData = state
        .token
        .query(subgraph::OWNERSHIP_TRANSFERS_QUERY, q.variables(filters))
        .await?;
    Ok(Json(data.ownership_transferreds))
}

/// Latest approvals and top transfers side by side, with values converted
/// to display units through the integer pipeline.
async fn token_stats(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<TokenStats>, ApiError> {
    let decimals = state.options.decimals;
    let approvals: ApprovalsData =
        state.token.query(subgraph::APPROVALS_QUERY, q.variables(Map::new())).await?;
    let transfers: TransfersData =
        state.token.query(subgraph::TRANSFERS_QUERY, q.variables(Map::new())).await?;

    let latest_approvals = approvals
        .approvals
        .into_iter()
        .map(|mut approval| {
            if let Some(raw) = approval.value.as_deref() {
                approval.value = Some(units::convert("value", raw, decimals)?);
            }
            Ok(approval)
        })
        .collect::<Result<Vec<_>, ReportError>>()?;

    let top_transfers = transfers
        .transfers
        .into_iter()
        .map(|mut transfer| {
            if let Some(raw) = transfer.value.as_deref() {
                transfer.value = Some(units::convert("value", raw, decimals)?);
            }
            Ok(transfer)
        })
        .collect::<Result<Vec<_>, ReportError>>()?;

    Ok(Json(TokenStats { latest_approvals, top_transfers }))
}

async fn mint_mints(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Mint>>, ApiError> {
    let data: MintsData =
        state.mint.query(subgraph::MINTS_QUERY, q.variables(Map::new())).await?;
    Ok(Json(data.mints))
}

async fn mint_benefactor_added(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<BenefactorAdded>>, ApiError> {
    let data: BenefactorAddedsData =
        state.mint.query(subgraph::BENEFACTOR_ADDED_QUERY, q.variables(Map::new())).await?;
    Ok(Json(data.benefactor_addeds))
}

async fn mint_beneficiary_added(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<BeneficiaryAdded>>, ApiError> {
    let data: BeneficiaryAddedsData =
        state.mint.query(subgraph::BENEFICIARY_ADDED_QUERY, q.variables(Map::new())).await?;
    Ok(Json(data.beneficiary_addeds))
}

async fn price_quote(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PriceQuote>, ApiError> {
    let quote = state.price.latest_quote(&state.price_symbol).await?;
    Ok(Json(quote))
}

pub async fn serve(cfg: Config, state: Arc<AppState>) -> eyre::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(|| async { "Stake dashboard API running" }))
        .route("/stake/stats", get(stake_stats))
        .route("/stake/protocol-overview", get(protocol_overview))
        .route("/stake/historical-trends", get(historical_trends))
        .route("/stake/user-stake", get(user_stake))
        .route("/stake/deposits", get(stake_deposits))
        .route("/stake/withdraws", get(stake_withdraws))
        .route("/stake/rewards-received", get(stake_rewards_received))
        .route("/stake/approvals", get(stake_approvals))
        .route("/stake/transfers", get(stake_transfers))
        .route("/token/transfers", get(token_transfers))
        .route("/token/approvals", get(token_approvals))
        .route("/token/minter-updated", get(token_minter_updated))
        .route("/token/ownership-transfers", get(token_ownership_transfers))
        .route("/token/stats", get(token_stats))
        .route("/mint/mints", get(mint_mints))
        .route("/mint/benefactor-added", get(mint_benefactor_added))
        .route("/mint/beneficiary-added", get(mint_beneficiary_added))
        .route("/price", get(price_quote))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], cfg.port));
    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
