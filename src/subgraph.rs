// src/subgraph.rs
use eyre::{eyre, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Handle on one subgraph endpoint. Built once at startup and shared;
/// requests are read-only queries with a fixed document and a variables
/// object.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    http: Client,
    url: String,
}

impl SubgraphClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self { http, url: url.into() })
    }

    /// POST a query document with retries and decode the `data` payload.
    /// A GraphQL-level error or a null `data` is an upstream failure, never
    /// an empty result.
    pub async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let payload = json!({ "query": query, "variables": variables });

        for attempt in 1..=3 {
            info!("📡 Sending subgraph query → {} (attempt {})", self.url, attempt);

            match self.http.post(&self.url).json(&payload).send().await {
                Ok(resp) => {
                    if resp.status() != StatusCode::OK {
                        return Err(eyre!("subgraph error: HTTP {}", resp.status()));
                    }
                    let body: GraphQlResponse<T> = resp.json().await?;
                    if let Some(err) = body.errors.first() {
                        return Err(eyre!("subgraph error: {}", err.message));
                    }
                    return body.data.ok_or_else(|| eyre!("subgraph returned no data"));
                }
                Err(e) if attempt < 3 => {
                    warn!("subgraph request failed (attempt {}): {}. Retrying...", attempt, e);
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
                Err(e) => return Err(eyre!("subgraph request failed after 3 retries: {}", e)),
            }
        }

        Err(eyre!("unreachable: retries exhausted"))
    }
}

// Fixed query documents. Entity and field names are the subgraph's wire
// contract; do not edit them to match Rust naming.

/// All five stake event lists in one round trip, for the stats report.
pub const STAKE_STATS_QUERY: &str = r#"
  query GetEnhancedStakeStats {
    deposits {
      block_number
      timestamp_
      transactionHash_
      contractId_
      assets
      owner
    }
    withdraws {
      block_number
      timestamp_
      transactionHash_
      contractId_
      assets
      owner
    }
    rewardsReceiveds {
      block_number
      timestamp_
      transactionHash_
      contractId_
      amount
    }
    approvals {
      block_number
      timestamp_
      transactionHash_
      contractId_
      owner
      spender
      value
    }
    transfers {
      block_number
      timestamp_
      transactionHash_
      contractId_
      from
      to
      value
    }
  }
"#;

pub const DEPOSITS_QUERY: &str = r#"
  query GetDeposits(
    $first: Int
    $orderBy: Deposit_orderBy
    $orderDirection: OrderDirection
    $where: Deposit_filter
  ) {
    deposits(first: $first, orderBy: $orderBy, orderDirection: $orderDirection, where: $where) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      sender
      owner
      assets
      shares
    }
  }
"#;

pub const WITHDRAWS_QUERY: &str = r#"
  query GetWithdraws(
    $first: Int
    $orderBy: Withdraw_orderBy
    $orderDirection: OrderDirection
    $where: Withdraw_filter
  ) {
    withdraws(first: $first, orderBy: $orderBy, orderDirection: $orderDirection, where: $where) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      sender
      receiver
      owner
      assets
      shares
    }
  }
"#;

pub const REWARDS_RECEIVED_QUERY: &str = r#"
  query GetRewardsReceived(
    $first: Int
    $orderBy: RewardsReceived_orderBy
    $orderDirection: OrderDirection
    $where: RewardsReceived_filter
  ) {
    rewardsReceiveds(first: $first, orderBy: $orderBy, orderDirection: $orderDirection, where: $where) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      amount
    }
  }
"#;

pub const APPROVALS_QUERY: &str = r#"
  query GetApprovals(
    $first: Int
    $orderBy: Approval_orderBy
    $orderDirection: OrderDirection
    $where: Approval_filter
  ) {
    approvals(first: $first, orderBy: $orderBy, orderDirection: $orderDirection, where: $where) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      owner
      spender
      value
    }
  }
"#;

pub const TRANSFERS_QUERY: &str = r#"
  query GetTransfers(
    $first: Int
    $orderBy: Transfer_orderBy
    $orderDirection: OrderDirection
    $where: Transfer_filter
  ) {
    transfers(first: $first, orderBy: $orderBy, orderDirection: $orderDirection, where: $where) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      from
      to
      value
    }
  }
"#;

/// Totals feeding the overview card. This subgraph spells the withdrawal
/// entity `withdrawals`.
pub const PROTOCOL_OVERVIEW_QUERY: &str = r#"
  query GetProtocolOverview {
    deposits {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      owner
      assets
    }
    withdrawals {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      owner
      assets
    }
    rewardsReceiveds {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      amount
    }
    lockedAmountRedistributeds {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      from
      to
      amount
    }
  }
"#;

pub const HISTORICAL_TRENDS_QUERY: &str = r#"
  query GetHistoricalTrends {
    deposits(orderBy: timestamp_, orderDirection: asc) {
      block_number
      timestamp_
      transactionHash_
      contractId_
      owner
      assets
    }
    rewardsReceiveds(orderBy: timestamp_, orderDirection: asc) {
      block_number
      timestamp_
      transactionHash_
      contractId_
      amount
    }
  }
"#;

pub const USER_STAKE_QUERY: &str = r#"
  query GetUserStake($owner: String!) {
    deposits(where: { owner: $owner }) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      sender
      owner
      assets
      shares
    }
    withdrawals(where: { owner: $owner }) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      sender
      receiver
      owner
      assets
      shares
    }
    rewardsReceiveds(where: { contractId: $owner }) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      amount
    }
    lockedAmountRedistributeds(where: { to: $owner }) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      from
      to
      amount
    }
  }
"#;

pub const MINTER_UPDATED_QUERY: &str = r#"
  query GetMinterUpdates(
    $first: Int
    $orderBy: MinterUpdated_orderBy
    $orderDirection: OrderDirection
    $where: MinterUpdated_filter
  ) {
    minterUpdateds(first: $first, orderBy: $orderBy, orderDirection: $orderDirection, where: $where) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      newMinter
      oldMinter
    }
  }
"#;

pub const OWNERSHIP_TRANSFERS_QUERY: &str = r#"
  query GetOwnershipTransferreds(
    $first: Int
    $orderBy: OwnershipTransferred_orderBy
    $orderDirection: OrderDirection
    $where: OwnershipTransferred_filter
  ) {
    ownershipTransferreds(first: $first, orderBy: $orderBy, orderDirection: $orderDirection, where: $where) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      previousOwner
      newOwner
    }
  }
"#;

pub const MINTS_QUERY: &str = r#"
  query GetMints($first: Int, $orderBy: Mint_orderBy, $orderDirection: OrderDirection) {
    mints(first: $first, orderBy: $orderBy, orderDirection: $orderDirection) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      order_id
      benefactor
      beneficiary
      minter
      collateral_asset
      collateral_amount
      usde_amount
    }
  }
"#;

pub const BENEFACTOR_ADDED_QUERY: &str = r#"
  query GetBenefactorAdded($first: Int, $orderBy: BenefactorAdded_orderBy, $orderDirection: OrderDirection) {
    benefactorAddeds(first: $first, orderBy: $orderBy, orderDirection: $orderDirection) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      benefactor
    }
  }
"#;

pub const BENEFICIARY_ADDED_QUERY: &str = r#"
  query GetBeneficiaryAdded($first: Int, $orderBy: BeneficiaryAdded_orderBy, $orderDirection: OrderDirection) {
    beneficiaryAddeds(first: $first, orderBy: $orderBy, orderDirection: $orderDirection) {
      id
      block_number
      timestamp_
      transactionHash_
      contractId_
      benefactor
      beneficiary
    }
  }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Deposit;

    #[derive(Debug, Deserialize)]
    struct DepositData {
        deposits: Vec<Deposit>,
    }

    #[test]
    fn envelope_surfaces_data() {
        let body = r#"{
            "data": {
                "deposits": [{
                    "id": "0x1-1",
                    "block_number": "100",
                    "timestamp_": "1704067200",
                    "transactionHash_": "0x1",
                    "contractId_": "0xc",
                    "owner": "0xA",
                    "assets": "1"
                }]
            }
        }"#;
        let parsed: GraphQlResponse<DepositData> = serde_json::from_str(body).unwrap();
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.data.unwrap().deposits.len(), 1);
    }

    #[test]
    fn envelope_surfaces_errors() {
        let body = r#"{
            "data": null,
            "errors": [{ "message": "indexing_error" }]
        }"#;
        let parsed: GraphQlResponse<DepositData> = serde_json::from_str(body).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.errors[0].message, "indexing_error");
    }
}
