// src/models.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Subgraph entities. Field spellings (`timestamp_`, `transactionHash_`,
// `contractId_`) follow the subgraph schema so rows pass through the API
// byte-for-byte. Amount-bearing fields stay strings: they are 10^18-scaled
// integers that must never touch a float.

/// A staking vault deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub block_number: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: String,
    #[serde(rename = "transactionHash_")]
    pub transaction_hash: String,
    #[serde(rename = "contractId_")]
    pub contract_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<String>,
}

/// A staking vault withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub block_number: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: String,
    #[serde(rename = "transactionHash_")]
    pub transaction_hash: String,
    #[serde(rename = "contractId_")]
    pub contract_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<String>,
}

/// A reward payout into the staking contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardReceived {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub block_number: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: String,
    #[serde(rename = "transactionHash_")]
    pub transaction_hash: String,
    #[serde(rename = "contractId_")]
    pub contract_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

/// Locked stake redistributed after an unstake window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedAmountRedistributed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub block_number: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: String,
    #[serde(rename = "transactionHash_")]
    pub transaction_hash: String,
    #[serde(rename = "contractId_")]
    pub contract_id: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

/// An ERC20 approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub block_number: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: String,
    #[serde(rename = "transactionHash_")]
    pub transaction_hash: String,
    #[serde(rename = "contractId_")]
    pub contract_id: String,
    pub owner: String,
    pub spender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// An ERC20 transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub block_number: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: String,
    #[serde(rename = "transactionHash_")]
    pub transaction_hash: String,
    #[serde(rename = "contractId_")]
    pub contract_id: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A collateral-for-token mint order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub block_number: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: String,
    #[serde(rename = "transactionHash_")]
    pub transaction_hash: String,
    #[serde(rename = "contractId_")]
    pub contract_id: String,
    pub order_id: String,
    pub benefactor: String,
    pub beneficiary: String,
    pub minter: String,
    pub collateral_asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usde_amount: Option<String>,
}

/// Minter role rotation on the token contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinterUpdated {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub block_number: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: String,
    #[serde(rename = "transactionHash_")]
    pub transaction_hash: String,
    #[serde(rename = "contractId_")]
    pub contract_id: String,
    #[serde(rename = "newMinter")]
    pub new_minter: String,
    #[serde(rename = "oldMinter")]
    pub old_minter: String,
}

/// Contract ownership handover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub block_number: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: String,
    #[serde(rename = "transactionHash_")]
    pub transaction_hash: String,
    #[serde(rename = "contractId_")]
    pub contract_id: String,
    #[serde(rename = "previousOwner")]
    pub previous_owner: String,
    #[serde(rename = "newOwner")]
    pub new_owner: String,
}

/// Benefactor allow-listed on the minting contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefactorAdded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub block_number: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: String,
    #[serde(rename = "transactionHash_")]
    pub transaction_hash: String,
    #[serde(rename = "contractId_")]
    pub contract_id: String,
    pub benefactor: String,
}

/// Beneficiary allow-listed on the minting contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeneficiaryAdded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub block_number: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: String,
    #[serde(rename = "transactionHash_")]
    pub transaction_hash: String,
    #[serde(rename = "contractId_")]
    pub contract_id: String,
    pub benefactor: String,
    pub beneficiary: String,
}

// Derived report shapes. Monetary fields are display-unit decimal strings,
// converted once at the formatting step; counts are plain numbers.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolMetrics {
    pub total_deposits: String,
    pub total_withdrawals: String,
    /// Deposited minus withdrawn; negative when withdrawals run ahead.
    pub net_staked: String,
    pub total_rewards: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopStaker {
    pub owner: String,
    pub assets: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopApprover {
    pub owner: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopSpender {
    pub spender: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalsMetrics {
    pub total_approved_value: String,
    pub top_approvers: Vec<TopApprover>,
    pub most_approved_spenders: Vec<TopSpender>,
}

/// One address's share of transfer traffic, counted on both sides.
#[derive(Debug, Clone, Serialize)]
pub struct TransferActivity {
    pub address: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransfersMetrics {
    pub total_transferred_value: String,
    pub top_transfer_addresses: Vec<TransferActivity>,
}

/// The full dashboard report for one reporting window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub protocol_metrics: ProtocolMetrics,
    pub unique_active_users: usize,
    pub top_stakers: Vec<TopStaker>,
    pub approvals_metrics: ApprovalsMetrics,
    pub transfers_metrics: TransfersMetrics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolOverview {
    pub total_staked: String,
    pub total_rewards_distributed: String,
    pub total_locked: String,
}

/// Per-day sums keyed by UTC date, kept in exact base units for charting.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalTrends {
    pub deposits: BTreeMap<String, String>,
    pub rewards: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStakeReport {
    pub total_staked: String,
    pub total_rewards: String,
    pub total_locked: String,
    pub deposits: Vec<Deposit>,
    pub withdrawals: Vec<Withdrawal>,
    pub rewards: Vec<RewardReceived>,
    pub locked_amounts: Vec<LockedAmountRedistributed>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStats {
    pub latest_approvals: Vec<Approval>,
    pub top_transfers: Vec<Transfer>,
}

/// Flattened market quote from the price API. Prices are floats upstream
/// and stay floats; they are market data, not base-unit amounts.
#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub percent_change_1h: f64,
    pub percent_change_24h: f64,
    pub percent_change_7d: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circulating_supply: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    pub last_updated: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_deserializes_subgraph_row() {
        let row = serde_json::json!({
            "block_number": "18950000",
            "timestamp_": "1704067200",
            "transactionHash_": "0xabc",
            "contractId_": "0x9d39a5de30e57443bff2a8307a4256c8797a3497",
            "owner": "0xA",
            "assets": "1000000000000000000"
        });
        let deposit: Deposit = serde_json::from_value(row).unwrap();
        assert_eq!(deposit.timestamp, "1704067200");
        assert_eq!(deposit.assets.as_deref(), Some("1000000000000000000"));
        assert!(deposit.id.is_none());
        assert!(deposit.shares.is_none());
    }

    #[test]
    fn transfer_round_trips_wire_field_names() {
        let row = serde_json::json!({
            "id": "0xdead-1",
            "block_number": "1",
            "timestamp_": "1700000000",
            "transactionHash_": "0xdead",
            "contractId_": "0xc0ffee",
            "from": "0xX",
            "to": "0xY",
            "value": "5"
        });
        let transfer: Transfer = serde_json::from_value(row.clone()).unwrap();
        let back = serde_json::to_value(&transfer).unwrap();
        assert_eq!(back, row);
    }
}
