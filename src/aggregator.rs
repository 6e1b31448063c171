use chrono::DateTime;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

use crate::error::ReportError;
use crate::models::{
    AggregateReport, Approval, ApprovalsMetrics, Deposit, HistoricalTrends,
    LockedAmountRedistributed, ProtocolMetrics, ProtocolOverview, RewardReceived, TopApprover,
    TopSpender, TopStaker, Transfer, TransferActivity, TransfersMetrics, UserStakeReport,
    Withdrawal,
};
use crate::units;

/// Basis for the top-stakers ranking: gross deposits, or deposits net of
/// withdrawals per owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Gross,
    Net,
}

impl FromStr for RankBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gross" => Ok(RankBy::Gross),
            "net" => Ok(RankBy::Net),
            other => Err(format!("unknown ranking basis `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub decimals: u32,
    pub top_n: usize,
    pub rank_by: RankBy,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { decimals: 18, top_n: 10, rank_by: RankBy::Gross }
    }
}

/// The five stake-subgraph event lists for one reporting window, as
/// deserialized from the combined stats query. `None` means the response
/// omitted the list entirely, which [`build_report`] treats as fatal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventLists {
    pub deposits: Option<Vec<Deposit>>,
    #[serde(rename = "withdraws")]
    pub withdrawals: Option<Vec<Withdrawal>>,
    #[serde(rename = "rewardsReceiveds")]
    pub rewards: Option<Vec<RewardReceived>>,
    pub approvals: Option<Vec<Approval>>,
    pub transfers: Option<Vec<Transfer>>,
}

/// Event lists behind the protocol overview. This subgraph spells the
/// entity `withdrawals`, unlike the stake stats query's `withdraws`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewLists {
    pub deposits: Option<Vec<Deposit>>,
    pub withdrawals: Option<Vec<Withdrawal>>,
    #[serde(rename = "rewardsReceiveds")]
    pub rewards: Option<Vec<RewardReceived>>,
    #[serde(rename = "lockedAmountRedistributeds")]
    pub locked: Option<Vec<LockedAmountRedistributed>>,
}

/// Deposits and rewards ordered by timestamp, for day bucketing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendLists {
    pub deposits: Option<Vec<Deposit>>,
    #[serde(rename = "rewardsReceiveds")]
    pub rewards: Option<Vec<RewardReceived>>,
}

/// One owner's event lists from the user-stake query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserStakeLists {
    pub deposits: Option<Vec<Deposit>>,
    pub withdrawals: Option<Vec<Withdrawal>>,
    #[serde(rename = "rewardsReceiveds")]
    pub rewards: Option<Vec<RewardReceived>>,
    #[serde(rename = "lockedAmountRedistributeds")]
    pub locked: Option<Vec<LockedAmountRedistributed>>,
}

/// Sum a base-unit field across `items`; a missing field counts as zero.
/// Accumulation is unbounded-width, so event values past 2^64 are exact.
pub fn sum_field<T>(
    items: &[T],
    field: &'static str,
    value: impl Fn(&T) -> Option<&str>,
) -> Result<BigUint, ReportError> {
    let mut total = BigUint::zero();
    for item in items {
        if let Some(raw) = value(item) {
            total += units::parse_base_amount(field, raw)?;
        }
    }
    Ok(total)
}

/// Group `items` by `key`, big-integer-sum `field` per group, and return the
/// `n` largest sums in descending order. Equal sums order by key so the
/// ranking is reproducible run to run.
pub fn rank_by_value<T>(
    items: &[T],
    field: &'static str,
    key: impl Fn(&T) -> &str,
    value: impl Fn(&T) -> Option<&str>,
    n: usize,
) -> Result<Vec<(String, BigUint)>, ReportError> {
    let mut sums: HashMap<String, BigUint> = HashMap::new();
    for item in items {
        let amount = match value(item) {
            Some(raw) => units::parse_base_amount(field, raw)?,
            None => BigUint::zero(),
        };
        *sums.entry(key(item).to_string()).or_insert_with(BigUint::zero) += amount;
    }

    let mut ranked: Vec<(String, BigUint)> = sums.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    Ok(ranked)
}

/// Rank addresses by how many transfers they appear in. Each transfer counts
/// once for its sender and once for its receiver; the metric is occurrence
/// count, not value.
pub fn rank_transfer_activity(transfers: &[Transfer], n: usize) -> Vec<TransferActivity> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for transfer in transfers {
        *counts.entry(transfer.from.as_str()).or_insert(0) += 1;
        *counts.entry(transfer.to.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(n);
    ranked
        .into_iter()
        .map(|(address, count)| TransferActivity { address: address.to_string(), count })
        .collect()
}

/// Top stakers per the configured basis. Gross ranks owners by summed
/// deposits; net subtracts each owner's withdrawals and can go negative.
fn rank_stakers(
    deposits: &[Deposit],
    withdrawals: &[Withdrawal],
    opts: &ReportOptions,
) -> Result<Vec<TopStaker>, ReportError> {
    let mut sums: HashMap<String, BigInt> = HashMap::new();
    for deposit in deposits {
        let amount = match deposit.assets.as_deref() {
            Some(raw) => units::parse_base_amount("assets", raw)?,
            None => BigUint::zero(),
        };
        *sums.entry(deposit.owner.clone()).or_insert_with(BigInt::zero) += BigInt::from(amount);
    }
    if opts.rank_by == RankBy::Net {
        for withdrawal in withdrawals {
            let amount = match withdrawal.assets.as_deref() {
                Some(raw) => units::parse_base_amount("assets", raw)?,
                None => BigUint::zero(),
            };
            *sums.entry(withdrawal.owner.clone()).or_insert_with(BigInt::zero) -=
                BigInt::from(amount);
        }
    }

    let mut ranked: Vec<(String, BigInt)> = sums.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(opts.top_n);
    Ok(ranked
        .into_iter()
        .map(|(owner, sum)| TopStaker {
            owner,
            assets: units::to_display_signed(&sum, opts.decimals),
        })
        .collect())
}

/// Build the full dashboard report from one window's event lists.
///
/// Any absent list aborts with [`ReportError::DataUnavailable`]: proceeding
/// with an empty list would under-report totals without signaling it.
pub fn build_report(
    lists: &EventLists,
    opts: &ReportOptions,
) -> Result<AggregateReport, ReportError> {
    let deposits =
        lists.deposits.as_deref().ok_or(ReportError::DataUnavailable("deposits"))?;
    let withdrawals =
        lists.withdrawals.as_deref().ok_or(ReportError::DataUnavailable("withdraws"))?;
    let rewards =
        lists.rewards.as_deref().ok_or(ReportError::DataUnavailable("rewardsReceiveds"))?;
    let approvals =
        lists.approvals.as_deref().ok_or(ReportError::DataUnavailable("approvals"))?;
    let transfers =
        lists.transfers.as_deref().ok_or(ReportError::DataUnavailable("transfers"))?;

    let total_deposits = sum_field(deposits, "assets", |d| d.assets.as_deref())?;
    let total_withdrawals = sum_field(withdrawals, "assets", |w| w.assets.as_deref())?;
    let total_rewards = sum_field(rewards, "amount", |r| r.amount.as_deref())?;
    let net_staked =
        BigInt::from(total_deposits.clone()) - BigInt::from(total_withdrawals.clone());

    let unique_active_users = deposits
        .iter()
        .map(|d| d.owner.as_str())
        .chain(withdrawals.iter().map(|w| w.owner.as_str()))
        .collect::<HashSet<_>>()
        .len();

    let top_stakers = rank_stakers(deposits, withdrawals, opts)?;

    let total_approved = sum_field(approvals, "value", |a| a.value.as_deref())?;
    let top_approvers = rank_by_value(
        approvals,
        "value",
        |a| a.owner.as_str(),
        |a| a.value.as_deref(),
        opts.top_n,
    )?;
    let top_spenders = rank_by_value(
        approvals,
        "value",
        |a| a.spender.as_str(),
        |a| a.value.as_deref(),
        opts.top_n,
    )?;

    let total_transferred = sum_field(transfers, "value", |t| t.value.as_deref())?;
    let top_transfer_addresses = rank_transfer_activity(transfers, opts.top_n);

    Ok(AggregateReport {
        protocol_metrics: ProtocolMetrics {
            total_deposits: units::to_display(&total_deposits, opts.decimals),
            total_withdrawals: units::to_display(&total_withdrawals, opts.decimals),
            net_staked: units::to_display_signed(&net_staked, opts.decimals),
            total_rewards: units::to_display(&total_rewards, opts.decimals),
        },
        unique_active_users,
        top_stakers,
        approvals_metrics: ApprovalsMetrics {
            total_approved_value: units::to_display(&total_approved, opts.decimals),
            top_approvers: top_approvers
                .into_iter()
                .map(|(owner, value)| TopApprover {
                    owner,
                    value: units::to_display(&value, opts.decimals),
                })
                .collect(),
            most_approved_spenders: top_spenders
                .into_iter()
                .map(|(spender, value)| TopSpender {
                    spender,
                    value: units::to_display(&value, opts.decimals),
                })
                .collect(),
        },
        transfers_metrics: TransfersMetrics {
            total_transferred_value: units::to_display(&total_transferred, opts.decimals),
            top_transfer_addresses,
        },
    })
}

/// Protocol-wide totals for the overview card.
pub fn build_protocol_overview(
    lists: &OverviewLists,
    decimals: u32,
) -> Result<ProtocolOverview, ReportError> {
    let deposits =
        lists.deposits.as_deref().ok_or(ReportError::DataUnavailable("deposits"))?;
    let withdrawals =
        lists.withdrawals.as_deref().ok_or(ReportError::DataUnavailable("withdrawals"))?;
    let rewards =
        lists.rewards.as_deref().ok_or(ReportError::DataUnavailable("rewardsReceiveds"))?;
    let locked = lists
        .locked
        .as_deref()
        .ok_or(ReportError::DataUnavailable("lockedAmountRedistributeds"))?;

    let total_deposits = sum_field(deposits, "assets", |d| d.assets.as_deref())?;
    let total_withdrawals = sum_field(withdrawals, "assets", |w| w.assets.as_deref())?;
    let total_rewards = sum_field(rewards, "amount", |r| r.amount.as_deref())?;
    let total_locked = sum_field(locked, "amount", |l| l.amount.as_deref())?;
    let total_staked =
        BigInt::from(total_deposits) - BigInt::from(total_withdrawals);

    Ok(ProtocolOverview {
        total_staked: units::to_display_signed(&total_staked, decimals),
        total_rewards_distributed: units::to_display(&total_rewards, decimals),
        total_locked: units::to_display(&total_locked, decimals),
    })
}

/// Per-owner totals plus the raw event lists behind them.
pub fn build_user_stake(
    lists: UserStakeLists,
    decimals: u32,
) -> Result<UserStakeReport, ReportError> {
    let deposits = lists.deposits.ok_or(ReportError::DataUnavailable("deposits"))?;
    let withdrawals = lists.withdrawals.ok_or(ReportError::DataUnavailable("withdrawals"))?;
    let rewards = lists.rewards.ok_or(ReportError::DataUnavailable("rewardsReceiveds"))?;
    let locked =
        lists.locked.ok_or(ReportError::DataUnavailable("lockedAmountRedistributeds"))?;

    let total_deposits = sum_field(&deposits, "assets", |d: &Deposit| d.assets.as_deref())?;
    let total_withdrawals =
        sum_field(&withdrawals, "assets", |w: &Withdrawal| w.assets.as_deref())?;
    let total_rewards = sum_field(&rewards, "amount", |r: &RewardReceived| r.amount.as_deref())?;
    let total_locked =
        sum_field(&locked, "amount", |l: &LockedAmountRedistributed| l.amount.as_deref())?;
    let total_staked = BigInt::from(total_deposits) - BigInt::from(total_withdrawals);

    Ok(UserStakeReport {
        total_staked: units::to_display_signed(&total_staked, decimals),
        total_rewards: units::to_display(&total_rewards, decimals),
        total_locked: units::to_display(&total_locked, decimals),
        deposits,
        withdrawals,
        rewards,
        locked_amounts: locked,
    })
}

/// Bucket an event list into per-UTC-day base-unit sums. Timestamps are Unix
/// seconds serialized as strings; a malformed one aborts the bucketing.
pub fn sum_by_day<T>(
    items: &[T],
    field: &'static str,
    timestamp: impl Fn(&T) -> &str,
    value: impl Fn(&T) -> Option<&str>,
) -> Result<BTreeMap<String, String>, ReportError> {
    let mut days: BTreeMap<String, BigUint> = BTreeMap::new();
    for item in items {
        let raw_ts = timestamp(item);
        let secs: i64 = raw_ts.parse().map_err(|_| ReportError::InvalidAmount {
            field: "timestamp_",
            value: raw_ts.to_string(),
        })?;
        let day = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| ReportError::InvalidAmount {
                field: "timestamp_",
                value: raw_ts.to_string(),
            })?
            .format("%Y-%m-%d")
            .to_string();

        let amount = match value(item) {
            Some(raw) => units::parse_base_amount(field, raw)?,
            None => BigUint::zero(),
        };
        *days.entry(day).or_insert_with(BigUint::zero) += amount;
    }
    Ok(days.into_iter().map(|(day, sum)| (day, sum.to_string())).collect())
}

/// Daily deposit and reward series for the trends chart.
pub fn build_historical_trends(lists: &TrendLists) -> Result<HistoricalTrends, ReportError> {
    let deposits =
        lists.deposits.as_deref().ok_or(ReportError::DataUnavailable("deposits"))?;
    let rewards =
        lists.rewards.as_deref().ok_or(ReportError::DataUnavailable("rewardsReceiveds"))?;

    Ok(HistoricalTrends {
        deposits: sum_by_day(deposits, "assets", |d| &d.timestamp, |d| d.assets.as_deref())?,
        rewards: sum_by_day(rewards, "amount", |r| &r.timestamp, |r| r.amount.as_deref())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deposit(owner: &str, assets: &str) -> Deposit {
        serde_json::from_value(json!({
            "block_number": "1",
            "timestamp_": "1704067200",
            "transactionHash_": "0xd",
            "contractId_": "0xc",
            "owner": owner,
            "assets": assets,
        }))
        .unwrap()
    }

    fn withdrawal(owner: &str, assets: &str) -> Withdrawal {
        serde_json::from_value(json!({
            "block_number": "2",
            "timestamp_": "1704153600",
            "transactionHash_": "0xw",
            "contractId_": "0xc",
            "owner": owner,
            "assets": assets,
        }))
        .unwrap()
    }

    fn reward(amount: &str) -> RewardReceived {
        serde_json::from_value(json!({
            "block_number": "3",
            "timestamp_": "1704240000",
            "transactionHash_": "0xr",
            "contractId_": "0xc",
            "amount": amount,
        }))
        .unwrap()
    }

    fn approval(owner: &str, spender: &str, value: &str) -> Approval {
        serde_json::from_value(json!({
            "block_number": "4",
            "timestamp_": "1704240000",
            "transactionHash_": "0xa",
            "contractId_": "0xc",
            "owner": owner,
            "spender": spender,
            "value": value,
        }))
        .unwrap()
    }

    fn transfer(from: &str, to: &str, value: &str) -> Transfer {
        serde_json::from_value(json!({
            "block_number": "5",
            "timestamp_": "1704240000",
            "transactionHash_": "0xt",
            "contractId_": "0xc",
            "from": from,
            "to": to,
            "value": value,
        }))
        .unwrap()
    }

    fn fixture_lists() -> EventLists {
        EventLists {
            deposits: Some(vec![
                deposit("0xA", "5000000000000000000"),
                deposit("0xB", "9000000000000000000"),
            ]),
            withdrawals: Some(vec![withdrawal("0xA", "1000000000000000000")]),
            rewards: Some(vec![reward("2000000000000000000")]),
            approvals: Some(vec![
                approval("0xA", "0xS1", "4000000000000000000"),
                approval("0xB", "0xS1", "1000000000000000000"),
            ]),
            transfers: Some(vec![
                transfer("0xX", "0xY", "1000000000000000000"),
                transfer("0xY", "0xZ", "1000000000000000000"),
                transfer("0xX", "0xZ", "1000000000000000000"),
            ]),
        }
    }

    #[test]
    fn empty_list_sums_to_zero() {
        let deposits: Vec<Deposit> = Vec::new();
        let total = sum_field(&deposits, "assets", |d| d.assets.as_deref()).unwrap();
        assert_eq!(total, BigUint::zero());
    }

    #[test]
    fn missing_fields_count_as_zero() {
        let mut second = deposit("0xB", "0");
        second.assets = None;
        let deposits = vec![deposit("0xA", "1000000000000000000"), second];
        let total = sum_field(&deposits, "assets", |d| d.assets.as_deref()).unwrap();
        assert_eq!(total, "1000000000000000000".parse::<BigUint>().unwrap());
    }

    #[test]
    fn sum_exceeds_u64_without_loss() {
        // two deposits near u64::MAX each; a fixed-width accumulator would wrap
        let deposits = vec![
            deposit("0xA", "18446744073709551615"),
            deposit("0xB", "18446744073709551615"),
        ];
        let total = sum_field(&deposits, "assets", |d| d.assets.as_deref()).unwrap();
        assert_eq!(total.to_string(), "36893488147419103230");
    }

    #[test]
    fn malformed_amount_aborts_the_sum() {
        let deposits = vec![deposit("0xA", "1"), deposit("0xB", "not-a-number")];
        let err = sum_field(&deposits, "assets", |d| d.assets.as_deref()).unwrap_err();
        assert!(matches!(err, ReportError::InvalidAmount { field: "assets", .. }));
    }

    #[test]
    fn rank_by_value_orders_and_truncates() {
        let approvals = vec![
            approval("0xA", "0xS1", "5"),
            approval("0xB", "0xS2", "9"),
            approval("0xA", "0xS3", "2"),
            approval("0xC", "0xS4", "7"),
        ];
        let ranked = rank_by_value(
            &approvals,
            "value",
            |a| a.owner.as_str(),
            |a| a.value.as_deref(),
            2,
        )
        .unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, "0xB");
        assert_eq!(ranked[1].0, "0xA"); // 5 + 2 beats C's 7 on the tie by key
        assert!(ranked[0].1 >= ranked[1].1);
    }

    #[test]
    fn equal_sums_tie_break_by_key() {
        let approvals = vec![
            approval("0xB", "0xS", "3"),
            approval("0xA", "0xS", "3"),
            approval("0xC", "0xS", "3"),
        ];
        let ranked = rank_by_value(
            &approvals,
            "value",
            |a| a.owner.as_str(),
            |a| a.value.as_deref(),
            10,
        )
        .unwrap();
        let keys: Vec<&str> = ranked.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["0xA", "0xB", "0xC"]);
    }

    #[test]
    fn transfer_activity_counts_both_sides() {
        let transfers = vec![
            transfer("0xX", "0xY", "1"),
            transfer("0xY", "0xZ", "1"),
            transfer("0xX", "0xZ", "1"),
        ];
        let ranked = rank_transfer_activity(&transfers, 10);
        // X, Y and Z each touch two transfers; order falls back to the key
        assert_eq!(ranked.len(), 3);
        for activity in &ranked {
            assert_eq!(activity.count, 2);
        }
        let addresses: Vec<&str> = ranked.iter().map(|a| a.address.as_str()).collect();
        assert_eq!(addresses, vec!["0xX", "0xY", "0xZ"]);
    }

    #[test]
    fn report_matches_reference_fixture() {
        let report = build_report(&fixture_lists(), &ReportOptions::default()).unwrap();

        assert_eq!(report.protocol_metrics.total_deposits, "14");
        assert_eq!(report.protocol_metrics.total_withdrawals, "1");
        assert_eq!(report.protocol_metrics.net_staked, "13");
        assert_eq!(report.protocol_metrics.total_rewards, "2");
        assert_eq!(report.unique_active_users, 2);

        // B's 9 outranks A's 5 on gross deposits
        assert_eq!(report.top_stakers[0].owner, "0xB");
        assert_eq!(report.top_stakers[0].assets, "9");
        assert_eq!(report.top_stakers[1].owner, "0xA");

        assert_eq!(report.approvals_metrics.total_approved_value, "5");
        assert_eq!(report.approvals_metrics.top_approvers[0].owner, "0xA");
        assert_eq!(report.approvals_metrics.most_approved_spenders[0].spender, "0xS1");
        assert_eq!(report.transfers_metrics.total_transferred_value, "3");
    }

    #[test]
    fn net_ranking_subtracts_withdrawals() {
        let lists = EventLists {
            deposits: Some(vec![
                deposit("0xA", "9000000000000000000"),
                deposit("0xB", "8000000000000000000"),
            ]),
            withdrawals: Some(vec![withdrawal("0xA", "5000000000000000000")]),
            rewards: Some(vec![]),
            approvals: Some(vec![]),
            transfers: Some(vec![]),
        };
        let opts = ReportOptions { rank_by: RankBy::Net, ..Default::default() };
        let report = build_report(&lists, &opts).unwrap();

        // net: A = 4, B = 8
        assert_eq!(report.top_stakers[0].owner, "0xB");
        assert_eq!(report.top_stakers[0].assets, "8");
        assert_eq!(report.top_stakers[1].assets, "4");
    }

    #[test]
    fn duplicate_owners_count_once() {
        let lists = EventLists {
            deposits: Some(vec![deposit("0xA", "1"), deposit("0xA", "2")]),
            withdrawals: Some(vec![withdrawal("0xA", "1"), withdrawal("0xB", "1")]),
            rewards: Some(vec![]),
            approvals: Some(vec![]),
            transfers: Some(vec![]),
        };
        let report = build_report(&lists, &ReportOptions::default()).unwrap();
        assert_eq!(report.unique_active_users, 2);
    }

    #[test]
    fn missing_list_fails_fast() {
        let mut lists = fixture_lists();
        lists.rewards = None;
        let err = build_report(&lists, &ReportOptions::default()).unwrap_err();
        assert_eq!(err, ReportError::DataUnavailable("rewardsReceiveds"));
    }

    #[test]
    fn combined_stats_payload_deserializes() {
        // missing `approvals` key must surface as None, not an empty list
        let lists: EventLists = serde_json::from_value(json!({
            "deposits": [],
            "withdraws": [],
            "rewardsReceiveds": [],
            "transfers": [],
        }))
        .unwrap();
        assert!(lists.approvals.is_none());
        assert!(lists.deposits.is_some());
        let err = build_report(&lists, &ReportOptions::default()).unwrap_err();
        assert_eq!(err, ReportError::DataUnavailable("approvals"));
    }

    #[test]
    fn overview_totals() {
        let lists = OverviewLists {
            deposits: Some(vec![deposit("0xA", "3000000000000000000")]),
            withdrawals: Some(vec![withdrawal("0xA", "5000000000000000000")]),
            rewards: Some(vec![reward("1000000000000000000")]),
            locked: Some(vec![]),
        };
        let overview = build_protocol_overview(&lists, 18).unwrap();
        // withdrawals exceed deposits; the total stays negative, not clamped
        assert_eq!(overview.total_staked, "-2");
        assert_eq!(overview.total_rewards_distributed, "1");
        assert_eq!(overview.total_locked, "0");
    }

    #[test]
    fn daily_buckets_accumulate_per_utc_day() {
        let mut day_one_a = deposit("0xA", "1000000000000000000");
        day_one_a.timestamp = "1704067200".to_string(); // 2024-01-01
        let mut day_one_b = deposit("0xB", "2000000000000000000");
        day_one_b.timestamp = "1704100000".to_string(); // still 2024-01-01
        let mut day_two = deposit("0xA", "500000000000000000");
        day_two.timestamp = "1704153600".to_string(); // 2024-01-02

        let days = sum_by_day(
            &[day_one_a, day_one_b, day_two],
            "assets",
            |d| &d.timestamp,
            |d| d.assets.as_deref(),
        )
        .unwrap();

        assert_eq!(days["2024-01-01"], "3000000000000000000");
        assert_eq!(days["2024-01-02"], "500000000000000000");
    }

    #[test]
    fn round_trip_aggregate_to_display() {
        let deposits = vec![
            deposit("0xA", "1000000000000000000"),
            deposit("0xB", "2000000000000000000"),
            deposit("0xC", "500000000000000000"),
        ];
        let total = sum_field(&deposits, "assets", |d| d.assets.as_deref()).unwrap();
        assert_eq!(total.to_string(), "3500000000000000000");
        assert_eq!(units::to_display(&total, 18), "3");
    }
}
