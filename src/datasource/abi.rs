//! Auction contract event ABI: topic hashes and log decoding.
//!
//! Both events index the bid id and owner, so those arrive as topics 1 and 2;
//! the remaining two uint fields are ABI-encoded in `data`.

use crate::domain::{Address, BidEvent, BidId, BlockNumber, ExitEvent, TxHash};
use alloy_primitives::B256;
use alloy_sol_types::{sol, SolEvent};
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

sol! {
    /// Emitted when a bid is placed on the auction.
    #[derive(Debug)]
    event BidSubmitted(
        uint256 indexed id,
        address indexed owner,
        uint256 price,
        uint128 amount
    );

    /// Emitted when a bid exits with its fill and refund.
    #[derive(Debug)]
    event BidExited(
        uint256 indexed bidId,
        address indexed owner,
        uint256 tokensFilled,
        uint256 currencyRefunded
    );
}

/// topic0 of `BidSubmitted`.
pub fn bid_submitted_topic() -> B256 {
    BidSubmitted::SIGNATURE_HASH
}

/// topic0 of `BidExited`.
pub fn bid_exited_topic() -> B256 {
    BidExited::SIGNATURE_HASH
}

/// `0x`-prefixed hex form of a topic, as used in RPC filters.
pub fn topic_hex(topic: B256) -> String {
    format!("0x{}", hex::encode(topic))
}

/// Log object as returned by `eth_getLogs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    #[serde(default)]
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: String,
    pub transaction_hash: String,
    pub log_index: String,
    /// Set by the node when the log was dropped by a reorganisation.
    #[serde(default)]
    pub removed: bool,
}

/// A decoded auction event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    Bid(BidEvent),
    Exit(ExitEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("log has no topics")]
    MissingTopic0,
    #[error("unknown event topic {0}")]
    UnknownTopic(String),
    #[error("invalid hex in {field}: {reason}")]
    Hex { field: &'static str, reason: String },
    #[error("invalid quantity in {field}: {value}")]
    Quantity { field: &'static str, value: String },
    #[error("abi decode error: {0}")]
    Abi(String),
}

impl From<alloy_sol_types::Error> for DecodeError {
    fn from(e: alloy_sol_types::Error) -> Self {
        DecodeError::Abi(e.to_string())
    }
}

/// Parse a `0x`-prefixed hex quantity (`"0x1b4"`).
pub fn parse_quantity(field: &'static str, value: &str) -> Result<u64, DecodeError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(digits, 16).map_err(|_| DecodeError::Quantity {
        field,
        value: value.to_string(),
    })
}

/// Format a block height as a hex quantity for RPC params.
pub fn to_quantity(value: u64) -> String {
    format!("0x{:x}", value)
}

fn parse_topics(topics: &[String]) -> Result<Vec<B256>, DecodeError> {
    topics
        .iter()
        .map(|t| {
            B256::from_str(t).map_err(|e| DecodeError::Hex {
                field: "topics",
                reason: e.to_string(),
            })
        })
        .collect()
}

fn owner_address(owner: alloy_primitives::Address) -> Address {
    Address::new(format!("0x{}", hex::encode(owner.as_slice())))
}

/// Decode one raw log into a bid or exit event.
pub fn decode_log(log: &RawLog) -> Result<DecodedEvent, DecodeError> {
    let topics = parse_topics(&log.topics)?;
    let topic0 = *topics.first().ok_or(DecodeError::MissingTopic0)?;
    let data = hex::decode(log.data.strip_prefix("0x").unwrap_or(&log.data)).map_err(|e| {
        DecodeError::Hex {
            field: "data",
            reason: e.to_string(),
        }
    })?;

    let block_number = BlockNumber::new(parse_quantity("blockNumber", &log.block_number)?);
    let log_index = parse_quantity("logIndex", &log.log_index)?;
    let transaction_hash = TxHash::new(log.transaction_hash.clone());

    if topic0 == BidSubmitted::SIGNATURE_HASH {
        let event = BidSubmitted::decode_raw_log(topics.iter().copied(), &data)?;
        Ok(DecodedEvent::Bid(BidEvent {
            id: BidId::new(event.id.to_string()),
            owner: owner_address(event.owner),
            price_q96: event.price,
            amount_wei: alloy_primitives::U256::from(event.amount),
            block_number,
            transaction_hash,
            log_index,
        }))
    } else if topic0 == BidExited::SIGNATURE_HASH {
        let event = BidExited::decode_raw_log(topics.iter().copied(), &data)?;
        Ok(DecodedEvent::Exit(ExitEvent {
            bid_id: BidId::new(event.bidId.to_string()),
            owner: owner_address(event.owner),
            tokens_filled: event.tokensFilled,
            currency_refunded: event.currencyRefunded,
            block_number,
            transaction_hash,
            log_index,
        }))
    } else {
        Err(DecodeError::UnknownTopic(topic_hex(topic0)))
    }
}
