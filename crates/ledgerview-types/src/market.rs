//! Market accounts.
//!
//! A market groups the outcomes of one event. Its fixed prefix (authority,
//! event, mint, status, flags) is filterable; the winning outcome, timestamps
//! and title follow as variable-width fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::layout::{AccountLayout, LayoutReader, tagged_enum_layout};
use crate::{Pubkey, Result};

/// Lifecycle status of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(u8)]
pub enum MarketStatus {
    Initializing = 0,
    Open = 1,
    Locked = 2,
    ReadyForSettlement = 3,
    Settled = 4,
    ReadyToClose = 5,
    ReadyToVoid = 6,
    Voided = 7,
}

impl MarketStatus {
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Self::Initializing,
            1 => Self::Open,
            2 => Self::Locked,
            3 => Self::ReadyForSettlement,
            4 => Self::Settled,
            5 => Self::ReadyToClose,
            6 => Self::ReadyToVoid,
            7 => Self::Voided,
            _ => return None,
        })
    }
}

tagged_enum_layout!(MarketStatus, "MarketStatus");

impl std::fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initializing => write!(f, "INITIALIZING"),
            Self::Open => write!(f, "OPEN"),
            Self::Locked => write!(f, "LOCKED"),
            Self::ReadyForSettlement => write!(f, "READY_FOR_SETTLEMENT"),
            Self::Settled => write!(f, "SETTLED"),
            Self::ReadyToClose => write!(f, "READY_TO_CLOSE"),
            Self::ReadyToVoid => write!(f, "READY_TO_VOID"),
            Self::Voided => write!(f, "VOIDED"),
        }
    }
}

/// A market account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Market {
    pub authority: Pubkey,
    pub event: Pubkey,
    /// Token mint stakes are denominated in.
    pub mint_account: Pubkey,
    pub status: MarketStatus,
    pub inplay_enabled: bool,
    pub inplay: bool,
    /// Maximum decimal places allowed in a price.
    pub decimal_limit: u8,
    pub published: bool,
    pub suspended: bool,
    pub market_outcomes_count: u16,
    pub market_winning_outcome_index: Option<u16>,
    pub market_lock_timestamp: DateTime<Utc>,
    pub market_settle_timestamp: Option<DateTime<Utc>>,
    pub title: String,
}

impl Market {
    pub const AUTHORITY_OFFSET: usize = 8;
    pub const EVENT_OFFSET: usize = 40;
    pub const MINT_OFFSET: usize = 72;
    pub const STATUS_OFFSET: usize = 104;

    /// Whether new orders can currently be placed.
    #[must_use]
    pub fn accepts_orders(&self) -> bool {
        self.status == MarketStatus::Open && !self.suspended
    }

    /// Whether the market has reached a terminal outcome.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(
            self.status,
            MarketStatus::Settled | MarketStatus::Voided | MarketStatus::ReadyToClose
        )
    }
}

impl AccountLayout for Market {
    const TYPE_NAME: &'static str = "Market";

    fn read_fields(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            authority: reader.read()?,
            event: reader.read()?,
            mint_account: reader.read()?,
            status: reader.read()?,
            inplay_enabled: reader.read()?,
            inplay: reader.read()?,
            decimal_limit: reader.read()?,
            published: reader.read()?,
            suspended: reader.read()?,
            market_outcomes_count: reader.read()?,
            market_winning_outcome_index: reader.read()?,
            market_lock_timestamp: reader.read_timestamp()?,
            market_settle_timestamp: reader.read_optional_timestamp()?,
            title: reader.read()?,
        })
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Market {
    pub fn dummy(authority: Pubkey, event: Pubkey, status: MarketStatus) -> Self {
        Self {
            authority,
            event,
            mint_account: Pubkey([7u8; 32]),
            status,
            inplay_enabled: false,
            inplay: false,
            decimal_limit: 3,
            published: true,
            suspended: false,
            market_outcomes_count: 3,
            market_winning_outcome_index: None,
            market_lock_timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
            market_settle_timestamp: None,
            title: "Home / Draw / Away".to_string(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = crate::layout::LayoutWriter::for_account::<Self>();
        w.write(&self.authority);
        w.write(&self.event);
        w.write(&self.mint_account);
        w.write(&self.status);
        w.write(&self.inplay_enabled);
        w.write(&self.inplay);
        w.write(&self.decimal_limit);
        w.write(&self.published);
        w.write(&self.suspended);
        w.write(&self.market_outcomes_count);
        w.write(&self.market_winning_outcome_index);
        w.write_timestamp(self.market_lock_timestamp);
        w.write_optional_timestamp(self.market_settle_timestamp);
        w.write(&self.title);
        w.into_bytes()
    }
}
