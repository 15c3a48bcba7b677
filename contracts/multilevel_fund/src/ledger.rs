//! Global ledger state and the per-investor registry.

use ink::primitives::AccountId;
use ink::storage::traits::StorageKey;
use ink::storage::Mapping;

use crate::constants::{INSURANCE_LOCK_DURATION, INSURANCE_RATIO_PERCENT};
use crate::errors::{Error, Result};
use crate::math::UnitPrice;
use crate::{Balance, BlockNumber, Timestamp};

/// One participant's position. Created lazily, never removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct InvestorRecord {
    /// Net base position acquired through `invest`, reduced by `divest`.
    pub base_invests: Balance,
    /// Net quote notional behind `base_invests`.
    pub quote_invests: Balance,
    /// Block of the most recent `invest`.
    pub last_invest_block: BlockNumber,
    /// Base returned through `divest`, all-time.
    pub refunds_in_base: Balance,
}

/// Keyed storage of investor records.
pub trait InvestorRegistry {
    /// The stored record, or the zero record for an unknown investor.
    fn record(&self, investor: &AccountId) -> InvestorRecord;

    fn store(&mut self, investor: &AccountId, record: &InvestorRecord);
}

// Inside `#[ink(storage)]` the key parameter is resolved to a concrete
// `ResolverKey`, so this must hold for every key type.
impl<K: StorageKey> InvestorRegistry for Mapping<AccountId, InvestorRecord, K> {
    fn record(&self, investor: &AccountId) -> InvestorRecord {
        self.get(investor).unwrap_or_default()
    }

    fn store(&mut self, investor: &AccountId, record: &InvestorRecord) {
        self.insert(investor, record);
    }
}

#[cfg(feature = "std")]
impl InvestorRegistry for std::collections::BTreeMap<AccountId, InvestorRecord> {
    fn record(&self, investor: &AccountId) -> InvestorRecord {
        self.get(investor).copied().unwrap_or_default()
    }

    fn store(&mut self, investor: &AccountId, record: &InvestorRecord) {
        self.insert(*investor, *record);
    }
}

/// Process-wide fund state. Mutated only by the engine and admin operations.
#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Ledger {
    pub unit_price: Balance,

    // ── Reporting counters (monotonic) ────────────────────────────────────
    pub total_base_issued: Balance,
    pub total_quote_received: Balance,
    pub total_base_refunded: Balance,
    pub total_quote_refunded: Balance,

    // ── Configuration ─────────────────────────────────────────────────────
    pub minimum_invest_amount: Balance,
    pub insurance_ratio_percent: u8,
    pub payout_address: AccountId,

    // ── Time-lock ─────────────────────────────────────────────────────────
    pub created_at: Timestamp,
    pub insurance_lock_duration: Timestamp,

    pub paused: bool,
    /// Set while an engine operation or withdrawal is in flight.
    ///
    /// The flag lives in the root storage struct, which ink! loads when a
    /// message starts and writes back when it returns. A message re-entered
    /// through a token callback therefore reads the persisted `false`; only
    /// nested calls within one message see it set. Cross-contract reentry is
    /// refused by the dispatcher, since no message opts into `ALLOW_REENTRY`.
    pub entered: bool,
}

impl Ledger {
    pub fn new(
        unit_price: Balance,
        payout_address: AccountId,
        created_at: Timestamp,
    ) -> Result<Self> {
        UnitPrice::new(unit_price)?;
        Ok(Self {
            unit_price,
            total_base_issued: 0,
            total_quote_received: 0,
            total_base_refunded: 0,
            total_quote_refunded: 0,
            minimum_invest_amount: 0,
            insurance_ratio_percent: INSURANCE_RATIO_PERCENT,
            payout_address,
            created_at,
            insurance_lock_duration: INSURANCE_LOCK_DURATION,
            paused: false,
            entered: false,
        })
    }

    pub fn price(&self) -> Result<UnitPrice> {
        UnitPrice::new(self.unit_price)
    }

    /// Earliest timestamp at which the insurance reserve may be withdrawn.
    pub fn insurance_unlocks_at(&self) -> Timestamp {
        self.created_at.saturating_add(self.insurance_lock_duration)
    }

    /// Take the reentrancy flag.
    pub fn enter(&mut self) -> Result<()> {
        if self.entered {
            return Err(Error::Reentrancy);
        }
        self.entered = true;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.entered = false;
    }

    /// Counters only, without the live asset balances.
    pub fn totals(&self) -> Totals {
        Totals {
            base_issued: self.total_base_issued,
            quote_received: self.total_quote_received,
            base_refunded: self.total_base_refunded,
            quote_refunded: self.total_quote_refunded,
        }
    }

    pub(crate) fn set_totals(&mut self, totals: Totals) {
        self.total_base_issued = totals.base_issued;
        self.total_quote_received = totals.quote_received;
        self.total_base_refunded = totals.base_refunded;
        self.total_quote_refunded = totals.quote_refunded;
    }
}

/// The four reporting counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub base_issued: Balance,
    pub quote_received: Balance,
    pub base_refunded: Balance,
    pub quote_refunded: Balance,
}

/// Public view of the ledger plus the fund's live asset balances.
#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct LedgerSnapshot {
    pub unit_price: Balance,
    pub total_base_issued: Balance,
    pub total_quote_received: Balance,
    pub total_base_refunded: Balance,
    pub total_quote_refunded: Balance,
    pub created_at: Timestamp,
    pub base_balance: Balance,
    pub quote_balance: Balance,
}

impl LedgerSnapshot {
    pub fn new(ledger: &Ledger, base_balance: Balance, quote_balance: Balance) -> Self {
        Self {
            unit_price: ledger.unit_price,
            total_base_issued: ledger.total_base_issued,
            total_quote_received: ledger.total_quote_received,
            total_base_refunded: ledger.total_base_refunded,
            total_quote_refunded: ledger.total_quote_refunded,
            created_at: ledger.created_at,
            base_balance,
            quote_balance,
        }
    }
}

/// Admin-tunable settings.
#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct ConfigSnapshot {
    pub minimum_invest_amount: Balance,
    pub payout_address: AccountId,
}

impl From<&Ledger> for ConfigSnapshot {
    fn from(ledger: &Ledger) -> Self {
        Self {
            minimum_invest_amount: ledger.minimum_invest_amount,
            payout_address: ledger.payout_address,
        }
    }
}
