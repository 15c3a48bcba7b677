#![cfg_attr(not(feature = "std"), no_std, no_main)]

//! Fixed-price fund that sells a base token for a quote stablecoin.
//!
//! Investors deposit quote asset and receive base asset at `unit_price`. 80% of
//! every deposit is held back as insurance and the rest goes to the payout
//! address. Divesting returns base asset to the fund and pays back the insured
//! share of its quote notional. The insurance reserve stays locked for two
//! years after deployment.

pub mod admin;
pub mod assets;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod math;

pub type Balance = u128;
pub type Timestamp = u64;
pub type BlockNumber = u32;

pub mod constants {
    use crate::{Balance, Timestamp};

    /// Base asset: 18 decimals.
    pub const BASE_SCALE: Balance = 1_000_000_000_000_000_000;
    /// Quote asset: 6 decimals.
    pub const QUOTE_SCALE: Balance = 1_000_000;
    /// Lifts a quote amount to the base scale.
    pub const QUOTE_TO_BASE: Balance = BASE_SCALE / QUOTE_SCALE;

    /// Share of every deposit held back as insurance.
    pub const INSURANCE_RATIO_PERCENT: u8 = 80;
    pub const PERCENT_DENOMINATOR: Balance = 100;

    /// 730 days in milliseconds.
    pub const INSURANCE_LOCK_DURATION: Timestamp = 730 * 24 * 60 * 60 * 1_000;
}

pub use self::multilevel_fund::{MultilevelFund, MultilevelFundRef};

#[ink::contract]
mod multilevel_fund {
    use crate::admin::{self, Ownership};
    use crate::assets::{
        Asset, NonStandard, RemoteNonStandardToken, RemoteStandardToken, Standard,
    };
    use crate::engine::{CallContext, Engine};
    use crate::errors::Error;
    use crate::ledger::{
        ConfigSnapshot, InvestorRecord, InvestorRegistry, Ledger, LedgerSnapshot,
    };
    use ink::storage::Mapping;

    type BaseAsset = Standard<RemoteStandardToken>;
    type QuoteAsset = NonStandard<RemoteNonStandardToken>;

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct MultilevelFund {
        ownership: Ownership,
        ledger: Ledger,
        investors: Mapping<AccountId, InvestorRecord>,
        base_token: AccountId,
        quote_token: AccountId,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct Invested {
        #[ink(topic)]
        investor: AccountId,
        amount: Balance,
        returned_base: Balance,
        insurance: Balance,
        payout: Balance,
        block: BlockNumber,
    }

    #[ink(event)]
    pub struct Divested {
        #[ink(topic)]
        investor: AccountId,
        amount: Balance,
        returned_quote: Balance,
        returned_insurance_quote: Balance,
    }

    #[ink(event)]
    pub struct Paused {
        #[ink(topic)]
        by: AccountId,
    }

    #[ink(event)]
    pub struct Unpaused {
        #[ink(topic)]
        by: AccountId,
    }

    #[ink(event)]
    pub struct MinimumInvestAmountUpdated {
        previous: Balance,
        current: Balance,
    }

    #[ink(event)]
    pub struct PayoutAddressUpdated {
        #[ink(topic)]
        previous: AccountId,
        #[ink(topic)]
        current: AccountId,
    }

    #[ink(event)]
    pub struct InsuranceReserveWithdrawn {
        #[ink(topic)]
        to: AccountId,
        amount: Balance,
    }

    #[ink(event)]
    pub struct BaseReserveWithdrawn {
        #[ink(topic)]
        to: AccountId,
        amount: Balance,
    }

    #[ink(event)]
    pub struct OwnershipTransferred {
        #[ink(topic)]
        previous: AccountId,
        #[ink(topic)]
        current: AccountId,
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl MultilevelFund {
        /// Deploy with a fixed `unit_price` (quote per base, 18 decimals). The
        /// deployer becomes owner and initial payout address.
        #[ink(constructor)]
        pub fn new(
            unit_price: Balance,
            base_token: AccountId,
            quote_token: AccountId,
        ) -> Result<Self, Error> {
            let zero = AccountId::from([0u8; 32]);
            if base_token == zero || quote_token == zero {
                return Err(Error::ZeroAddress);
            }

            let caller = Self::env().caller();
            let ledger = Ledger::new(unit_price, caller, Self::env().block_timestamp())?;

            Ok(Self {
                ownership: Ownership::new(caller),
                ledger,
                investors: Mapping::default(),
                base_token,
                quote_token,
            })
        }

        // =================================================================
        // INVEST / DIVEST
        // =================================================================

        /// Deposit `amount` of quote asset (6 decimals) for base asset. The
        /// caller must have approved the fund for `amount` beforehand.
        #[ink(message)]
        pub fn invest(&mut self, amount: Balance) -> Result<Balance, Error> {
            let ctx = self.call_context();
            let (mut base, mut quote) = (self.base_asset(), self.quote_asset());
            self.invest_with(&ctx, amount, &mut base, &mut quote)
        }

        /// Return `amount` of base asset (18 decimals) and get the insured
        /// share of its quote notional back.
        #[ink(message)]
        pub fn divest(&mut self, amount: Balance) -> Result<Balance, Error> {
            let ctx = self.call_context();
            let (mut base, mut quote) = (self.base_asset(), self.quote_asset());
            self.divest_with(&ctx, amount, &mut base, &mut quote)
        }

        // =================================================================
        // ADMIN
        // =================================================================

        #[ink(message)]
        pub fn pause(&mut self) -> Result<(), Error> {
            let cap = self.authorize()?;
            if admin::pause(&cap, &mut self.ledger) {
                self.env().emit_event(Paused { by: cap.holder() });
            }
            Ok(())
        }

        #[ink(message)]
        pub fn unpause(&mut self) -> Result<(), Error> {
            let cap = self.authorize()?;
            if admin::unpause(&cap, &mut self.ledger) {
                self.env().emit_event(Unpaused { by: cap.holder() });
            }
            Ok(())
        }

        #[ink(message)]
        pub fn set_minimum_invest_amount(&mut self, amount: Balance) -> Result<(), Error> {
            let cap = self.authorize()?;
            let previous = admin::set_minimum_invest_amount(&cap, &mut self.ledger, amount)
                .map_err(|e| trace("set_minimum_invest_amount", e))?;
            self.env().emit_event(MinimumInvestAmountUpdated {
                previous,
                current: amount,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn set_payout_address(&mut self, payout: AccountId) -> Result<(), Error> {
            let cap = self.authorize()?;
            let previous = admin::set_payout_address(&cap, &mut self.ledger, payout)
                .map_err(|e| trace("set_payout_address", e))?;
            self.env().emit_event(PayoutAddressUpdated {
                previous,
                current: payout,
            });
            Ok(())
        }

        /// Send `amount` of the quote reserve to the owner. Locked until
        /// `insurance_unlocks_at()`.
        #[ink(message)]
        pub fn withdraw_insurance_reserve(&mut self, amount: Balance) -> Result<(), Error> {
            let cap = self.authorize()?;
            let ctx = self.call_context();
            let mut quote = self.quote_asset();
            admin::withdraw_insurance_reserve(&cap, &mut self.ledger, &mut quote, &ctx, amount)
                .map_err(|e| trace("withdraw_insurance_reserve", e))?;
            self.env().emit_event(InsuranceReserveWithdrawn {
                to: cap.holder(),
                amount,
            });
            Ok(())
        }

        /// Send `amount` of unsold base asset to the owner.
        #[ink(message)]
        pub fn withdraw_base_reserve(&mut self, amount: Balance) -> Result<(), Error> {
            let cap = self.authorize()?;
            let ctx = self.call_context();
            let mut base = self.base_asset();
            admin::withdraw_base_reserve(&cap, &mut self.ledger, &mut base, &ctx, amount)
                .map_err(|e| trace("withdraw_base_reserve", e))?;
            self.env().emit_event(BaseReserveWithdrawn {
                to: cap.holder(),
                amount,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn transfer_ownership(&mut self, new_owner: AccountId) -> Result<(), Error> {
            let cap = self.authorize()?;
            let previous = self
                .ownership
                .transfer(&cap, new_owner)
                .map_err(|e| trace("transfer_ownership", e))?;
            self.env().emit_event(OwnershipTransferred {
                previous,
                current: new_owner,
            });
            Ok(())
        }

        // =================================================================
        // VIEWS
        // =================================================================

        #[ink(message)]
        pub fn investor(&self, who: AccountId) -> InvestorRecord {
            self.investors.record(&who)
        }

        /// Counters plus the fund's live holdings of both assets.
        #[ink(message)]
        pub fn ledger_snapshot(&self) -> Result<LedgerSnapshot, Error> {
            let this = self.env().account_id();
            let base_balance = self.base_asset().balance_of(this)?;
            let quote_balance = self.quote_asset().balance_of(this)?;
            Ok(LedgerSnapshot::new(&self.ledger, base_balance, quote_balance))
        }

        #[ink(message)]
        pub fn config_snapshot(&self) -> ConfigSnapshot {
            ConfigSnapshot::from(&self.ledger)
        }

        #[ink(message)]
        pub fn is_paused(&self) -> bool {
            self.ledger.paused
        }

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.ownership.owner()
        }

        #[ink(message)]
        pub fn insurance_unlocks_at(&self) -> Timestamp {
            self.ledger.insurance_unlocks_at()
        }

        #[ink(message)]
        pub fn base_token(&self) -> AccountId {
            self.base_token
        }

        #[ink(message)]
        pub fn quote_token(&self) -> AccountId {
            self.quote_token
        }

        // =================================================================
        // INTERNAL
        // =================================================================

        fn authorize(&self) -> Result<admin::AdminCap, Error> {
            self.ownership
                .authorize(self.env().caller())
                .map_err(|e| trace("authorize", e))
        }

        fn call_context(&self) -> CallContext {
            CallContext {
                caller: self.env().caller(),
                this: self.env().account_id(),
                block: self.env().block_number(),
                now: self.env().block_timestamp(),
            }
        }

        /// Runs the engine and emits `Invested` once it has succeeded.
        fn invest_with<B: Asset, Q: Asset>(
            &mut self,
            ctx: &CallContext,
            amount: Balance,
            base: &mut B,
            quote: &mut Q,
        ) -> Result<Balance, Error> {
            let receipt = Engine::new(&mut self.ledger, &mut self.investors, base, quote)
                .invest(ctx, amount)
                .map_err(|e| trace("invest", e))?;

            self.env().emit_event(Invested {
                investor: receipt.investor,
                amount: receipt.amount,
                returned_base: receipt.returned_base,
                insurance: receipt.insurance,
                payout: receipt.payout,
                block: ctx.block,
            });
            Ok(receipt.returned_base)
        }

        fn divest_with<B: Asset, Q: Asset>(
            &mut self,
            ctx: &CallContext,
            amount: Balance,
            base: &mut B,
            quote: &mut Q,
        ) -> Result<Balance, Error> {
            let receipt = Engine::new(&mut self.ledger, &mut self.investors, base, quote)
                .divest(ctx, amount)
                .map_err(|e| trace("divest", e))?;

            self.env().emit_event(Divested {
                investor: receipt.investor,
                amount: receipt.amount,
                returned_quote: receipt.returned_quote,
                returned_insurance_quote: receipt.returned_insurance_quote,
            });
            Ok(receipt.returned_insurance_quote)
        }

        fn base_asset(&self) -> BaseAsset {
            Standard(RemoteStandardToken::new(self.base_token))
        }

        fn quote_asset(&self) -> QuoteAsset {
            NonStandard(RemoteNonStandardToken::new(self.quote_token))
        }
    }

    fn trace(op: &str, error: Error) -> Error {
        ink::env::debug_println!("{} rejected: {:?}", op, error);
        error
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
