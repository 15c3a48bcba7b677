//! Conversion engine: `invest` (quote -> base) and `divest` (base -> quote).
//!
//! Each operation runs as:
//!
//! ```text
//!   enter guard -> checks -> bookkeeping -> transfers -> exit guard
//!                                  ^              |
//!                                  +-- rollback --+  (any transfer fails)
//! ```
//!
//! Bookkeeping is committed before any asset is touched, and the guard flag
//! rejects a nested call that would otherwise observe it half-way.
//!
//! Rollback restores the ledger and the investor record only. Transfers that
//! completed before the failing one are not undone here: the engine returns
//! `Err`, and the contract message returning that `Err` is what reverts every
//! token movement of the call. Callers outside a message must not treat an
//! `Err` as "no asset moved".

use ink::primitives::AccountId;

use crate::assets::Asset;
use crate::errors::{Error, Result};
use crate::ledger::{InvestorRecord, InvestorRegistry, Ledger, Totals};
use crate::math::{base_to_quote, percent_of, quote_to_base, split_deposit, Base, Quote};
use crate::{Balance, BlockNumber, Timestamp};

/// Who is calling, on whose behalf the fund acts, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: AccountId,
    /// The fund's own account.
    pub this: AccountId,
    pub block: BlockNumber,
    pub now: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvestReceipt {
    pub investor: AccountId,
    pub amount: Balance,
    pub returned_base: Balance,
    pub insurance: Balance,
    pub payout: Balance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivestReceipt {
    pub investor: AccountId,
    pub amount: Balance,
    /// Full quote notional removed from the position.
    pub returned_quote: Balance,
    /// Insured share actually paid out.
    pub returned_insurance_quote: Balance,
}

/// Borrowed view over the ledger, the registry and both assets for the
/// duration of one call.
pub struct Engine<'a, R, B, Q> {
    ledger: &'a mut Ledger,
    registry: &'a mut R,
    base: &'a mut B,
    quote: &'a mut Q,
}

impl<'a, R, B, Q> Engine<'a, R, B, Q>
where
    R: InvestorRegistry,
    B: Asset,
    Q: Asset,
{
    pub fn new(
        ledger: &'a mut Ledger,
        registry: &'a mut R,
        base: &'a mut B,
        quote: &'a mut Q,
    ) -> Self {
        Self {
            ledger,
            registry,
            base,
            quote,
        }
    }

    /// Swap `amount` of the caller's quote asset for base asset at the unit price.
    pub fn invest(&mut self, ctx: &CallContext, amount: Balance) -> Result<InvestReceipt> {
        self.ledger.enter()?;
        let result = self.invest_guarded(ctx, amount);
        self.ledger.exit();
        result
    }

    /// Return `amount` of base asset and receive the insured quote share back.
    pub fn divest(&mut self, ctx: &CallContext, amount: Balance) -> Result<DivestReceipt> {
        self.ledger.enter()?;
        let result = self.divest_guarded(ctx, amount);
        self.ledger.exit();
        result
    }

    fn invest_guarded(&mut self, ctx: &CallContext, amount: Balance) -> Result<InvestReceipt> {
        if self.ledger.paused {
            return Err(Error::Paused);
        }
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }
        if amount < self.ledger.minimum_invest_amount {
            return Err(Error::BelowMinimum);
        }

        let base_reserve = self.base.balance_of(ctx.this)?;
        if base_reserve == 0 {
            return Err(Error::InsufficientBaseReserve);
        }

        let returned_base = quote_to_base(Quote(amount), self.ledger.price()?)?;
        if returned_base.0 == 0 {
            return Err(Error::ZeroConversion);
        }
        if returned_base.0 > base_reserve {
            return Err(Error::InsufficientBaseReserve);
        }

        let ratio = self.ledger.insurance_ratio_percent;
        let (insurance, payout) = split_deposit(Quote(amount), ratio)?;

        // ── Effects ───────────────────────────────────────────────────────
        let prior_totals = self.ledger.totals();
        let prior_record = self.registry.record(&ctx.caller);

        let record = InvestorRecord {
            base_invests: add(prior_record.base_invests, returned_base.0)?,
            quote_invests: add(prior_record.quote_invests, amount)?,
            last_invest_block: ctx.block,
            refunds_in_base: prior_record.refunds_in_base,
        };
        let totals = Totals {
            base_issued: add(prior_totals.base_issued, returned_base.0)?,
            quote_received: add(prior_totals.quote_received, amount)?,
            ..prior_totals
        };
        self.ledger.set_totals(totals);
        self.registry.store(&ctx.caller, &record);

        // ── Interactions ──────────────────────────────────────────────────
        if let Err(e) = self.settle_invest(ctx, insurance, payout, returned_base) {
            self.rollback(&ctx.caller, prior_totals, &prior_record);
            return Err(e);
        }

        Ok(InvestReceipt {
            investor: ctx.caller,
            amount,
            returned_base: returned_base.0,
            insurance: insurance.0,
            payout: payout.0,
        })
    }

    fn settle_invest(
        &mut self,
        ctx: &CallContext,
        insurance: Quote,
        payout: Quote,
        returned_base: Base,
    ) -> Result<()> {
        let payout_address = self.ledger.payout_address;
        if insurance.0 > 0 {
            self.quote.transfer_from(ctx.caller, ctx.this, insurance.0)?;
        }
        if payout.0 > 0 {
            self.quote.transfer_from(ctx.caller, payout_address, payout.0)?;
        }
        self.base.transfer(ctx.caller, returned_base.0)
    }

    fn divest_guarded(&mut self, ctx: &CallContext, amount: Balance) -> Result<DivestReceipt> {
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }

        let prior_record = self.registry.record(&ctx.caller);
        if prior_record.base_invests < amount {
            return Err(Error::InsufficientPosition);
        }

        let quote_reserve = self.quote.balance_of(ctx.this)?;
        if quote_reserve == 0 {
            return Err(Error::InsufficientQuoteReserve);
        }
        if self.base.balance_of(ctx.caller)? < amount {
            return Err(Error::InsufficientBalance);
        }

        let returned_quote = base_to_quote(Base(amount), self.ledger.price()?)?;
        let ratio = self.ledger.insurance_ratio_percent;
        let returned_insurance_quote = percent_of(returned_quote, ratio)?;
        if quote_reserve < returned_insurance_quote.0 {
            return Err(Error::InsufficientQuoteReserve);
        }

        // ── Effects ───────────────────────────────────────────────────────
        let prior_totals = self.ledger.totals();

        // The position loses the full notional even though only the insured share is paid
        let record = InvestorRecord {
            base_invests: sub(prior_record.base_invests, amount)?,
            quote_invests: sub(prior_record.quote_invests, returned_quote.0)?,
            last_invest_block: prior_record.last_invest_block,
            refunds_in_base: add(prior_record.refunds_in_base, amount)?,
        };
        let totals = Totals {
            base_refunded: add(prior_totals.base_refunded, amount)?,
            quote_refunded: add(prior_totals.quote_refunded, returned_insurance_quote.0)?,
            ..prior_totals
        };
        self.ledger.set_totals(totals);
        self.registry.store(&ctx.caller, &record);

        // ── Interactions ──────────────────────────────────────────────────
        if let Err(e) = self.settle_divest(ctx, amount, returned_insurance_quote) {
            self.rollback(&ctx.caller, prior_totals, &prior_record);
            return Err(e);
        }

        Ok(DivestReceipt {
            investor: ctx.caller,
            amount,
            returned_quote: returned_quote.0,
            returned_insurance_quote: returned_insurance_quote.0,
        })
    }

    fn settle_divest(&mut self, ctx: &CallContext, amount: Balance, payback: Quote) -> Result<()> {
        self.base.transfer_from(ctx.caller, ctx.this, amount)?;
        if payback.0 > 0 {
            self.quote.transfer(ctx.caller, payback.0)?;
        }
        Ok(())
    }

    fn rollback(&mut self, investor: &AccountId, totals: Totals, record: &InvestorRecord) {
        self.ledger.set_totals(totals);
        self.registry.store(investor, record);
    }
}

fn add(a: Balance, b: Balance) -> Result<Balance> {
    a.checked_add(b).ok_or(Error::Overflow)
}

fn sub(a: Balance, b: Balance) -> Result<Balance> {
    a.checked_sub(b).ok_or(Error::Overflow)
}
