//! Owner-only operations.
//!
//! Privilege is checked once, in [`Ownership::authorize`], which hands back an
//! [`AdminCap`]. Everything below takes the capability instead of a caller, so
//! an admin operation cannot be reached without passing the owner check.

use ink::primitives::AccountId;

use crate::assets::Asset;
use crate::engine::CallContext;
use crate::errors::{Error, Result};
use crate::ledger::Ledger;
use crate::Balance;

#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Ownership {
    owner: AccountId,
}

impl Ownership {
    pub fn new(owner: AccountId) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn authorize(&self, caller: AccountId) -> Result<AdminCap> {
        if caller != self.owner {
            return Err(Error::NotOwner);
        }
        Ok(AdminCap { holder: caller })
    }

    /// Hand the fund to `new_owner`. Returns the previous owner.
    pub fn transfer(&mut self, _cap: &AdminCap, new_owner: AccountId) -> Result<AccountId> {
        if is_zero(&new_owner) {
            return Err(Error::ZeroAddress);
        }
        let previous = self.owner;
        self.owner = new_owner;
        Ok(previous)
    }
}

/// Proof that the current caller is the owner. Only [`Ownership::authorize`]
/// creates one.
#[derive(Debug)]
pub struct AdminCap {
    holder: AccountId,
}

impl AdminCap {
    pub fn holder(&self) -> AccountId {
        self.holder
    }
}

/// Returns `true` if the fund was running.
pub fn pause(_cap: &AdminCap, ledger: &mut Ledger) -> bool {
    let changed = !ledger.paused;
    ledger.paused = true;
    changed
}

/// Returns `true` if the fund was paused.
pub fn unpause(_cap: &AdminCap, ledger: &mut Ledger) -> bool {
    let changed = ledger.paused;
    ledger.paused = false;
    changed
}

pub fn set_minimum_invest_amount(
    _cap: &AdminCap,
    ledger: &mut Ledger,
    amount: Balance,
) -> Result<Balance> {
    if amount == 0 {
        return Err(Error::ZeroAmount);
    }
    Ok(core::mem::replace(&mut ledger.minimum_invest_amount, amount))
}

pub fn set_payout_address(
    _cap: &AdminCap,
    ledger: &mut Ledger,
    payout: AccountId,
) -> Result<AccountId> {
    if is_zero(&payout) {
        return Err(Error::ZeroAddress);
    }
    Ok(core::mem::replace(&mut ledger.payout_address, payout))
}

/// Move `amount` of the insured quote reserve to the owner once the lock has
/// elapsed.
pub fn withdraw_insurance_reserve<Q: Asset>(
    cap: &AdminCap,
    ledger: &mut Ledger,
    quote: &mut Q,
    ctx: &CallContext,
    amount: Balance,
) -> Result<()> {
    if amount == 0 {
        return Err(Error::ZeroAmount);
    }
    if ctx.now < ledger.insurance_unlocks_at() {
        return Err(Error::InsuranceLocked);
    }

    ledger.enter()?;
    let result = push_reserve(
        quote,
        ctx.this,
        cap.holder(),
        amount,
        Error::InsufficientQuoteReserve,
    );
    ledger.exit();
    result
}

/// Move `amount` of unsold base asset to the owner. Not time-locked.
pub fn withdraw_base_reserve<B: Asset>(
    cap: &AdminCap,
    ledger: &mut Ledger,
    base: &mut B,
    ctx: &CallContext,
    amount: Balance,
) -> Result<()> {
    if amount == 0 {
        return Err(Error::ZeroAmount);
    }

    ledger.enter()?;
    let result = push_reserve(base, ctx.this, cap.holder(), amount, Error::InsufficientBaseReserve);
    ledger.exit();
    result
}

fn push_reserve<A: Asset>(
    asset: &mut A,
    this: AccountId,
    to: AccountId,
    amount: Balance,
    short: Error,
) -> Result<()> {
    if asset.balance_of(this)? < amount {
        return Err(short);
    }
    asset.transfer(to, amount)
}

fn is_zero(account: &AccountId) -> bool {
    *account == AccountId::from([0u8; 32])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::mock::MockToken;
    use crate::assets::{NonStandard, Standard};

    const DAY: u64 = 24 * 60 * 60 * 1_000;

    fn account(n: u8) -> AccountId {
        AccountId::from([n; 32])
    }
    fn owner() -> AccountId {
        account(0xA0)
    }
    fn fund() -> AccountId {
        account(0xF0)
    }

    fn ledger() -> Ledger {
        Ledger::new(10_000_000_000_000_000, owner(), 1_000).unwrap()
    }

    fn ctx(now: u64) -> CallContext {
        CallContext {
            caller: owner(),
            this: fund(),
            block: 1,
            now,
        }
    }

    fn cap() -> AdminCap {
        Ownership::new(owner()).authorize(owner()).unwrap()
    }

    #[test]
    fn only_owner_is_authorized() {
        let ownership = Ownership::new(owner());
        assert_eq!(ownership.authorize(account(1)).unwrap_err(), Error::NotOwner);
        assert_eq!(ownership.authorize(owner()).unwrap().holder(), owner());
    }

    #[test]
    fn transfer_moves_privilege() {
        let mut ownership = Ownership::new(owner());
        let cap = ownership.authorize(owner()).unwrap();

        assert_eq!(ownership.transfer(&cap, AccountId::from([0u8; 32])), Err(Error::ZeroAddress));
        assert_eq!(ownership.transfer(&cap, account(1)), Ok(owner()));
        assert_eq!(ownership.owner(), account(1));
        assert!(ownership.authorize(owner()).is_err());
    }

    #[test]
    fn pause_is_idempotent() {
        let mut ledger = ledger();
        let cap = cap();

        assert!(pause(&cap, &mut ledger));
        assert!(!pause(&cap, &mut ledger));
        assert!(ledger.paused);
        assert!(unpause(&cap, &mut ledger));
        assert!(!unpause(&cap, &mut ledger));
        assert!(!ledger.paused);
    }

    #[test]
    fn setters_validate_and_return_previous() {
        let mut ledger = ledger();
        let cap = cap();

        assert_eq!(set_minimum_invest_amount(&cap, &mut ledger, 0), Err(Error::ZeroAmount));
        assert_eq!(set_minimum_invest_amount(&cap, &mut ledger, 1_000_000), Ok(0));
        assert_eq!(ledger.minimum_invest_amount, 1_000_000);

        assert_eq!(
            set_payout_address(&cap, &mut ledger, AccountId::from([0u8; 32])),
            Err(Error::ZeroAddress)
        );
        assert_eq!(set_payout_address(&cap, &mut ledger, account(9)), Ok(owner()));
        assert_eq!(ledger.payout_address, account(9));
    }

    #[test]
    fn insurance_reserve_is_time_locked() {
        let mut ledger = ledger();
        let mut quote = NonStandard(MockToken::new(fund()));
        quote.0.mint(fund(), 500);
        let unlock = ledger.insurance_unlocks_at();
        assert_eq!(unlock, 1_000 + 730 * DAY);

        assert_eq!(
            withdraw_insurance_reserve(&cap(), &mut ledger, &mut quote, &ctx(unlock - 1), 100),
            Err(Error::InsuranceLocked)
        );
        assert_eq!(quote.0.balance(owner()), 0);

        for now in [unlock, unlock + DAY] {
            let result = withdraw_insurance_reserve(&cap(), &mut ledger, &mut quote, &ctx(now), 100);
            assert!(result.is_ok());
        }
        assert_eq!(quote.0.balance(owner()), 200);
        assert_eq!(quote.0.balance(fund()), 300);
        assert!(!ledger.entered);
    }

    #[test]
    fn withdrawals_check_reserve_and_amount() {
        let mut ledger = ledger();
        let unlock = ledger.insurance_unlocks_at();
        let mut quote = NonStandard(MockToken::new(fund()));
        let mut base = Standard(MockToken::new(fund()));
        base.0.mint(fund(), 10);

        assert_eq!(
            withdraw_insurance_reserve(&cap(), &mut ledger, &mut quote, &ctx(unlock), 1),
            Err(Error::InsufficientQuoteReserve)
        );
        assert_eq!(
            withdraw_insurance_reserve(&cap(), &mut ledger, &mut quote, &ctx(unlock), 0),
            Err(Error::ZeroAmount)
        );
        assert_eq!(
            withdraw_base_reserve(&cap(), &mut ledger, &mut base, &ctx(0), 11),
            Err(Error::InsufficientBaseReserve)
        );
        assert!(withdraw_base_reserve(&cap(), &mut ledger, &mut base, &ctx(0), 10).is_ok());
        assert_eq!(base.0.balance(owner()), 10);
        assert!(!ledger.entered);
    }

    #[test]
    fn withdrawal_rejected_while_engine_runs() {
        let mut ledger = ledger();
        let mut base = Standard(MockToken::new(fund()));
        base.0.mint(fund(), 10);
        ledger.entered = true;

        assert_eq!(
            withdraw_base_reserve(&cap(), &mut ledger, &mut base, &ctx(0), 5),
            Err(Error::Reentrancy)
        );
        assert_eq!(base.0.balance(fund()), 10);
    }
}
