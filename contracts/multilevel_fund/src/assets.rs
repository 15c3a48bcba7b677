//! Asset adapters.
//!
//! Two token capabilities exist in the wild:
//!
//! ```text
//!   StandardToken     transfer / transfer_from report success with a flag
//!   NonStandardToken  transfer / transfer_from return nothing (USDT-style)
//! ```
//!
//! The engine is written once against [`Asset`]; [`Standard`] and
//! [`NonStandard`] lift each capability into it. For the non-standard kind a
//! call that does not revert is taken as success, with no balance-delta check.

use ink::env::call::{build_call, ExecutionInput, Selector};
use ink::env::DefaultEnvironment;
use ink::primitives::AccountId;

use crate::errors::{Error, Result};
use crate::Balance;

/// Token whose mutating calls return a success flag.
pub trait StandardToken {
    fn balance_of(&self, owner: AccountId) -> Result<Balance>;
    fn transfer(&mut self, to: AccountId, value: Balance) -> Result<bool>;
    fn transfer_from(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<bool>;
}

/// Token whose mutating calls return nothing.
pub trait NonStandardToken {
    fn balance_of(&self, owner: AccountId) -> Result<Balance>;
    fn transfer(&mut self, to: AccountId, value: Balance) -> Result<()>;
    fn transfer_from(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<()>;
}

/// Uniform asset interface consumed by the engine. `Err` means the movement
/// did not happen and the surrounding operation must abort.
pub trait Asset {
    fn balance_of(&self, owner: AccountId) -> Result<Balance>;
    fn transfer(&mut self, to: AccountId, value: Balance) -> Result<()>;
    fn transfer_from(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<()>;
}

/// Treats a `false` flag exactly like a reverted call.
#[derive(Debug, Clone)]
pub struct Standard<T>(pub T);

impl<T: StandardToken> Asset for Standard<T> {
    fn balance_of(&self, owner: AccountId) -> Result<Balance> {
        self.0.balance_of(owner)
    }

    fn transfer(&mut self, to: AccountId, value: Balance) -> Result<()> {
        if !self.0.transfer(to, value)? {
            return Err(Error::TransferRejected);
        }
        Ok(())
    }

    fn transfer_from(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<()> {
        if !self.0.transfer_from(from, to, value)? {
            return Err(Error::TransferRejected);
        }
        Ok(())
    }
}

/// Assumes success unless the call itself fails.
#[derive(Debug, Clone)]
pub struct NonStandard<T>(pub T);

impl<T: NonStandardToken> Asset for NonStandard<T> {
    fn balance_of(&self, owner: AccountId) -> Result<Balance> {
        self.0.balance_of(owner)
    }

    fn transfer(&mut self, to: AccountId, value: Balance) -> Result<()> {
        self.0.transfer(to, value)
    }

    fn transfer_from(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<()> {
        self.0.transfer_from(from, to, value)
    }
}

// =========================================================================
// CROSS-CONTRACT ADAPTERS
// =========================================================================

/// On-chain base token; replies with `Result<(), TokenError>`.
#[derive(Debug, Clone, Copy)]
pub struct RemoteStandardToken {
    account: AccountId,
}

impl RemoteStandardToken {
    pub fn new(account: AccountId) -> Self {
        Self { account }
    }
}

impl StandardToken for RemoteStandardToken {
    fn balance_of(&self, owner: AccountId) -> Result<Balance> {
        query_balance(self.account, owner)
    }

    fn transfer(&mut self, to: AccountId, value: Balance) -> Result<bool> {
        build_call::<DefaultEnvironment>()
            .call(self.account)
            .exec_input(
                ExecutionInput::new(Selector::new(ink::selector_bytes!("transfer")))
                    .push_arg(to)
                    .push_arg(value),
            )
            .returns::<core::result::Result<(), fund_token::TokenError>>()
            .try_invoke()
            .map_err(|_| Error::AssetCallFailed)?
            .map(|reply| reply.is_ok())
            .map_err(|_| Error::AssetCallFailed)
    }

    fn transfer_from(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<bool> {
        build_call::<DefaultEnvironment>()
            .call(self.account)
            .exec_input(
                ExecutionInput::new(Selector::new(ink::selector_bytes!("transfer_from")))
                    .push_arg(from)
                    .push_arg(to)
                    .push_arg(value),
            )
            .returns::<core::result::Result<(), fund_token::TokenError>>()
            .try_invoke()
            .map_err(|_| Error::AssetCallFailed)?
            .map(|reply| reply.is_ok())
            .map_err(|_| Error::AssetCallFailed)
    }
}

/// On-chain quote token; replies with nothing.
#[derive(Debug, Clone, Copy)]
pub struct RemoteNonStandardToken {
    account: AccountId,
}

impl RemoteNonStandardToken {
    pub fn new(account: AccountId) -> Self {
        Self { account }
    }
}

impl NonStandardToken for RemoteNonStandardToken {
    fn balance_of(&self, owner: AccountId) -> Result<Balance> {
        query_balance(self.account, owner)
    }

    fn transfer(&mut self, to: AccountId, value: Balance) -> Result<()> {
        build_call::<DefaultEnvironment>()
            .call(self.account)
            .exec_input(
                ExecutionInput::new(Selector::new(ink::selector_bytes!("transfer")))
                    .push_arg(to)
                    .push_arg(value),
            )
            .returns::<()>()
            .try_invoke()
            .map_err(|_| Error::AssetCallFailed)?
            .map_err(|_| Error::AssetCallFailed)
    }

    fn transfer_from(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<()> {
        build_call::<DefaultEnvironment>()
            .call(self.account)
            .exec_input(
                ExecutionInput::new(Selector::new(ink::selector_bytes!("transfer_from")))
                    .push_arg(from)
                    .push_arg(to)
                    .push_arg(value),
            )
            .returns::<()>()
            .try_invoke()
            .map_err(|_| Error::AssetCallFailed)?
            .map_err(|_| Error::AssetCallFailed)
    }
}

fn query_balance(token: AccountId, owner: AccountId) -> Result<Balance> {
    build_call::<DefaultEnvironment>()
        .call(token)
        .exec_input(
            ExecutionInput::new(Selector::new(ink::selector_bytes!("balance_of"))).push_arg(owner),
        )
        .returns::<Balance>()
        .try_invoke()
        .map_err(|_| Error::AssetCallFailed)?
        .map_err(|_| Error::AssetCallFailed)
}

/// In-memory token used by the host-side tests.
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone)]
    pub(crate) struct MockToken {
        balances: BTreeMap<AccountId, Balance>,
        allowances: BTreeMap<(AccountId, AccountId), Balance>,
        /// The account issuing calls into this token (the fund).
        operator: AccountId,
        /// Make every movement fail the way the token kind fails.
        pub(crate) frozen: bool,
    }

    impl MockToken {
        pub(crate) fn new(operator: AccountId) -> Self {
            Self {
                balances: BTreeMap::new(),
                allowances: BTreeMap::new(),
                operator,
                frozen: false,
            }
        }

        pub(crate) fn mint(&mut self, to: AccountId, value: Balance) {
            *self.balances.entry(to).or_default() += value;
        }

        pub(crate) fn burn(&mut self, from: AccountId, value: Balance) {
            *self.balances.entry(from).or_default() -= value;
        }

        /// `owner` lets the fund spend `value`.
        pub(crate) fn approve(&mut self, owner: AccountId, value: Balance) {
            self.allowances.insert((owner, self.operator), value);
        }

        pub(crate) fn balance(&self, owner: AccountId) -> Balance {
            self.balances.get(&owner).copied().unwrap_or(0)
        }

        fn move_funds(&mut self, from: AccountId, to: AccountId, value: Balance) -> bool {
            if self.frozen || self.balance(from) < value {
                return false;
            }
            *self.balances.entry(from).or_default() -= value;
            *self.balances.entry(to).or_default() += value;
            true
        }

        fn pull(&mut self, from: AccountId, to: AccountId, value: Balance) -> bool {
            let key = (from, self.operator);
            let allowance = self.allowances.get(&key).copied().unwrap_or(0);
            if allowance < value || self.frozen || self.balance(from) < value {
                return false;
            }
            self.allowances.insert(key, allowance - value);
            self.move_funds(from, to, value)
        }
    }

    impl StandardToken for MockToken {
        fn balance_of(&self, owner: AccountId) -> Result<Balance> {
            Ok(self.balance(owner))
        }

        fn transfer(&mut self, to: AccountId, value: Balance) -> Result<bool> {
            let from = self.operator;
            Ok(self.move_funds(from, to, value))
        }

        fn transfer_from(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: Balance,
        ) -> Result<bool> {
            Ok(self.pull(from, to, value))
        }
    }

    impl NonStandardToken for MockToken {
        fn balance_of(&self, owner: AccountId) -> Result<Balance> {
            Ok(self.balance(owner))
        }

        fn transfer(&mut self, to: AccountId, value: Balance) -> Result<()> {
            let from = self.operator;
            if !self.move_funds(from, to, value) {
                return Err(Error::AssetCallFailed);
            }
            Ok(())
        }

        fn transfer_from(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<()> {
            if !self.pull(from, to, value) {
                return Err(Error::AssetCallFailed);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockToken;
    use super::*;

    fn account(n: u8) -> AccountId {
        AccountId::from([n; 32])
    }

    #[test]
    fn standard_false_flag_becomes_rejection() {
        let fund = account(1);
        let mut token = Standard(MockToken::new(fund));
        token.0.mint(fund, 10);

        assert_eq!(token.transfer(account(2), 11), Err(Error::TransferRejected));
        assert!(token.transfer(account(2), 10).is_ok());
        assert_eq!(token.balance_of(account(2)), Ok(10));
    }

    #[test]
    fn standard_transfer_from_needs_allowance() {
        let fund = account(1);
        let alice = account(2);
        let mut token = Standard(MockToken::new(fund));
        token.0.mint(alice, 50);

        assert_eq!(token.transfer_from(alice, fund, 5), Err(Error::TransferRejected));
        token.0.approve(alice, 5);
        assert!(token.transfer_from(alice, fund, 5).is_ok());
        assert_eq!(token.0.balance(fund), 5);
    }

    #[test]
    fn non_standard_failure_is_a_reverted_call() {
        let fund = account(1);
        let mut token = NonStandard(MockToken::new(fund));
        assert_eq!(token.transfer(account(2), 1), Err(Error::AssetCallFailed));

        token.0.mint(fund, 1);
        token.0.frozen = true;
        assert_eq!(token.transfer(account(2), 1), Err(Error::AssetCallFailed));
        assert_eq!(token.0.balance(fund), 1);
    }
}
