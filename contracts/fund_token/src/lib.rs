#![cfg_attr(not(feature = "std"), no_std, no_main)]

//! Fixed-supply burnable token sold by the multi-level fund.
//!
//! The whole supply is minted to the deployer on construction; afterwards the
//! supply only ever shrinks through `burn` / `burn_from`. Every mutating
//! message returns `Result<(), TokenError>`, which is the success flag the
//! fund's standard asset adapter reads back.

pub mod constants {
    pub const DECIMALS: u8 = 18;
    pub const SCALING_FACTOR: u128 = 1_000_000_000_000_000_000u128;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode, thiserror::Error)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum TokenError {
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("insufficient allowance")]
    InsufficientAllowance,
    #[error("zero-value transfer")]
    ZeroTransfer,
    #[error("arithmetic overflow")]
    Overflow,
}

#[ink::contract]
mod fund_token {
    use super::constants::*;
    use super::TokenError as Error;
    use ink::prelude::string::String;
    use ink::storage::Mapping;

    #[ink(storage)]
    pub struct FundToken {
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,
        total_supply: Balance,
        total_burned: Balance,
        name: String,
        symbol: String,
    }

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from: Option<AccountId>,
        #[ink(topic)]
        to: Option<AccountId>,
        value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        spender: AccountId,
        value: Balance,
    }

    #[ink(event)]
    pub struct Burn {
        #[ink(topic)]
        from: AccountId,
        amount: Balance,
        new_total_supply: Balance,
        total_burned: Balance,
    }

    impl FundToken {
        #[ink(constructor)]
        pub fn new(initial_supply: Balance, name: String, symbol: String) -> Self {
            let caller = Self::env().caller();
            let mut balances = Mapping::default();
            balances.insert(caller, &initial_supply);

            Self::env().emit_event(Transfer {
                from: None,
                to: Some(caller),
                value: initial_supply,
            });

            Self {
                balances,
                allowances: Mapping::default(),
                total_supply: initial_supply,
                total_burned: 0,
                name,
                symbol,
            }
        }

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply
        }

        #[ink(message)]
        pub fn balance_of(&self, owner: AccountId) -> Balance {
            self.balances.get(owner).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
            self.allowances.get((owner, spender)).unwrap_or(0)
        }

        #[ink(message)]
        pub fn approve(&mut self, spender: AccountId, value: Balance) -> Result<(), Error> {
            let owner = self.env().caller();
            self.allowances.insert((owner, spender), &value);
            self.env().emit_event(Approval { owner, spender, value });
            Ok(())
        }

        #[ink(message)]
        pub fn transfer(&mut self, to: AccountId, value: Balance) -> Result<(), Error> {
            let from = self.env().caller();
            self.transfer_impl(from, to, value)
        }

        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: Balance,
        ) -> Result<(), Error> {
            let spender = self.env().caller();
            self.spend_allowance(from, spender, value)?;
            self.transfer_impl(from, to, value)
        }

        /// Destroy `amount` of the caller's tokens.
        #[ink(message)]
        pub fn burn(&mut self, amount: Balance) -> Result<(), Error> {
            let from = self.env().caller();
            self.burn_impl(from, amount)
        }

        /// Destroy `amount` of `from`'s tokens against the caller's allowance.
        #[ink(message)]
        pub fn burn_from(&mut self, from: AccountId, amount: Balance) -> Result<(), Error> {
            let spender = self.env().caller();
            self.spend_allowance(from, spender, amount)?;
            self.burn_impl(from, amount)
        }

        #[ink(message)]
        pub fn name(&self) -> String {
            self.name.clone()
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            self.symbol.clone()
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            DECIMALS
        }

        #[ink(message)]
        pub fn get_burn_stats(&self) -> (Balance, Balance) {
            (self.total_burned, self.total_supply)
        }

        fn transfer_impl(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: Balance,
        ) -> Result<(), Error> {
            if value == 0 {
                return Err(Error::ZeroTransfer);
            }
            self.debit_balance(from, value)?;
            self.credit_balance(to, value)?;
            self.env().emit_event(Transfer {
                from: Some(from),
                to: Some(to),
                value,
            });
            Ok(())
        }

        fn burn_impl(&mut self, from: AccountId, amount: Balance) -> Result<(), Error> {
            if amount == 0 {
                return Err(Error::ZeroTransfer);
            }
            self.debit_balance(from, amount)?;
            // True burn: reduce supply, don't credit anywhere
            self.total_supply = self.total_supply.checked_sub(amount).ok_or(Error::Overflow)?;
            self.total_burned = self.total_burned.checked_add(amount).ok_or(Error::Overflow)?;

            self.env().emit_event(Burn {
                from,
                amount,
                new_total_supply: self.total_supply,
                total_burned: self.total_burned,
            });
            Ok(())
        }

        fn spend_allowance(
            &mut self,
            owner: AccountId,
            spender: AccountId,
            value: Balance,
        ) -> Result<(), Error> {
            let allowance = self.allowance(owner, spender);
            if allowance < value {
                return Err(Error::InsufficientAllowance);
            }
            self.allowances.insert((owner, spender), &(allowance - value));
            Ok(())
        }

        fn debit_balance(&mut self, account: AccountId, amount: Balance) -> Result<(), Error> {
            let balance = self.balances.get(account).unwrap_or(0);
            if balance < amount {
                return Err(Error::InsufficientBalance);
            }
            self.balances.insert(account, &(balance - amount));
            Ok(())
        }

        fn credit_balance(&mut self, account: AccountId, amount: Balance) -> Result<(), Error> {
            let balance = self.balances.get(account).unwrap_or(0);
            let new_balance = balance.checked_add(amount).ok_or(Error::Overflow)?;
            self.balances.insert(account, &new_balance);
            Ok(())
        }
    }

}
