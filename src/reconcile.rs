//! Balance reconciliation: the effect of a transaction on an account's cached
//! balance.
//!
//! [apply] and [reverse] are the only two rules. A [BalancePlan] chains them
//! for the accounts touched by one transaction mutation, always starting from
//! the balances as they were before the mutation.

use std::collections::HashMap;

use crate::{Error, database_id::AccountId, money::Money};

/// The balance after a transaction of `amount` is added to `balance`.
///
/// Balances are not clamped, they may go below zero (e.g. overdraft or
/// credit).
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if the result cannot be represented.
pub fn apply(balance: Money, amount: Money) -> Result<Money, Error> {
    balance
        .checked_add(amount)
        .ok_or(Error::AmountOutOfRange)
}

/// The balance after a previously applied transaction of `amount` is taken
/// back out of `balance`.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if the result cannot be represented.
pub fn reverse(balance: Money, amount: Money) -> Result<Money, Error> {
    balance
        .checked_sub(amount)
        .ok_or(Error::AmountOutOfRange)
}

/// An amount of money added to an account by a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    /// The account the transaction belongs to.
    pub account_id: AccountId,
    /// The signed amount of the transaction.
    pub amount: Money,
}

/// Something that knows the current cached balance of accounts.
pub trait BalanceLookup {
    /// The balance of `account_id`, or `None` if there is no such account.
    fn balance(&self, account_id: AccountId) -> Option<Money>;
}

impl BalanceLookup for HashMap<AccountId, Money> {
    fn balance(&self, account_id: AccountId) -> Option<Money> {
        self.get(&account_id).copied()
    }
}

/// The new cached balance for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceUpdate {
    /// The account to update.
    pub account_id: AccountId,
    /// The account's balance after the mutation.
    pub balance: Money,
}

/// The final balances of the accounts affected by one transaction mutation.
///
/// Each account appears at most once: when a step touches an account that an
/// earlier step already touched, the step continues from the planned
/// balance, so only the end result is ever written.
///
/// Planning fails with [Error::AmountOutOfRange] if a step would take a
/// balance out of the representable range. Nothing has been written at that
/// point, so the whole mutation can be rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalancePlan {
    updates: Vec<BalanceUpdate>,
    skipped: Vec<AccountId>,
}

impl BalancePlan {
    /// Plan the balances for a newly created transaction.
    pub fn create(lookup: &impl BalanceLookup, new: Posting) -> Result<Self, Error> {
        Self::default().applying(lookup, new)
    }

    /// Plan the balances for an edited transaction.
    ///
    /// The old posting is reversed before the new one is applied. The two
    /// postings may be for different accounts.
    pub fn update(
        lookup: &impl BalanceLookup,
        old: Posting,
        new: Posting,
    ) -> Result<Self, Error> {
        Self::default()
            .reversing(lookup, old)?
            .applying(lookup, new)
    }

    /// Plan the balances for a deleted transaction.
    pub fn delete(lookup: &impl BalanceLookup, old: Posting) -> Result<Self, Error> {
        Self::default().reversing(lookup, old)
    }

    /// Add a step that applies `posting`.
    pub fn applying(
        mut self,
        lookup: &impl BalanceLookup,
        posting: Posting,
    ) -> Result<Self, Error> {
        self.adjust(lookup, posting.account_id, |balance| {
            apply(balance, posting.amount)
        })?;
        Ok(self)
    }

    /// Add a step that reverses `posting`.
    pub fn reversing(
        mut self,
        lookup: &impl BalanceLookup,
        posting: Posting,
    ) -> Result<Self, Error> {
        self.adjust(lookup, posting.account_id, |balance| {
            reverse(balance, posting.amount)
        })?;
        Ok(self)
    }

    fn adjust(
        &mut self,
        lookup: &impl BalanceLookup,
        account_id: AccountId,
        step: impl FnOnce(Money) -> Result<Money, Error>,
    ) -> Result<(), Error> {
        if let Some(update) = self
            .updates
            .iter_mut()
            .find(|update| update.account_id == account_id)
        {
            update.balance = step(update.balance)?;
            return Ok(());
        }

        match lookup.balance(account_id) {
            Some(balance) => self.updates.push(BalanceUpdate {
                account_id,
                balance: step(balance)?,
            }),
            None if !self.skipped.contains(&account_id) => self.skipped.push(account_id),
            None => {}
        }

        Ok(())
    }

    /// The new balances, in the order the accounts were first touched.
    pub fn updates(&self) -> &[BalanceUpdate] {
        &self.updates
    }

    /// Accounts that could not be reconciled because they do not exist.
    pub fn skipped(&self) -> &[AccountId] {
        &self.skipped
    }
}
