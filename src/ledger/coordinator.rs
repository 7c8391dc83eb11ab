//! The transaction coordinator: transaction CRUD with balance reconciliation.

use crate::{
    Error,
    account::{Account, AccountPatch, NewAccount},
    category::{Category, CategoryPatch, NewCategory},
    database_id::{AccountId, CategoryId, TransactionId},
    ledger::{
        state::{LedgerState, StateChange},
        store::{LedgerStore, LedgerWrite, TransactionChange},
    },
    money::Money,
    reconcile::BalancePlan,
    transaction::{NewTransaction, Transaction, TransactionKind, TransactionPatch},
};

/// Something that can go wrong with the data without stopping a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityWarning {
    /// An update was for a transaction that is not in the mirror, so the
    /// balances could not be reconciled.
    PriorVersionMissing(TransactionId),
    /// The account a transaction belongs to no longer exists, so its balance
    /// was not changed.
    AccountMissing(AccountId),
    /// The transaction's sign does not match its category's type.
    CategoryKindMismatch(CategoryId),
}

/// The result of creating or updating a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    /// The transaction as it was stored.
    pub transaction: Transaction,
    /// Problems found while reconciling.
    pub warnings: Vec<IntegrityWarning>,
}

/// The result of a delete request.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The user declined to delete the transaction, nothing was changed.
    Cancelled,
    /// The transaction was deleted.
    Deleted {
        /// The deleted transaction.
        transaction: Transaction,
        /// Problems found while reconciling.
        warnings: Vec<IntegrityWarning>,
    },
}

/// A request to change a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionIntent {
    /// Save a new transaction.
    Create(NewTransaction),
    /// Edit the transaction `id`.
    Update {
        /// The transaction to edit.
        id: TransactionId,
        /// The fields to change.
        patch: TransactionPatch,
    },
    /// Delete the transaction `id`.
    Delete(TransactionId),
}

/// The result of a [TransactionIntent].
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    /// A transaction was created or updated.
    Saved(UpdateOutcome),
    /// A delete was cancelled or carried out.
    Delete(DeleteOutcome),
}

/// Asks the user to acknowledge a delete before it goes ahead.
pub trait Confirmation {
    /// Return `true` to delete `transaction`, `false` to cancel.
    fn confirm(&mut self, transaction: &Transaction) -> bool;
}

impl<F> Confirmation for F
where
    F: FnMut(&Transaction) -> bool,
{
    fn confirm(&mut self, transaction: &Transaction) -> bool {
        self(transaction)
    }
}

/// A [Confirmation] for callers where the request itself is the user's
/// acknowledgement, e.g. an HTTP DELETE.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirmation for AlwaysConfirm {
    fn confirm(&mut self, _transaction: &Transaction) -> bool {
        true
    }
}

/// Keeps the cached account balances in step with the transactions.
///
/// Every mutation reads the balances from the mirror before anything is
/// changed, commits the transaction row and the new balances to the store in
/// one atomic write, and only then updates the mirror. If the store rejects
/// the write, neither the store nor the mirror change.
#[derive(Debug)]
pub struct TransactionCoordinator<S> {
    store: S,
    state: LedgerState,
}

impl<S> TransactionCoordinator<S>
where
    S: LedgerStore,
{
    /// Create a coordinator and load the mirror from `store`.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn new(store: S) -> Result<Self, Error> {
        let state = LedgerState::from_snapshot(store.load()?);

        Ok(Self { store, state })
    }

    /// The in-memory mirror of the store.
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// The underlying store, for read-only queries.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Carry out `intent`.
    ///
    /// `confirmation` is only asked for deletes.
    pub fn submit(
        &mut self,
        intent: TransactionIntent,
        confirmation: &mut impl Confirmation,
    ) -> Result<IntentOutcome, Error> {
        match intent {
            TransactionIntent::Create(new_transaction) => {
                self.create(new_transaction).map(IntentOutcome::Saved)
            }
            TransactionIntent::Update { id, patch } => {
                self.update(id, &patch).map(IntentOutcome::Saved)
            }
            TransactionIntent::Delete(id) => {
                self.delete(id, confirmation).map(IntentOutcome::Delete)
            }
        }
    }

    /// Save a new transaction and apply its amount to its account.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::EmptyDescription] if the description is blank,
    /// - [Error::InvalidAccount] or [Error::InvalidCategory] if the account or
    ///   category does not exist,
    /// - [Error::AmountOutOfRange] if the new balance cannot be represented,
    /// - any error from the store's commit.
    pub fn create(&mut self, new_transaction: NewTransaction) -> Result<UpdateOutcome, Error> {
        let new_transaction = new_transaction.normalized();
        self.validate(
            &new_transaction.description,
            new_transaction.account_id,
            new_transaction.category_id,
        )?;

        let plan = BalancePlan::create(&self.state, new_transaction.posting())?;
        let mut warnings =
            self.category_warnings(new_transaction.category_id, new_transaction.amount);
        let write = LedgerWrite {
            change: TransactionChange::Insert(new_transaction),
            balances: plan.updates().to_vec(),
        };

        let transaction = self.commit(&write)?;
        warnings.extend(skipped_warnings(&plan));
        self.apply_write(&transaction, &write);

        tracing::info!(
            "Created transaction {} in account {}",
            transaction.id,
            transaction.account_id
        );

        Ok(UpdateOutcome {
            transaction,
            warnings,
        })
    }

    /// Edit the transaction `id`.
    ///
    /// The old amount is reversed from the old account before the new amount
    /// is applied to the new account. If the transaction is not in the
    /// mirror, the edit is saved without touching any balance and the outcome
    /// carries [IntegrityWarning::PriorVersionMissing].
    ///
    /// # Errors
    /// Returns:
    /// - [Error::UpdateMissingTransaction] if the transaction does not exist,
    /// - [Error::EmptyDescription], [Error::InvalidAccount] or
    ///   [Error::InvalidCategory] if a changed field is invalid,
    /// - [Error::AmountOutOfRange] if a new balance cannot be represented,
    /// - any error from the store's commit.
    pub fn update(
        &mut self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<UpdateOutcome, Error> {
        let Some(prior) = self.state.transaction(id).cloned() else {
            return self.update_without_prior(id, patch);
        };

        let edited = prior.with_patch(patch);
        self.validate_changes(&prior, &edited)?;

        let plan = BalancePlan::update(&self.state, prior.posting(), edited.posting())?;
        let mut warnings =
            if prior.category_id != edited.category_id || prior.amount != edited.amount {
                self.category_warnings(edited.category_id, edited.amount)
            } else {
                Vec::new()
            };
        let write = LedgerWrite {
            change: TransactionChange::Update(edited),
            balances: plan.updates().to_vec(),
        };

        let transaction = self.commit(&write)?;
        warnings.extend(skipped_warnings(&plan));
        self.apply_write(&transaction, &write);

        tracing::info!("Updated transaction {}", transaction.id);

        Ok(UpdateOutcome {
            transaction,
            warnings,
        })
    }

    fn update_without_prior(
        &mut self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<UpdateOutcome, Error> {
        tracing::warn!(
            "Transaction {id} is not in the ledger mirror, the update will not change any balances"
        );

        let stored = match self.store.get_transaction(id) {
            Ok(stored) => stored,
            Err(Error::NotFound) => return Err(Error::UpdateMissingTransaction),
            Err(error) => return Err(error),
        };
        let edited = stored.with_patch(patch);
        self.validate_changes(&stored, &edited)?;

        let write = LedgerWrite {
            change: TransactionChange::Update(edited),
            balances: Vec::new(),
        };
        let transaction = self.commit(&write)?;
        self.apply_write(&transaction, &write);

        Ok(UpdateOutcome {
            transaction,
            warnings: vec![IntegrityWarning::PriorVersionMissing(id)],
        })
    }

    /// Delete the transaction `id` and reverse its amount from its account.
    ///
    /// `confirmation` is asked before anything is changed. If it declines,
    /// [DeleteOutcome::Cancelled] is returned and nothing is changed.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingTransaction] if the transaction does not
    /// exist, [Error::AmountOutOfRange] if the new balance cannot be
    /// represented, or any error from the store's commit.
    pub fn delete(
        &mut self,
        id: TransactionId,
        confirmation: &mut impl Confirmation,
    ) -> Result<DeleteOutcome, Error> {
        let Some(prior) = self.state.transaction(id).cloned() else {
            return Err(Error::DeleteMissingTransaction);
        };

        if !confirmation.confirm(&prior) {
            tracing::debug!("Delete of transaction {id} was cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        let plan = BalancePlan::delete(&self.state, prior.posting())?;
        let write = LedgerWrite {
            change: TransactionChange::Delete(prior),
            balances: plan.updates().to_vec(),
        };

        let transaction = self.commit(&write)?;
        let warnings = skipped_warnings(&plan);
        self.apply_write(&transaction, &write);

        tracing::info!("Deleted transaction {id}");

        Ok(DeleteOutcome::Deleted {
            transaction,
            warnings,
        })
    }

    /// Create an account.
    ///
    /// # Errors
    /// Returns [Error::EmptyName] if the name is blank, or any store error.
    pub fn create_account(&mut self, new_account: &NewAccount) -> Result<Account, Error> {
        if new_account.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        let account = self.store.create_account(new_account)?;
        self.state.apply([StateChange::PutAccount(account.clone())]);

        Ok(account)
    }

    /// Apply `patch` to the account `id`.
    ///
    /// Setting the balance overwrites the cached balance as is.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingAccount] if the account does not exist.
    pub fn update_account(&mut self, id: AccountId, patch: &AccountPatch) -> Result<Account, Error> {
        let account = self
            .state
            .account(id)
            .ok_or(Error::UpdateMissingAccount)?
            .with_patch(patch);

        if account.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        self.store.update_account(&account)?;
        self.state.apply([StateChange::PutAccount(account.clone())]);

        Ok(account)
    }

    /// Delete the account `id`. Its transactions are kept.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingAccount] if the account does not exist.
    pub fn delete_account(&mut self, id: AccountId) -> Result<Account, Error> {
        let account = self
            .state
            .account(id)
            .cloned()
            .ok_or(Error::DeleteMissingAccount)?;

        self.store.delete_account(id)?;
        self.state.apply([StateChange::RemoveAccount(id)]);

        let orphans = self
            .state
            .transactions()
            .filter(|transaction| transaction.account_id == id)
            .count();
        if orphans > 0 {
            tracing::warn!("Deleted account {id} which still has {orphans} transactions");
        }

        Ok(account)
    }

    /// Create a category.
    ///
    /// # Errors
    /// Returns [Error::EmptyName] if the name is blank, or any store error.
    pub fn create_category(&mut self, new_category: &NewCategory) -> Result<Category, Error> {
        if new_category.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        let category = self.store.create_category(new_category)?;
        self.state.apply([StateChange::PutCategory(category.clone())]);

        Ok(category)
    }

    /// Apply `patch` to the category `id`.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingCategory] if the category does not exist.
    pub fn update_category(
        &mut self,
        id: CategoryId,
        patch: &CategoryPatch,
    ) -> Result<Category, Error> {
        let category = self
            .state
            .category(id)
            .ok_or(Error::UpdateMissingCategory)?
            .with_patch(patch);

        if category.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        self.store.update_category(&category)?;
        self.state.apply([StateChange::PutCategory(category.clone())]);

        Ok(category)
    }

    /// Delete the category `id`. Its transactions are kept.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingCategory] if the category does not exist.
    pub fn delete_category(&mut self, id: CategoryId) -> Result<Category, Error> {
        let category = self
            .state
            .category(id)
            .cloned()
            .ok_or(Error::DeleteMissingCategory)?;

        self.store.delete_category(id)?;
        self.state.apply([StateChange::RemoveCategory(id)]);

        Ok(category)
    }

    fn validate(
        &self,
        description: &str,
        account_id: AccountId,
        category_id: CategoryId,
    ) -> Result<(), Error> {
        if description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        if self.state.account(account_id).is_none() {
            return Err(Error::InvalidAccount(account_id));
        }

        if self.state.category(category_id).is_none() {
            return Err(Error::InvalidCategory(category_id));
        }

        Ok(())
    }

    /// Only the references that changed are checked, so an orphaned
    /// transaction can still be edited.
    fn validate_changes(&self, prior: &Transaction, edited: &Transaction) -> Result<(), Error> {
        if edited.description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        if edited.account_id != prior.account_id && self.state.account(edited.account_id).is_none()
        {
            return Err(Error::InvalidAccount(edited.account_id));
        }

        if edited.category_id != prior.category_id
            && self.state.category(edited.category_id).is_none()
        {
            return Err(Error::InvalidCategory(edited.category_id));
        }

        Ok(())
    }

    fn category_warnings(&self, category_id: CategoryId, amount: Money) -> Vec<IntegrityWarning> {
        match self.state.category(category_id) {
            Some(category) if !category.kind.matches(amount) => {
                tracing::warn!(
                    "An {} transaction was put in the {} category \"{}\"",
                    TransactionKind::of(amount),
                    category.kind,
                    category.name
                );
                vec![IntegrityWarning::CategoryKindMismatch(category_id)]
            }
            _ => Vec::new(),
        }
    }

    fn commit(&mut self, write: &LedgerWrite) -> Result<Transaction, Error> {
        self.store.commit(write).inspect_err(|error| {
            tracing::error!("Could not commit transaction change: {error}");
        })
    }

    fn apply_write(&mut self, transaction: &Transaction, write: &LedgerWrite) {
        let record = match write.change {
            TransactionChange::Insert(_) | TransactionChange::Update(_) => {
                StateChange::PutTransaction(transaction.clone())
            }
            TransactionChange::Delete(_) => StateChange::RemoveTransaction(transaction.id),
        };

        let balances = write.balances.iter().copied().map(StateChange::SetBalance);
        self.state.apply(std::iter::once(record).chain(balances));

        for update in &write.balances {
            tracing::info!(
                "Account {} balance is now {}",
                update.account_id,
                update.balance
            );
        }
    }
}

fn skipped_warnings(plan: &BalancePlan) -> Vec<IntegrityWarning> {
    plan.skipped()
        .iter()
        .map(|&account_id| {
            tracing::warn!("Account {account_id} does not exist, its balance was not changed");
            IntegrityWarning::AccountMissing(account_id)
        })
        .collect()
}
