//! Fund Custody
//!
//! The engine never holds balances itself. It asks a [`Ledger`] to pull
//! stakes into escrow and to pay them out again.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::game::settlement::Transfer;
use crate::game::state::{Address, Amount};

/// Ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Payer cannot cover the deposit.
    #[error("insufficient funds in {account}: need {needed}, have {available}")]
    InsufficientFunds {
        /// Paying account.
        account: Address,
        /// Amount requested.
        needed: Amount,
        /// Amount available.
        available: Amount,
    },

    /// Recipient refused the payment.
    #[error("transfer to {0} refused")]
    TransferRefused(Address),

    /// Escrow holds less than the batch pays out.
    #[error("escrow shortfall: need {needed}, have {available}")]
    EscrowShortfall {
        /// Batch total.
        needed: Amount,
        /// Escrow balance.
        available: Amount,
    },

    /// Balance arithmetic overflowed.
    #[error("balance overflow")]
    Overflow,
}

/// Custody of staked funds.
pub trait Ledger {
    /// Move `amount` from `from` into escrow.
    fn collect(&mut self, from: &Address, amount: Amount) -> Result<(), LedgerError>;

    /// Pay a batch out of escrow.
    ///
    /// Must be all-or-nothing: if any transfer fails, no transfer in the
    /// batch takes effect.
    fn disburse(&mut self, transfers: &[Transfer]) -> Result<(), LedgerError>;

    /// Total funds currently held in escrow.
    fn escrow_balance(&self) -> Amount;
}

/// In-process ledger with plain account balances.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    accounts: BTreeMap<Address, Amount>,
    escrow: Amount,
    refusing: BTreeSet<Address>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account from outside the system (faucet).
    pub fn fund(&mut self, account: Address, amount: Amount) {
        let balance = self.accounts.entry(account).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Current balance of an account.
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.accounts.get(account).copied().unwrap_or(0)
    }

    /// Make an account reject incoming payouts.
    pub fn refuse_transfers_to(&mut self, account: Address) {
        self.refusing.insert(account);
    }

    /// Let an account receive payouts again.
    pub fn accept_transfers_to(&mut self, account: &Address) {
        self.refusing.remove(account);
    }
}

impl Ledger for InMemoryLedger {
    fn collect(&mut self, from: &Address, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                account: *from,
                needed: amount,
                available,
            });
        }
        let escrow = self.escrow.checked_add(amount).ok_or(LedgerError::Overflow)?;

        self.accounts.insert(*from, available - amount);
        self.escrow = escrow;
        Ok(())
    }

    fn disburse(&mut self, transfers: &[Transfer]) -> Result<(), LedgerError> {
        // Validate the whole batch before touching any balance.
        let mut needed: Amount = 0;
        let mut credited: BTreeMap<Address, Amount> = BTreeMap::new();
        for transfer in transfers {
            if self.refusing.contains(&transfer.to) {
                return Err(LedgerError::TransferRefused(transfer.to));
            }
            needed = needed.checked_add(transfer.amount).ok_or(LedgerError::Overflow)?;

            let base = credited
                .get(&transfer.to)
                .copied()
                .unwrap_or_else(|| self.balance_of(&transfer.to));
            let next = base.checked_add(transfer.amount).ok_or(LedgerError::Overflow)?;
            credited.insert(transfer.to, next);
        }

        if needed > self.escrow {
            return Err(LedgerError::EscrowShortfall {
                needed,
                available: self.escrow,
            });
        }

        self.escrow -= needed;
        self.accounts.extend(credited);
        Ok(())
    }

    fn escrow_balance(&self) -> Amount {
        self.escrow
    }
}
