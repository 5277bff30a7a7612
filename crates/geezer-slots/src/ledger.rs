//! Ticket and unit balances, stored in sled.
//!
//! Two trees keyed by the decimal user id, values stored as decimal ASCII:
//! `tickets` (a user with no entry holds [`STARTING_TICKETS`]) and
//! `account` (no entry means 0 units).

use std::io::Write;
use std::path::Path;

use sled::Transactional;
use sled::transaction::{ConflictableTransactionError, TransactionError};

use crate::machine::PULL_COST;

pub const STARTING_TICKETS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerTree {
    Tickets,
    Account,
}

impl LedgerTree {
    pub const ALL: [LedgerTree; 2] = [LedgerTree::Tickets, LedgerTree::Account];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Tickets => "tickets",
            Self::Account => "account",
        }
    }

    const fn default_value(self) -> u64 {
        match self {
            Self::Tickets => STARTING_TICKETS,
            Self::Account => 0,
        }
    }
}

/// Balances after a settled pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub tickets_left: u64,
    pub units: u64,
}

#[derive(Clone)]
pub struct Ledger {
    db: sled::Db,
    tickets: sled::Tree,
    account: sled::Tree,
}

impl Ledger {
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let db = sled::open(path).map_err(|e| LedgerError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), "ledger opened");
        Self::from_db(db)
    }

    /// In-memory ledger, removed on drop.
    pub fn temporary() -> Result<Self, LedgerError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, LedgerError> {
        Ok(Self {
            tickets: db.open_tree(LedgerTree::Tickets.name())?,
            account: db.open_tree(LedgerTree::Account.name())?,
            db,
        })
    }

    fn tree(&self, which: LedgerTree) -> &sled::Tree {
        match which {
            LedgerTree::Tickets => &self.tickets,
            LedgerTree::Account => &self.account,
        }
    }

    pub fn tickets(&self, user: u64) -> Result<u64, LedgerError> {
        self.read(LedgerTree::Tickets, user)
    }

    pub fn units(&self, user: u64) -> Result<u64, LedgerError> {
        self.read(LedgerTree::Account, user)
    }

    fn read(&self, which: LedgerTree, user: u64) -> Result<u64, LedgerError> {
        match self.tree(which).get(user.to_string())? {
            Some(raw) => decode(which, user, &raw),
            None => Ok(which.default_value()),
        }
    }

    /// Grant tickets, e.g. from an operator top-up.
    pub fn grant_tickets(&self, user: u64, amount: u64) -> Result<u64, LedgerError> {
        let current = self.tickets(user)?;
        let updated = current.saturating_add(amount);
        self.tickets
            .insert(user.to_string(), updated.to_string().as_bytes())?;
        Ok(updated)
    }

    /// Consume one ticket and credit `payout` units in a single transaction.
    ///
    /// With no tickets left, fails with [`LedgerError::OutOfTickets`] and
    /// leaves both trees untouched.
    pub fn settle_pull(&self, user: u64, payout: u64) -> Result<Settlement, LedgerError> {
        let key = user.to_string();

        let result = (&self.tickets, &self.account).transaction(
            |(tickets, account)| -> Result<Settlement, ConflictableTransactionError<LedgerError>> {
                let held = match tickets.get(key.as_bytes())? {
                    Some(raw) => decode(LedgerTree::Tickets, user, &raw)
                        .map_err(ConflictableTransactionError::Abort)?,
                    None => STARTING_TICKETS,
                };
                if held < PULL_COST {
                    return Err(ConflictableTransactionError::Abort(
                        LedgerError::OutOfTickets { user },
                    ));
                }
                let units = match account.get(key.as_bytes())? {
                    Some(raw) => decode(LedgerTree::Account, user, &raw)
                        .map_err(ConflictableTransactionError::Abort)?,
                    None => 0,
                };

                let settlement = Settlement {
                    tickets_left: held - PULL_COST,
                    units: units.saturating_add(payout),
                };
                tickets.insert(key.as_bytes(), settlement.tickets_left.to_string().as_bytes())?;
                account.insert(key.as_bytes(), settlement.units.to_string().as_bytes())?;
                Ok(settlement)
            },
        );

        match result {
            Ok(settlement) => {
                tracing::debug!(
                    user,
                    payout,
                    tickets_left = settlement.tickets_left,
                    units = settlement.units,
                    "pull settled"
                );
                Ok(settlement)
            }
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(LedgerError::Storage(e)),
        }
    }

    /// Persist pending writes to disk.
    pub async fn flush(&self) -> Result<usize, LedgerError> {
        Ok(self.db.flush_async().await?)
    }

    /// Write one tree as text: `tree`, the tree name, then `key,value` lines.
    pub fn export<W: Write>(&self, which: LedgerTree, mut out: W) -> Result<(), LedgerError> {
        let tree = self.tree(which);
        let export_err = |e: std::io::Error| LedgerError::Export {
            tree: which.name(),
            source: e,
        };

        out.write_all(b"tree\n").map_err(export_err)?;
        out.write_all(&tree.name()).map_err(export_err)?;
        out.write_all(b"\n").map_err(export_err)?;
        for entry in tree.iter() {
            let (key, value) = entry?;
            out.write_all(&key).map_err(export_err)?;
            out.write_all(b",").map_err(export_err)?;
            out.write_all(&value).map_err(export_err)?;
            out.write_all(b"\n").map_err(export_err)?;
        }
        out.flush().map_err(export_err)?;
        Ok(())
    }
}

fn decode(which: LedgerTree, user: u64, raw: &[u8]) -> Result<u64, LedgerError> {
    let text = String::from_utf8_lossy(raw);
    text.parse().map_err(|_| LedgerError::Corrupt {
        tree: which.name(),
        user,
        value: text.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to open ledger at {path}")]
    Open {
        path: std::path::PathBuf,
        source: sled::Error,
    },

    #[error("ledger storage error")]
    Storage(#[from] sled::Error),

    #[error("user {user} has no tickets left")]
    OutOfTickets { user: u64 },

    #[error("{tree} entry for user {user} is not a count: {value:?}")]
    Corrupt {
        tree: &'static str,
        user: u64,
        value: String,
    },

    #[error("failed to export {tree}")]
    Export {
        tree: &'static str,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_defaults() {
        let ledger = Ledger::temporary().unwrap();
        assert_eq!(ledger.tickets(42).unwrap(), 50);
        assert_eq!(ledger.units(42).unwrap(), 0);
    }

    #[test]
    fn settle_consumes_ticket_and_credits_units() {
        let ledger = Ledger::temporary().unwrap();

        let first = ledger.settle_pull(7, 250).unwrap();
        assert_eq!(
            first,
            Settlement {
                tickets_left: 49,
                units: 250
            }
        );

        let second = ledger.settle_pull(7, 0).unwrap();
        assert_eq!(second.tickets_left, 48);
        assert_eq!(second.units, 250);
        assert_eq!(ledger.tickets(7).unwrap(), 48);
        assert_eq!(ledger.units(7).unwrap(), 250);
    }

    #[test]
    fn out_of_tickets_changes_nothing() {
        let ledger = Ledger::temporary().unwrap();
        for _ in 0..STARTING_TICKETS {
            ledger.settle_pull(9, 25).unwrap();
        }
        assert_eq!(ledger.tickets(9).unwrap(), 0);
        let units = ledger.units(9).unwrap();

        let err = ledger.settle_pull(9, 5000).unwrap_err();
        assert!(matches!(err, LedgerError::OutOfTickets { user: 9 }));
        assert_eq!(ledger.tickets(9).unwrap(), 0);
        assert_eq!(ledger.units(9).unwrap(), units);
    }

    #[test]
    fn users_are_independent() {
        let ledger = Ledger::temporary().unwrap();
        ledger.settle_pull(1, 100).unwrap();
        assert_eq!(ledger.tickets(2).unwrap(), 50);
        assert_eq!(ledger.units(2).unwrap(), 0);
    }

    #[test]
    fn grant_tickets_restores_pulls() {
        let ledger = Ledger::temporary().unwrap();
        for _ in 0..STARTING_TICKETS {
            ledger.settle_pull(3, 0).unwrap();
        }
        assert_eq!(ledger.grant_tickets(3, 2).unwrap(), 2);
        assert_eq!(ledger.settle_pull(3, 25).unwrap().tickets_left, 1);
    }

    #[test]
    fn corrupt_value_is_reported() {
        let ledger = Ledger::temporary().unwrap();
        ledger.account.insert("5", "lots").unwrap();

        let err = ledger.units(5).unwrap_err();
        assert!(matches!(err, LedgerError::Corrupt { tree: "account", user: 5, .. }));

        let err = ledger.settle_pull(5, 25).unwrap_err();
        assert!(matches!(err, LedgerError::Corrupt { .. }));
        assert_eq!(ledger.tickets(5).unwrap(), 50);
    }

    #[test]
    fn export_writes_header_and_pairs() {
        let ledger = Ledger::temporary().unwrap();
        ledger.settle_pull(11, 100).unwrap();
        ledger.settle_pull(12, 0).unwrap();

        let mut out = Vec::new();
        ledger.export(LedgerTree::Tickets, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "tree\ntickets\n11,49\n12,49\n");

        let mut out = Vec::new();
        ledger.export(LedgerTree::Account, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "tree\naccount\n11,100\n12,0\n");
    }

    #[tokio::test]
    async fn reopen_after_flush_keeps_balances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let ledger = Ledger::open(dir.path()).unwrap();
            ledger.settle_pull(77, 1000).unwrap();
            ledger.flush().await.unwrap();
        }
        let ledger = Ledger::open(dir.path()).unwrap();
        assert_eq!(ledger.tickets(77).unwrap(), 49);
        assert_eq!(ledger.units(77).unwrap(), 1000);
    }
}
