// ── Account directory ──
//
// Cloud account metadata keyed by account id. Same lifecycle as the
// cross-reference index: built per run, read-only, a miss is empty.

use tracing::debug;

use super::collection::KeyedCollection;
use crate::model::{FieldAccess, SourceRecord};

/// Organization data for one cloud account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountContext {
    pub company: String,
    pub email: String,
    pub ou_name: String,
    pub ou_id: String,
}

static NO_ACCOUNT: AccountContext = AccountContext {
    company: String::new(),
    email: String::new(),
    ou_name: String::new(),
    ou_id: String::new(),
};

impl AccountContext {
    fn from_record(record: &SourceRecord) -> Self {
        Self {
            company: record.text("company"),
            email: record.text("email"),
            ou_name: record.first_text(&["ou_name", "ouName"]),
            ou_id: record.first_text(&["ou_id", "ouId"]),
        }
    }

    /// Context pre-attached to a device record under `account_*` keys.
    pub fn embedded<R: FieldAccess + ?Sized>(record: &R) -> Self {
        Self {
            company: record.text("account_company"),
            email: record.text("account_email"),
            ou_name: record.text("account_ou_name"),
            ou_id: record.truthy_text("account_ou_id"),
        }
    }

    pub fn none() -> &'static Self {
        &NO_ACCOUNT
    }

    pub fn is_empty(&self) -> bool {
        self == &NO_ACCOUNT
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: KeyedCollection<AccountContext>,
}

impl AccountDirectory {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index account records by `id` (or `accountId`). The first record
    /// for an id wins.
    pub fn build(records: &[SourceRecord]) -> Self {
        let mut accounts = KeyedCollection::new();
        for record in records {
            let id = record.first_text(&["id", "accountId"]);
            accounts.insert([id], AccountContext::from_record(record));
        }
        debug!(accounts = accounts.len(), "account directory built");
        Self { accounts }
    }

    pub fn lookup(&self, account_id: &str) -> &AccountContext {
        self.accounts.get(account_id.trim()).unwrap_or(&NO_ACCOUNT)
    }

    /// Account context for a device: directory entry first, then the
    /// record's own `account_*` keys.
    pub fn resolve<R: FieldAccess + ?Sized>(&self, device: &R) -> AccountContext {
        let found = self.lookup(&device.text("accountId"));
        if found.is_empty() {
            AccountContext::embedded(device)
        } else {
            found.clone()
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
