//! BACS service users and the transaction codes they may originate.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::transaction::{AuddisCode, CreditCode, DebitCode, TransactionCode};
use crate::error::{BacsError, Result};

lazy_static! {
    static ref USER_NUMBER: Regex = Regex::new(r"^\d{6}$").unwrap();
}

/// An organisation sponsored to submit BACS files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceUser {
    /// Six-digit service user number.
    pub user_number: String,

    /// Submits through a bureau rather than directly.
    #[serde(default)]
    pub indirect: bool,

    #[serde(default)]
    pub credit_codes: BTreeSet<CreditCode>,

    #[serde(default)]
    pub debit_codes: BTreeSet<DebitCode>,

    #[serde(default)]
    pub auddis_codes: BTreeSet<AuddisCode>,

    /// Credit codes allowed for Faster Payments.
    #[serde(default)]
    pub fps_codes: BTreeSet<CreditCode>,
}

impl ServiceUser {
    /// Create a service user permitted no codes.
    pub fn new(user_number: impl Into<String>) -> Result<Self> {
        let user = Self {
            user_number: user_number.into(),
            indirect: false,
            credit_codes: BTreeSet::new(),
            debit_codes: BTreeSet::new(),
            auddis_codes: BTreeSet::new(),
            fps_codes: BTreeSet::new(),
        };
        user.validate()?;
        Ok(user)
    }

    pub fn with_indirect(mut self, indirect: bool) -> Self {
        self.indirect = indirect;
        self
    }

    pub fn with_credit(mut self, code: CreditCode) -> Self {
        self.credit_codes.insert(code);
        self
    }

    pub fn with_debit(mut self, code: DebitCode) -> Self {
        self.debit_codes.insert(code);
        self
    }

    pub fn with_auddis(mut self, code: AuddisCode) -> Self {
        self.auddis_codes.insert(code);
        self
    }

    pub fn with_fps(mut self, code: CreditCode) -> Self {
        self.fps_codes.insert(code);
        self
    }

    /// Check the user number is six digits.
    pub fn validate(&self) -> Result<()> {
        if USER_NUMBER.is_match(&self.user_number) {
            Ok(())
        } else {
            Err(BacsError::Config(format!(
                "service user number must be six digits, got {:?}",
                self.user_number
            )))
        }
    }

    /// Whether this user may originate `code`.
    pub fn permits(&self, code: &TransactionCode) -> bool {
        match code {
            TransactionCode::Credit(c) => self.credit_codes.contains(c) || self.fps_codes.contains(c),
            TransactionCode::Debit(c) => self.debit_codes.contains(c),
            TransactionCode::Auddis(c) => self.auddis_codes.contains(c),
        }
    }
}
