//! BACS transaction codes.
//!
//! Every payment line carries a two-character transaction code in
//! `transactionType`. Codes fall into three disjoint tables: credits,
//! debits and AUDDIS (direct debit instruction) messages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A code that appears in none of the searched tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown transaction code {0:?}")]
pub struct UnknownCode(pub String);

/// One table of transaction codes.
pub trait CodeTable: Copy + Sized + 'static {
    /// Every member of the table, in declaration order.
    const ALL: &'static [Self];

    /// Two-character wire code.
    fn code(self) -> &'static str;

    /// Member name, e.g. `REGULAR`.
    fn name(self) -> &'static str;

    /// Look up a member by its wire code.
    fn by_code(code: &str) -> Result<Self, UnknownCode> {
        Self::ALL
            .iter()
            .copied()
            .find(|member| member.code() == code)
            .ok_or_else(|| UnknownCode(code.to_string()))
    }

    /// Look up a member by its name.
    fn by_name(name: &str) -> Result<Self, UnknownCode> {
        Self::ALL
            .iter()
            .copied()
            .find(|member| member.name() == name)
            .ok_or_else(|| UnknownCode(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditCode {
    Regular,
    Interest,
    Dividend,
}

impl CodeTable for CreditCode {
    const ALL: &'static [Self] = &[CreditCode::Regular, CreditCode::Interest, CreditCode::Dividend];

    fn code(self) -> &'static str {
        match self {
            CreditCode::Regular => "99",
            CreditCode::Interest => "Z4",
            CreditCode::Dividend => "Z5",
        }
    }

    fn name(self) -> &'static str {
        match self {
            CreditCode::Regular => "REGULAR",
            CreditCode::Interest => "INTEREST",
            CreditCode::Dividend => "DIVIDEND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebitCode {
    First,
    Regular,
    Represented,
    Final,
}

impl CodeTable for DebitCode {
    const ALL: &'static [Self] = &[
        DebitCode::First,
        DebitCode::Regular,
        DebitCode::Represented,
        DebitCode::Final,
    ];

    fn code(self) -> &'static str {
        match self {
            DebitCode::First => "01",
            DebitCode::Regular => "17",
            DebitCode::Represented => "18",
            DebitCode::Final => "19",
        }
    }

    fn name(self) -> &'static str {
        match self {
            DebitCode::First => "FIRST",
            DebitCode::Regular => "REGULAR",
            DebitCode::Represented => "REPRESENTED",
            DebitCode::Final => "FINAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuddisCode {
    New,
    Cancel,
    Convert,
}

impl CodeTable for AuddisCode {
    const ALL: &'static [Self] = &[AuddisCode::New, AuddisCode::Cancel, AuddisCode::Convert];

    fn code(self) -> &'static str {
        match self {
            AuddisCode::New => "0N",
            AuddisCode::Cancel => "0C",
            AuddisCode::Convert => "0S",
        }
    }

    fn name(self) -> &'static str {
        match self {
            AuddisCode::New => "NEW",
            AuddisCode::Cancel => "CANCEL",
            AuddisCode::Convert => "CONVERT",
        }
    }
}

macro_rules! from_str_by_name {
    ($($table:ty),*) => {
        $(
            impl FromStr for $table {
                type Err = UnknownCode;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::by_name(s)
                }
            }

            impl fmt::Display for $table {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.name())
                }
            }
        )*
    };
}

from_str_by_name!(CreditCode, DebitCode, AuddisCode);

/// A code from any of the three tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "table", content = "code", rename_all = "lowercase")]
pub enum TransactionCode {
    Credit(CreditCode),
    Debit(DebitCode),
    Auddis(AuddisCode),
}

impl TransactionCode {
    /// Search every table for a wire code.
    pub fn by_code(code: &str) -> Result<Self, UnknownCode> {
        CreditCode::by_code(code)
            .map(TransactionCode::Credit)
            .or_else(|_| DebitCode::by_code(code).map(TransactionCode::Debit))
            .or_else(|_| AuddisCode::by_code(code).map(TransactionCode::Auddis))
    }

    pub fn code(self) -> &'static str {
        match self {
            TransactionCode::Credit(c) => c.code(),
            TransactionCode::Debit(c) => c.code(),
            TransactionCode::Auddis(c) => c.code(),
        }
    }

    pub fn is_credit(self) -> bool {
        matches!(self, TransactionCode::Credit(_))
    }

    pub fn is_debit(self) -> bool {
        matches!(self, TransactionCode::Debit(_))
    }

    pub fn is_auddis(self) -> bool {
        matches!(self, TransactionCode::Auddis(_))
    }
}

impl fmt::Display for TransactionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionCode::Credit(c) => write!(f, "credit {} ({})", c.name(), c.code()),
            TransactionCode::Debit(c) => write!(f, "debit {} ({})", c.name(), c.code()),
            TransactionCode::Auddis(c) => write!(f, "auddis {} ({})", c.name(), c.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_code_in_one_table() {
        assert_eq!(CreditCode::by_code("Z4"), Ok(CreditCode::Interest));
        assert_eq!(DebitCode::by_code("17"), Ok(DebitCode::Regular));
        assert_eq!(AuddisCode::by_code("0N"), Ok(AuddisCode::New));
    }

    #[test]
    fn test_by_code_wrong_table_fails() {
        assert_eq!(CreditCode::by_code("17"), Err(UnknownCode("17".to_string())));
    }

    #[test]
    fn test_from_name() {
        assert_eq!("INTEREST".parse::<CreditCode>(), Ok(CreditCode::Interest));
        assert_eq!("REGULAR".parse::<DebitCode>(), Ok(DebitCode::Regular));
        assert_eq!("NEW".parse::<AuddisCode>(), Ok(AuddisCode::New));
        assert!("Regular".parse::<DebitCode>().is_err());
    }

    #[test]
    fn test_by_code_across_tables() {
        assert_eq!(
            TransactionCode::by_code("Z4"),
            Ok(TransactionCode::Credit(CreditCode::Interest))
        );
        assert_eq!(
            TransactionCode::by_code("0C"),
            Ok(TransactionCode::Auddis(AuddisCode::Cancel))
        );
        assert_eq!(TransactionCode::by_code("XX"), Err(UnknownCode("XX".to_string())));
    }

    #[test]
    fn test_tables_are_disjoint() {
        let mut codes: Vec<&str> = CreditCode::ALL.iter().map(|c| c.code()).collect();
        codes.extend(DebitCode::ALL.iter().map(|c| c.code()));
        codes.extend(AuddisCode::ALL.iter().map(|c| c.code()));
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&DebitCode::Represented).unwrap();
        assert_eq!(json, "\"REPRESENTED\"");
        let code: TransactionCode = serde_json::from_str(r#"{"table":"credit","code":"DIVIDEND"}"#).unwrap();
        assert_eq!(code, TransactionCode::Credit(CreditCode::Dividend));
    }
}
