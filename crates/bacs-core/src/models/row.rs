//! Record types of a Standard 18 file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every record type the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RowKind {
    /// Volume label.
    Vol1,
    /// Opening header A.
    Hdr1,
    /// Opening header B.
    Hdr2,
    /// User header label.
    Uhl1,
    /// Closing header A.
    Eof1,
    /// Closing header B.
    Eof2,
    /// User trailer label.
    Utl1,
    /// Contra (balancing) line.
    Contra,
    /// Payment instruction line.
    Instr,
}

impl RowKind {
    pub const ALL: [RowKind; 9] = [
        RowKind::Vol1,
        RowKind::Hdr1,
        RowKind::Hdr2,
        RowKind::Uhl1,
        RowKind::Eof1,
        RowKind::Eof2,
        RowKind::Utl1,
        RowKind::Contra,
        RowKind::Instr,
    ];

    /// Record name as written in the file (and used as the schema name).
    pub fn name(self) -> &'static str {
        match self {
            RowKind::Vol1 => "VOL1",
            RowKind::Hdr1 => "HDR1",
            RowKind::Hdr2 => "HDR2",
            RowKind::Uhl1 => "UHL1",
            RowKind::Eof1 => "EOF1",
            RowKind::Eof2 => "EOF2",
            RowKind::Utl1 => "UTL1",
            RowKind::Contra => "CONTRA",
            RowKind::Instr => "INSTR",
        }
    }

    /// Whether this is a payment line (contra or instruction).
    pub fn is_payment(self) -> bool {
        matches!(self, RowKind::Contra | RowKind::Instr)
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RowKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown record type: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in RowKind::ALL {
            assert_eq!(kind.name().parse::<RowKind>(), Ok(kind));
        }
        assert!("HDR3".parse::<RowKind>().is_err());
    }

    #[test]
    fn test_serde_uses_record_names() {
        assert_eq!(serde_json::to_string(&RowKind::Contra).unwrap(), "\"CONTRA\"");
        assert_eq!(serde_json::from_str::<RowKind>("\"EOF2\"").unwrap(), RowKind::Eof2);
    }
}
