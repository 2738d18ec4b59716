//! Whole-file model assembled from dispatched records.
//!
//! [`Std18File::read`] registers a handler for every record kind and
//! groups the entities into batches. [`Std18File::verify`] recomputes each
//! batch's control totals and compares them with its user trailer.

use std::cell::RefCell;
use std::io::BufRead;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::entity::{Contra, Entity, Header1, Header2, Instruction, UserHeader, UserTrailer, Volume};
use super::row::RowKind;
use super::service_user::ServiceUser;
use super::transaction::{TransactionCode, UnknownCode};
use crate::error::{BacsError, Result, StructureViolation};
use crate::mapper::{Flow, Standard18Mapper};

/// A contra or instruction line, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payment {
    Contra(Contra),
    Instruction(Instruction),
}

impl Payment {
    pub fn line_no(&self) -> usize {
        match self {
            Payment::Contra(c) => c.line_no,
            Payment::Instruction(i) => i.line_no,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Payment::Contra(c) => c.amount,
            Payment::Instruction(i) => i.amount,
        }
    }

    pub fn transaction_type(&self) -> &str {
        match self {
            Payment::Contra(c) => &c.transaction_type,
            Payment::Instruction(i) => &i.transaction_type,
        }
    }

    pub fn transaction_code(&self) -> std::result::Result<TransactionCode, UnknownCode> {
        TransactionCode::by_code(self.transaction_type())
    }

    pub fn is_contra(&self) -> bool {
        matches!(self, Payment::Contra(_))
    }
}

/// One batch: header labels, payment lines and trailer labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub header1: Header1,
    pub header2: Header2,
    pub user_header: UserHeader,
    pub payments: Vec<Payment>,
    pub eof1: Header1,
    pub eof2: Header2,
    pub trailer: UserTrailer,
}

/// Totals recomputed from a batch's payment lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchTotals {
    pub debit_value: Decimal,
    pub credit_value: Decimal,
    pub debit_count: u64,
    pub credit_count: u64,
    pub ddi_count: u64,
    /// Line numbers and codes of payments with an unknown transaction code.
    pub unknown_codes: Vec<(usize, String)>,
}

impl Batch {
    /// Sum values and counts by transaction code. Contra lines are included.
    pub fn totals(&self) -> BatchTotals {
        let mut totals = BatchTotals::default();
        for payment in &self.payments {
            match payment.transaction_code() {
                Ok(TransactionCode::Debit(_)) => {
                    totals.debit_value += payment.amount();
                    totals.debit_count += 1;
                }
                Ok(TransactionCode::Credit(_)) => {
                    totals.credit_value += payment.amount();
                    totals.credit_count += 1;
                }
                Ok(TransactionCode::Auddis(_)) => totals.ddi_count += 1,
                Err(UnknownCode(code)) => totals.unknown_codes.push((payment.line_no(), code)),
            }
        }
        totals
    }
}

/// A parsed Standard 18 file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Std18File {
    pub volume: Option<Volume>,
    pub batches: Vec<Batch>,
}

impl Std18File {
    /// Parse a complete file.
    pub fn read<R: BufRead>(input: R) -> Result<Self> {
        let collector = RefCell::new(Collector::default());
        {
            let mut mapper = Standard18Mapper::new();
            for kind in RowKind::ALL {
                mapper.register(kind, |_, entity| collector.borrow_mut().accept(entity));
            }
            mapper.run(input)?;
        }
        collector.into_inner().finish()
    }

    /// Every payment line of every batch, in file order.
    pub fn payments(&self) -> impl Iterator<Item = &Payment> {
        self.batches.iter().flat_map(|b| b.payments.iter())
    }

    /// Compare recomputed totals with each trailer and, given a service
    /// user, check every transaction code is permitted.
    ///
    /// Returns one message per discrepancy; an empty list means the file
    /// is consistent.
    pub fn verify(&self, service_user: Option<&ServiceUser>) -> Vec<String> {
        let mut problems = Vec::new();

        if let (Some(user), Some(volume)) = (service_user, &self.volume) {
            if volume.user_number != user.user_number {
                problems.push(format!(
                    "volume user number {} does not match service user {}",
                    volume.user_number, user.user_number
                ));
            }
        }

        for (index, batch) in self.batches.iter().enumerate() {
            let n = index + 1;
            let totals = batch.totals();
            let trailer = &batch.trailer;

            compare_value(&mut problems, n, "debit value", totals.debit_value, trailer.debit_value);
            compare_value(&mut problems, n, "credit value", totals.credit_value, trailer.credit_value);
            compare_count(&mut problems, n, "debit", totals.debit_count, &trailer.debit_count, trailer.debit_items());
            compare_count(&mut problems, n, "credit", totals.credit_count, &trailer.credit_count, trailer.credit_items());
            compare_count(&mut problems, n, "ddi", totals.ddi_count, &trailer.ddi_count, trailer.ddi_items());

            for (line, code) in &totals.unknown_codes {
                problems.push(format!("line {line}: unknown transaction code {code:?}"));
            }

            if let Some(user) = service_user {
                for payment in &batch.payments {
                    if let Ok(code) = payment.transaction_code() {
                        if !user.permits(&code) {
                            problems.push(format!(
                                "line {}: service user {} may not originate {code}",
                                payment.line_no(),
                                user.user_number
                            ));
                        }
                    }
                }
            }
        }

        for problem in &problems {
            warn!("{problem}");
        }
        problems
    }
}

fn compare_value(problems: &mut Vec<String>, batch: usize, what: &str, computed: Decimal, declared: Decimal) {
    if computed != declared {
        problems.push(format!(
            "batch {batch}: {what} {computed} does not match trailer {declared}"
        ));
    }
}

fn compare_count(
    problems: &mut Vec<String>,
    batch: usize,
    what: &str,
    computed: u64,
    raw: &str,
    declared: Option<u64>,
) {
    match declared {
        Some(declared) if declared == computed => {}
        Some(declared) => problems.push(format!(
            "batch {batch}: {what} count {computed} does not match trailer {declared}"
        )),
        None => problems.push(format!(
            "batch {batch}: trailer {what} count {raw:?} is not numeric"
        )),
    }
}

/// Batch under construction between its HDR1 and UTL1.
struct OpenBatch {
    header1: Header1,
    header2: Option<Header2>,
    user_header: Option<UserHeader>,
    payments: Vec<Payment>,
    eof1: Option<Header1>,
    eof2: Option<Header2>,
}

impl OpenBatch {
    fn close(self, trailer: UserTrailer) -> Result<Batch> {
        Ok(Batch {
            header1: self.header1,
            header2: self.header2.ok_or_else(|| missing(RowKind::Hdr2))?,
            user_header: self.user_header.ok_or_else(|| missing(RowKind::Uhl1))?,
            payments: self.payments,
            eof1: self.eof1.ok_or_else(|| missing(RowKind::Eof1))?,
            eof2: self.eof2.ok_or_else(|| missing(RowKind::Eof2))?,
            trailer,
        })
    }
}

fn missing(kind: RowKind) -> BacsError {
    BacsError::Structure {
        line: None,
        violation: StructureViolation::Missing {
            name: kind.name().to_string(),
            min: 1,
            found: 0,
        },
    }
}

#[derive(Default)]
struct Collector {
    file: Std18File,
    open: Option<OpenBatch>,
    error: Option<BacsError>,
}

impl Collector {
    fn accept(&mut self, entity: Entity) -> Flow {
        match self.place(entity) {
            Ok(()) => Flow::Continue,
            Err(err) => {
                self.error = Some(err);
                Flow::Stop
            }
        }
    }

    fn open(&mut self) -> Result<&mut OpenBatch> {
        self.open.as_mut().ok_or_else(|| missing(RowKind::Hdr1))
    }

    fn place(&mut self, entity: Entity) -> Result<()> {
        match entity {
            Entity::Volume(volume) => self.file.volume = Some(volume),
            Entity::Header1(header) if header.indicator == RowKind::Hdr1 => {
                self.open = Some(OpenBatch {
                    header1: header,
                    header2: None,
                    user_header: None,
                    payments: Vec::new(),
                    eof1: None,
                    eof2: None,
                });
            }
            Entity::Header1(header) => self.open()?.eof1 = Some(header),
            Entity::Header2(header) if header.indicator == RowKind::Hdr2 => {
                self.open()?.header2 = Some(header)
            }
            Entity::Header2(header) => self.open()?.eof2 = Some(header),
            Entity::UserHeader(header) => self.open()?.user_header = Some(header),
            Entity::Contra(contra) => self.open()?.payments.push(Payment::Contra(contra)),
            Entity::Instruction(instr) => self.open()?.payments.push(Payment::Instruction(instr)),
            Entity::UserTrailer(trailer) => {
                let open = self.open.take().ok_or_else(|| missing(RowKind::Hdr1))?;
                self.file.batches.push(open.close(trailer)?);
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Std18File> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.open.is_some() {
            return Err(missing(RowKind::Utl1));
        }
        Ok(self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::Account;
    use crate::models::transaction::{CreditCode, DebitCode};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn header1(indicator: RowKind) -> Header1 {
        Header1 {
            indicator,
            file: "A123456S  123456".into(),
            set: "123456".into(),
            section: "0001".into(),
            sequence: "0001".into(),
            generation: String::new(),
            version: String::new(),
            created: None,
            expires: None,
            accessibility: String::new(),
            block_count: "000000".into(),
            system_code: String::new(),
        }
    }

    fn header2(indicator: RowKind) -> Header2 {
        Header2 {
            indicator,
            format: "F".into(),
            block: "02000".into(),
            record: "00100".into(),
            offset: "00".into(),
        }
    }

    fn account(sort_code: &str) -> Account {
        Account {
            sort_code: sort_code.into(),
            number: "12345678".into(),
            account_type: Some("0".into()),
            name: None,
        }
    }

    fn instruction(line_no: usize, code: &str, pence: i64) -> Payment {
        Payment::Instruction(Instruction {
            line_no,
            destination: account("123456"),
            transaction_type: code.into(),
            origin: account("654321"),
            rti: String::new(),
            amount: Decimal::new(pence, 2),
            reference: "REF".into(),
            processing_date: None,
        })
    }

    fn contra(line_no: usize, code: &str, pence: i64) -> Payment {
        Payment::Contra(Contra {
            line_no,
            destination: account("654321"),
            transaction_type: code.into(),
            origin: account("654321"),
            free_format: String::new(),
            amount: Decimal::new(pence, 2),
            narrative: "CONTRA".into(),
            processing_date: None,
        })
    }

    fn batch(payments: Vec<Payment>, trailer: UserTrailer) -> Batch {
        Batch {
            header1: header1(RowKind::Hdr1),
            header2: header2(RowKind::Hdr2),
            user_header: UserHeader {
                processing_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                dest: String::new(),
                currency: "00".into(),
                country: String::new(),
                work_code: String::new(),
                file: "001".into(),
                audit: String::new(),
            },
            payments,
            eof1: header1(RowKind::Eof1),
            eof2: header2(RowKind::Eof2),
            trailer,
        }
    }

    fn trailer(debit_pence: i64, credit_pence: i64, debits: &str, credits: &str) -> UserTrailer {
        UserTrailer {
            debit_value: Decimal::new(debit_pence, 2),
            credit_value: Decimal::new(credit_pence, 2),
            debit_count: debits.into(),
            credit_count: credits.into(),
            ddi_count: String::new(),
            service_user: String::new(),
        }
    }

    #[test]
    fn test_totals_by_code() {
        let batch = batch(
            vec![
                instruction(5, "17", 1000),
                instruction(6, "01", 250),
                instruction(7, "0N", 0),
                instruction(8, "XX", 1),
                contra(9, "99", 1250),
            ],
            trailer(1250, 1250, "0000002", "0000001"),
        );
        let totals = batch.totals();
        assert_eq!(totals.debit_value, Decimal::new(1250, 2));
        assert_eq!(totals.credit_value, Decimal::new(1250, 2));
        assert_eq!(totals.debit_count, 2);
        assert_eq!(totals.credit_count, 1);
        assert_eq!(totals.ddi_count, 1);
        assert_eq!(totals.unknown_codes, vec![(8, "XX".to_string())]);
    }

    #[test]
    fn test_verify_consistent_file() {
        let file = Std18File {
            volume: None,
            batches: vec![batch(
                vec![instruction(5, "17", 1000), contra(6, "99", 1000)],
                trailer(1000, 1000, "0000001", "0000001"),
            )],
        };
        assert_eq!(file.verify(None), Vec::<String>::new());
    }

    #[test]
    fn test_verify_reports_mismatches() {
        let file = Std18File {
            volume: None,
            batches: vec![batch(
                vec![instruction(5, "17", 1000)],
                trailer(999, 0, "0000002", "abc"),
            )],
        };
        assert_eq!(
            file.verify(None),
            vec![
                "batch 1: debit value 10.00 does not match trailer 9.99".to_string(),
                "batch 1: debit count 1 does not match trailer 2".to_string(),
                "batch 1: trailer credit count \"abc\" is not numeric".to_string(),
            ]
        );
    }

    #[test]
    fn test_verify_service_user_codes() {
        let user = ServiceUser::new("123456")
            .unwrap()
            .with_credit(CreditCode::Regular);
        let file = Std18File {
            volume: None,
            batches: vec![batch(
                vec![instruction(5, "17", 1000), contra(6, "99", 1000)],
                trailer(1000, 1000, "0000001", "0000001"),
            )],
        };
        let problems = file.verify(Some(&user));
        assert_eq!(
            problems,
            vec![format!(
                "line 5: service user 123456 may not originate {}",
                TransactionCode::Debit(DebitCode::Regular)
            )]
        );
    }

    #[test]
    fn test_trailer_outside_batch_stops() {
        let mut collector = Collector::default();
        let flow = collector.accept(Entity::UserTrailer(trailer(0, 0, "0", "0")));
        assert_eq!(flow, Flow::Stop);
        assert!(matches!(collector.finish(), Err(BacsError::Structure { .. })));
    }
}
