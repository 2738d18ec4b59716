//! Whole-pence currency codec.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::{TypeHandler, Value, all_digits};
use crate::error::CodecError;

pub(crate) const NAME: &str = "penceHandler";

/// Codec for unsigned, zero-padded pence digit strings.
pub struct PenceCodec;

impl PenceCodec {
    /// Decode a pence digit string into an amount with two decimal places.
    pub fn decode_amount(text: &str) -> Result<Decimal, CodecError> {
        let text = text.trim();
        if !all_digits(text) {
            return Err(CodecError::NotDigits(text.to_string()));
        }

        let pence: i64 = text
            .parse()
            .map_err(|_| CodecError::Overflow { value: text.to_string(), width: 18 })?;
        Ok(Decimal::new(pence, 2))
    }

    /// Encode an amount as pence, zero-padded to `width` digits.
    pub fn encode_amount(amount: Decimal, width: usize) -> Result<String, CodecError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CodecError::Negative(amount.to_string()));
        }

        let pence = amount * Decimal::ONE_HUNDRED;
        if !pence.fract().is_zero() {
            return Err(CodecError::FractionalPence(amount.to_string()));
        }

        let digits = pence
            .trunc()
            .to_u64()
            .ok_or_else(|| CodecError::Overflow { value: amount.to_string(), width })?
            .to_string();
        if digits.len() > width {
            return Err(CodecError::Overflow { value: amount.to_string(), width });
        }
        Ok(format!("{digits:0>width$}"))
    }
}

impl TypeHandler for PenceCodec {
    fn name(&self) -> &'static str {
        NAME
    }

    fn decode(&self, text: &str) -> Result<Value, CodecError> {
        Self::decode_amount(text).map(Value::Amount)
    }

    fn encode(&self, value: &Value, width: usize) -> Result<String, CodecError> {
        match value {
            Value::Amount(amount) => Self::encode_amount(*amount, width),
            other => Err(CodecError::WrongType {
                handler: NAME,
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_decode_pence() {
        assert_eq!(PenceCodec::decode_amount("00000012345"), Ok(dec("123.45")));
        assert_eq!(PenceCodec::decode_amount("00000000000").unwrap().to_string(), "0.00");
        assert_eq!(PenceCodec::decode_amount("  000000100").unwrap().to_string(), "1.00");
    }

    #[test]
    fn test_decode_rejects_non_digits() {
        assert!(matches!(
            PenceCodec::decode_amount("0000001234X"),
            Err(CodecError::NotDigits(_))
        ));
        assert!(matches!(
            PenceCodec::decode_amount("-0000001234"),
            Err(CodecError::NotDigits(_))
        ));
        assert!(matches!(PenceCodec::decode_amount("   "), Err(CodecError::NotDigits(_))));
    }

    #[test]
    fn test_encode_pads_to_width() {
        assert_eq!(PenceCodec::encode_amount(dec("123.45"), 11).unwrap(), "00000012345");
        assert_eq!(PenceCodec::encode_amount(dec("7"), 13).unwrap(), "0000000000700");
    }

    #[test]
    fn test_encode_rejects_overflow() {
        assert_eq!(
            PenceCodec::encode_amount(dec("1000000000.00"), 11),
            Err(CodecError::Overflow { value: "1000000000.00".to_string(), width: 11 })
        );
        assert_eq!(PenceCodec::encode_amount(dec("999999999.99"), 11).unwrap(), "99999999999");
    }

    #[test]
    fn test_encode_rejects_negative_and_fractional_pence() {
        assert!(matches!(
            PenceCodec::encode_amount(dec("-1.00"), 11),
            Err(CodecError::Negative(_))
        ));
        assert!(matches!(
            PenceCodec::encode_amount(dec("1.005"), 11),
            Err(CodecError::FractionalPence(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_amount_round_trip(pence in 0i64..=99_999_999_999) {
            let amount = Decimal::new(pence, 2);
            let text = PenceCodec::encode_amount(amount, 11).unwrap();
            prop_assert_eq!(text.len(), 11);
            prop_assert_eq!(PenceCodec::decode_amount(&text).unwrap(), amount);
        }
    }
}
