use num_bigint::{BigInt, BigUint};

use crate::error::ReportError;

/// Parse a base-unit amount string (non-negative base-10 integer).
///
/// Amounts are 10^18-scaled on chain and routinely exceed 2^64, so they are
/// kept in arbitrary-precision integers end to end. `field` names the source
/// field for the error message.
pub fn parse_base_amount(field: &'static str, value: &str) -> Result<BigUint, ReportError> {
    value
        .parse::<BigUint>()
        .map_err(|_| ReportError::InvalidAmount { field, value: value.to_string() })
}

/// Floor-divide a base-unit amount by 10^decimals, as a decimal string.
///
/// An amount smaller than one whole unit renders as "0"; that matches
/// on-chain unit conventions and is not rounded up.
pub fn to_display(amount: &BigUint, decimals: u32) -> String {
    let scale = BigUint::from(10u32).pow(decimals);
    (amount / scale).to_string()
}

/// Signed variant for values that can go negative (net staked). Divides the
/// magnitude and keeps the sign, so -3.5 units renders as "-3".
pub fn to_display_signed(amount: &BigInt, decimals: u32) -> String {
    let scale = BigInt::from(10).pow(decimals);
    (amount / scale).to_string()
}

/// Parse and convert in one step, for reshaping rows before they leave the API.
pub fn convert(field: &'static str, value: &str, decimals: u32) -> Result<String, ReportError> {
    Ok(to_display(&parse_base_amount(field, value)?, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_whole_units() {
        let amount = parse_base_amount("assets", "3500000000000000000").unwrap();
        assert_eq!(to_display(&amount, 18), "3");
    }

    #[test]
    fn truncates_below_one_unit() {
        let amount = parse_base_amount("assets", "999999999999999999").unwrap();
        assert_eq!(to_display(&amount, 18), "0");
    }

    #[test]
    fn survives_values_past_f64_precision() {
        // 2^80-ish; a double would silently round this
        let amount = parse_base_amount("value", "1208925819614629174706177").unwrap();
        assert_eq!(to_display(&amount, 18), "1208925");
        assert_eq!(to_display(&amount, 0), "1208925819614629174706177");
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["", "12.5", "-7", "0x1f", "1e18"] {
            let err = parse_base_amount("assets", bad).unwrap_err();
            assert!(matches!(err, ReportError::InvalidAmount { field: "assets", .. }));
        }
    }

    #[test]
    fn signed_conversion_keeps_sign() {
        let net = BigInt::from(-3_500_000_000_000_000_000i64);
        assert_eq!(to_display_signed(&net, 18), "-3");
        assert_eq!(to_display_signed(&BigInt::from(0), 18), "0");
    }
}
