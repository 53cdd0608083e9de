use anyhow::{anyhow, bail, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const ZERO_DECIMAL: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "JPY", "KMF", "KRW", "MGA", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];
const THREE_DECIMAL: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

pub fn minor_unit_exponent(currency: &str) -> u32 {
    let code = currency.to_ascii_uppercase();
    if ZERO_DECIMAL.contains(&code.as_str()) {
        0
    } else if THREE_DECIMAL.contains(&code.as_str()) {
        3
    } else {
        2
    }
}

pub fn to_minor_units(amount: Decimal, currency: &str) -> Result<i64> {
    let exponent = minor_unit_exponent(currency);
    let scaled = amount
        .checked_mul(Decimal::from(10i64.pow(exponent)))
        .ok_or_else(|| anyhow!("amount {} overflows in {}", amount, currency))?;

    if scaled.fract() != Decimal::ZERO {
        bail!(
            "amount {} has more precision than {} supports ({} decimal places)",
            amount,
            currency.to_ascii_uppercase(),
            exponent
        );
    }

    scaled
        .to_i64()
        .ok_or_else(|| anyhow!("amount {} out of range for {}", amount, currency))
}

pub fn from_minor_units(value: i64, currency: &str) -> Decimal {
    Decimal::new(value, minor_unit_exponent(currency))
}
