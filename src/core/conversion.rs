use crate::core::RateRecord;
use crate::domain::catalog::CurrencyCode;
use crate::domain::model::{Conversion, ConversionSide};
use crate::utils::error::{RatesError, Result};

/// 以 TRY 為目標時顯示 2 位小數，其餘 4 位
const TRY_PRECISION: usize = 2;
const FOREIGN_PRECISION: usize = 4;

/// Convert `amount` between TRY and catalog currencies using sell rates.
///
/// Every series is quoted in TRY, so foreign-to-foreign goes through TRY.
pub fn convert(
    amount: f64,
    from: ConversionSide,
    to: ConversionSide,
    rates: &[RateRecord],
) -> Result<Conversion> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(RatesError::validation(format!(
            "amount must be a positive number, got {}",
            amount
        )));
    }

    let result = match (from, to) {
        (ConversionSide::Try, ConversionSide::Try) => amount,
        (ConversionSide::Foreign(code), ConversionSide::Try) => amount * sell_rate(rates, code)?,
        (ConversionSide::Try, ConversionSide::Foreign(code)) => amount / sell_rate(rates, code)?,
        (ConversionSide::Foreign(from_code), ConversionSide::Foreign(to_code)) => {
            let try_amount = amount * sell_rate(rates, from_code)?;
            try_amount / sell_rate(rates, to_code)?
        }
    };

    let precision = match to {
        ConversionSide::Try => TRY_PRECISION,
        ConversionSide::Foreign(_) => FOREIGN_PRECISION,
    };

    Ok(Conversion {
        from,
        to,
        amount,
        result,
        precision,
    })
}

fn sell_rate(rates: &[RateRecord], code: CurrencyCode) -> Result<f64> {
    rates
        .iter()
        .find(|record| record.currency == code)
        .and_then(|record| record.sell_rate)
        .filter(|rate| *rate > 0.0)
        .ok_or_else(|| RatesError::RateUnavailable {
            code: code.to_string(),
        })
}
