use thiserror::Error;

use crate::SalaryValue;

/// Hours in a full-time year (~40 hr/week for 50 weeks).
pub const FULL_TIME_HOURS_PER_YEAR: f64 = 2000.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SalaryError {
    #[error("salary range {text:?} has no upper bound")]
    MissingUpperBound { text: String },
    #[error("salary range bound {token:?} could not be parsed")]
    UnparseableBound { token: String },
}

/// Convert a single salary figure such as `$85K/yr` or `$40/hr` to an annual amount.
///
/// Never fails: text that does not fit `$<amount>[K]/<period>` is handed back
/// unchanged as [`SalaryValue::Unparsed`].
pub fn parse_salary_to_annual(text: &str) -> SalaryValue {
    match annual_amount(text) {
        Some(amount) => SalaryValue::Annual(amount),
        None => SalaryValue::Unparsed(text.to_string()),
    }
}

fn annual_amount(text: &str) -> Option<f64> {
    let (amount_part, period_part) = text.split_once('/')?;
    // Anything before the last `$` (a label, a lower bound) is not the amount.
    let (_, amount) = amount_part.rsplit_once('$')?;

    let mut amount = if amount.contains('K') {
        parse_number(&amount.replace('K', ""))? * 1000.0
    } else {
        parse_number(amount)?
    };

    if period_part.split_whitespace().next() == Some("hr") {
        amount *= FULL_TIME_HOURS_PER_YEAR;
    }
    Some(amount)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse a salary that is either a point estimate or a `lower - upper` range.
///
/// * no `$` at all: `Ok(None)`, nothing was disclosed;
/// * one `$`: delegated to [`parse_salary_to_annual`];
/// * more: the first two whitespace tokens carrying a `$` are the bounds and the
///   result is their mean. Any further dollar amounts are ignored.
pub fn parse_salary_range_or_point(text: &str) -> Result<Option<SalaryValue>, SalaryError> {
    match text.matches('$').count() {
        0 => Ok(None),
        1 => Ok(Some(parse_salary_to_annual(text))),
        _ => parse_range(text).map(|mean| Some(SalaryValue::Annual(mean))),
    }
}

fn parse_range(text: &str) -> Result<f64, SalaryError> {
    let mut bounds = text.split_whitespace().filter(|token| token.contains('$'));
    let (Some(lower), Some(upper)) = (bounds.next(), bounds.next()) else {
        return Err(SalaryError::MissingUpperBound {
            text: text.to_string(),
        });
    };

    let lower = bound_amount(lower)?;
    let upper = bound_amount(upper)?;
    Ok((lower + upper) / 2.0)
}

fn bound_amount(token: &str) -> Result<f64, SalaryError> {
    parse_salary_to_annual(token)
        .as_annual()
        .ok_or_else(|| SalaryError::UnparseableBound {
            token: token.to_string(),
        })
}
