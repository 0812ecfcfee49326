use crate::error::Error;
use crate::operators::{Denomination, Operator, SuggestedAmount};
use std::cmp::Ordering;

/// Compute the payable amount that delivers at least `amount` (and at most
/// `amount + tolerance`) for the operator's denomination model.
///
/// Pure function of its inputs: no I/O, no retries. Failure is always
/// [`Error::ImpossibleAmount`] with a message naming the operator and the
/// requested amount.
pub fn resolve_amount(operator: &Operator, amount: f64, tolerance: f64) -> Result<f64, Error> {
    match operator.denomination_type {
        Denomination::Range => resolve_range(operator, amount, tolerance),
        Denomination::Fixed => resolve_fixed(operator, amount, tolerance),
    }
}

/// FIXED model: smallest deliverable amount within `[amount, amount +
/// tolerance]` wins; its payable counterpart is returned.
fn resolve_fixed(operator: &Operator, amount: f64, tolerance: f64) -> Result<f64, Error> {
    let mut entries: Vec<SuggestedAmount> = operator.suggested_amounts_map.clone();
    entries.sort_by(|a, b| a.sent.partial_cmp(&b.sent).unwrap_or(Ordering::Equal));

    entries
        .iter()
        .find(|entry| entry.sent >= amount && entry.sent <= amount + tolerance)
        .map(|entry| entry.pay)
        .ok_or_else(|| {
            Error::ImpossibleAmount(format!(
                "could not find an amount of at least {} for operator {} with suggested amounts {:?}",
                amount, operator.name, entries
            ))
        })
}

fn resolve_range(operator: &Operator, amount: f64, tolerance: f64) -> Result<f64, Error> {
    if operator.supports_local_amounts {
        resolve_local_range(operator, amount, tolerance)
    } else {
        resolve_nonlocal_range(operator, amount, tolerance)
    }
}

/// Local-amount RANGE model: bounds are in the destination currency, so the
/// chosen amount converts to the payable currency, rounded up to two
/// decimals. Rounding up guarantees the payment covers the full deliverable
/// amount requested.
fn resolve_local_range(operator: &Operator, amount: f64, tolerance: f64) -> Result<f64, Error> {
    let (min, max) = match (operator.local_min_amount, operator.local_max_amount) {
        (Some(min), Some(max)) => (min, max),
        _ => {
            return Err(Error::ImpossibleAmount(format!(
                "operator {} does not have a local amount range configured",
                operator.name
            )))
        }
    };

    if amount >= min && amount <= max {
        return Ok(round_up_cents(amount / operator.fx.rate));
    }

    if amount < min && amount + tolerance >= min {
        return Ok(round_up_cents(min / operator.fx.rate));
    }

    Err(out_of_range(operator, min, max, amount))
}

/// Non-local RANGE model: bounds are already in the payable currency, so the
/// target and tolerance convert instead, with no rounding.
fn resolve_nonlocal_range(operator: &Operator, amount: f64, tolerance: f64) -> Result<f64, Error> {
    let (min, max) = match (operator.min_amount, operator.max_amount) {
        (Some(min), Some(max)) => (min, max),
        _ => {
            return Err(Error::ImpossibleAmount(format!(
                "operator {} does not have an amount range configured",
                operator.name
            )))
        }
    };

    let converted = amount / operator.fx.rate;
    let converted_tolerance = tolerance / operator.fx.rate;

    if converted >= min && converted <= max {
        return Ok(converted);
    }

    if converted < min && converted + converted_tolerance >= min {
        return Ok(min);
    }

    Err(out_of_range(operator, min, max, amount))
}

fn out_of_range(operator: &Operator, min: f64, max: f64, amount: f64) -> Error {
    Error::ImpossibleAmount(format!(
        "operator {} has a minimum amount of {} and a maximum of {}; the requested amount {} could not be fulfilled",
        operator.name, min, max, amount
    ))
}

fn round_up_cents(value: f64) -> f64 {
    (value * 100.0).ceil() / 100.0
}
