//! Parsing of the line-oriented order log.
//!
//! ```text
//! <timestamp> A <order-id> <B|S> <price> <size>
//! <timestamp> R <order-id> <size>
//! ```

use std::str::{FromStr, SplitWhitespace};

use rust_decimal::Decimal;

use crate::error::ParseError;
use crate::orderbook::{Order, OrderKind, Price, Side};

/// Parse one input line into an [`Order`].
pub fn parse_order(line: &str) -> Result<Order, ParseError> {
    let mut fields = line.split_whitespace();

    let timestamp = next_field(&mut fields, "timestamp")?;
    let timestamp = timestamp
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidTimestamp(timestamp.to_string()))?;

    let action = next_field(&mut fields, "action")?;
    let kind = match OrderKind::from_str(action) {
        Ok(kind) if action.len() == 1 => kind,
        _ => return Err(ParseError::InvalidAction(action.to_string())),
    };

    let id = next_field(&mut fields, "order id")?;

    let order = match kind {
        OrderKind::Add => {
            let side = next_field(&mut fields, "side")?;
            let side = match Side::from_str(side) {
                Ok(parsed) if side.len() == 1 => parsed,
                _ => return Err(ParseError::InvalidSide(side.to_string())),
            };
            let price = parse_price(next_field(&mut fields, "price")?)?;
            let size = parse_size(next_field(&mut fields, "size")?)?;
            Order::add(timestamp, id, side, price, size)
        }
        OrderKind::Reduce => {
            let size = parse_size(next_field(&mut fields, "size")?)?;
            Order::reduce(timestamp, id, size)
        }
    };

    let rest: Vec<&str> = fields.collect();
    if !rest.is_empty() {
        return Err(ParseError::TrailingInput(rest.join(" ")));
    }

    Ok(order)
}

fn next_field<'a>(
    fields: &mut SplitWhitespace<'a>,
    name: &'static str,
) -> Result<&'a str, ParseError> {
    fields.next().ok_or(ParseError::MissingField(name))
}

fn parse_price(raw: &str) -> Result<Price, ParseError> {
    Decimal::from_str(raw)
        .ok()
        .and_then(Price::from_decimal)
        .ok_or_else(|| ParseError::InvalidPrice(raw.to_string()))
}

fn parse_size(raw: &str) -> Result<u32, ParseError> {
    match raw.parse::<u32>() {
        Ok(0) => Err(ParseError::ZeroSize),
        Ok(size) => Ok(size),
        Err(_) => Err(ParseError::InvalidSize(raw.to_string())),
    }
}
