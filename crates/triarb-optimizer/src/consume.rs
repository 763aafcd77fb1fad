use rust_decimal::Decimal;

use triarb_core::BookLevel;

/// Walk `levels` (sorted in their side's canonical order) consuming `qty`
/// units of the base asset, matching against successive levels at their
/// posted price until `qty` is exhausted or the book is exhausted.
///
/// Used for `SELL` legs: the caller gives base, the book is `bids`.
/// Returns the quote proceeds if the book had enough depth, `None` otherwise.
pub fn consume_base(levels: &[BookLevel], qty: Decimal) -> Option<Decimal> {
    let mut remaining = qty;
    let mut proceeds = Decimal::ZERO;
    for level in levels {
        if remaining <= Decimal::ZERO {
            break;
        }
        let take = remaining.min(level.quantity);
        proceeds += take * level.price;
        remaining -= take;
    }
    if remaining > Decimal::ZERO {
        None
    } else {
        Some(proceeds)
    }
}

/// Walk `levels` consuming `budget` units of the quote asset, matching
/// against successive levels until the budget is spent or the book is
/// exhausted.
///
/// Used for `BUY` legs: the caller gives quote, the book is `asks`.
/// Returns the base received if the book had enough depth, `None` otherwise.
pub fn consume_quote(levels: &[BookLevel], budget: Decimal) -> Option<Decimal> {
    let mut remaining = budget;
    let mut received = Decimal::ZERO;
    for level in levels {
        if remaining <= Decimal::ZERO {
            break;
        }
        let level_capacity = level.price * level.quantity;
        let take = remaining.min(level_capacity);
        received += take / level.price;
        remaining -= take;
    }
    if remaining > Decimal::ZERO {
        None
    } else {
        Some(received)
    }
}
