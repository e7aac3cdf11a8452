use rust_decimal::Decimal;

use super::domain::IntakeValidation;
use crate::workflows::catalog::ShortTermTerms;

/// Price a stay from the nightly rate plus the listing's fee schedule:
/// cleaning fee, extra-guest fee above two guests, pet fee per pet.
pub fn booking_total(
    nightly_rate: Decimal,
    nights: u32,
    num_guests: u32,
    num_pets: u32,
    terms: &ShortTermTerms,
) -> Decimal {
    let mut total = nightly_rate * Decimal::from(nights);
    if let Some(fee) = terms.cleaning_fee {
        total += fee;
    }
    if num_guests > 2 {
        if let Some(fee) = terms.extra_guest_fee {
            total += fee * Decimal::from(num_guests - 2);
        }
    }
    if num_pets > 0 {
        if let Some(fee) = terms.pet_fee {
            total += fee * Decimal::from(num_pets);
        }
    }
    total
}

pub fn check_stay_length(nights: i64, terms: &ShortTermTerms) -> Result<(), IntakeValidation> {
    let too_short = nights < i64::from(terms.minimum_nights);
    let too_long = terms
        .maximum_nights
        .is_some_and(|max| nights > i64::from(max));
    if too_short || too_long {
        return Err(IntakeValidation::StayLengthOutOfBounds {
            nights,
            minimum: terms.minimum_nights,
            maximum: terms.maximum_nights,
        });
    }
    Ok(())
}
