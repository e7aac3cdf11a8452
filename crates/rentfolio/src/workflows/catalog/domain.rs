use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workflows::ids::{PropertyId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    ShortTerm,
    LongTerm,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured address; the source system stored this as a JSON bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

/// Inbound payload for listing a new property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProperty {
    pub account_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub property_type: PropertyType,
    pub address: PropertyAddress,
    #[serde(default)]
    pub price_per_night: Option<Decimal>,
    #[serde(default)]
    pub price_per_month: Option<Decimal>,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default)]
    pub square_feet: Option<u32>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub listing_agent_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub account_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub property_type: PropertyType,
    pub address: PropertyAddress,
    pub price_per_night: Option<Decimal>,
    pub price_per_month: Option<Decimal>,
    pub bedrooms: Option<u8>,
    pub square_feet: Option<u32>,
    pub amenities: Vec<String>,
    pub is_active: bool,
    pub listing_agent_id: Option<UserId>,
}

impl Property {
    /// Validate the type/pricing invariant and build an active listing.
    /// Exactly one of the two rates is meaningful per property type.
    pub fn from_new(id: PropertyId, new: NewProperty) -> Result<Self, PricingError> {
        let rate = match new.property_type {
            PropertyType::ShortTerm => new
                .price_per_night
                .ok_or(PricingError::MissingNightlyRate)?,
            PropertyType::LongTerm => new
                .price_per_month
                .ok_or(PricingError::MissingMonthlyRate)?,
        };
        if rate <= Decimal::ZERO {
            return Err(PricingError::NonPositiveRate { rate });
        }

        Ok(Self {
            id,
            account_id: new.account_id,
            title: new.title,
            description: new.description,
            property_type: new.property_type,
            address: new.address,
            price_per_night: new.price_per_night,
            price_per_month: new.price_per_month,
            bedrooms: new.bedrooms,
            square_feet: new.square_feet,
            amenities: new.amenities,
            is_active: true,
            listing_agent_id: new.listing_agent_id,
        })
    }

    /// Nightly rate for short-term listings, `None` otherwise.
    pub fn nightly_rate(&self) -> Option<Decimal> {
        match self.property_type {
            PropertyType::ShortTerm => self.price_per_night,
            PropertyType::LongTerm => None,
        }
    }

    /// Monthly rate for long-term listings, `None` otherwise.
    pub fn monthly_rate(&self) -> Option<Decimal> {
        match self.property_type {
            PropertyType::LongTerm => self.price_per_month,
            PropertyType::ShortTerm => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("short_term properties must set price_per_night")]
    MissingNightlyRate,
    #[error("long_term properties must set price_per_month")]
    MissingMonthlyRate,
    #[error("listing rate must be positive, got {rate}")]
    NonPositiveRate { rate: Decimal },
}

/// Per-property configuration for short-term rentals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortTermTerms {
    pub property_id: PropertyId,
    pub minimum_nights: u32,
    pub maximum_nights: Option<u32>,
    pub instant_book: bool,
    pub check_in_time: NaiveTime,
    pub check_out_time: NaiveTime,
    pub cleaning_fee: Option<Decimal>,
    pub extra_guest_fee: Option<Decimal>,
    pub pet_fee: Option<Decimal>,
    pub security_deposit: Option<Decimal>,
}

impl ShortTermTerms {
    /// House defaults: one-night minimum, 3pm check-in, 11am check-out.
    pub fn standard(property_id: PropertyId) -> Self {
        Self {
            property_id,
            minimum_nights: 1,
            maximum_nights: None,
            instant_book: false,
            check_in_time: NaiveTime::from_hms_opt(15, 0, 0).expect("valid check-in time"),
            check_out_time: NaiveTime::from_hms_opt(11, 0, 0).expect("valid check-out time"),
            cleaning_fee: None,
            extra_guest_fee: None,
            pet_fee: None,
            security_deposit: None,
        }
    }
}

/// Per-property configuration for long-term rentals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermTerms {
    pub property_id: PropertyId,
    pub lease_term_months: u32,
    pub security_deposit: Option<Decimal>,
    pub application_fee: Option<Decimal>,
    pub income_requirement_multiplier: Decimal,
    pub credit_score_minimum: Option<u16>,
    pub available_date: Option<NaiveDate>,
}

impl LongTermTerms {
    /// House defaults: twelve-month lease, 3x income requirement.
    pub fn standard(property_id: PropertyId) -> Self {
        Self {
            property_id,
            lease_term_months: 12,
            security_deposit: None,
            application_fee: None,
            income_requirement_multiplier: Decimal::from(3),
            credit_score_minimum: None,
            available_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn address() -> PropertyAddress {
        PropertyAddress {
            street: "118 Court Ave".to_string(),
            city: "Des Moines".to_string(),
            state: "IA".to_string(),
            country: "US".to_string(),
            postal_code: "50309".to_string(),
        }
    }

    fn new_property(property_type: PropertyType) -> NewProperty {
        NewProperty {
            account_id: UserId("acct-1".to_string()),
            title: "Court Avenue Loft".to_string(),
            description: None,
            property_type,
            address: address(),
            price_per_night: Some(dec!(145.00)),
            price_per_month: Some(dec!(1650.00)),
            bedrooms: Some(2),
            square_feet: Some(980),
            amenities: vec!["parking".to_string()],
            listing_agent_id: None,
        }
    }

    #[test]
    fn short_term_requires_nightly_rate() {
        let mut new = new_property(PropertyType::ShortTerm);
        new.price_per_night = None;

        let result = Property::from_new(PropertyId("prop-1".to_string()), new);
        assert!(matches!(result, Err(PricingError::MissingNightlyRate)));
    }

    #[test]
    fn long_term_requires_monthly_rate() {
        let mut new = new_property(PropertyType::LongTerm);
        new.price_per_month = None;

        let result = Property::from_new(PropertyId("prop-1".to_string()), new);
        assert!(matches!(result, Err(PricingError::MissingMonthlyRate)));
    }

    #[test]
    fn zero_rate_is_rejected() {
        let mut new = new_property(PropertyType::ShortTerm);
        new.price_per_night = Some(Decimal::ZERO);

        let result = Property::from_new(PropertyId("prop-1".to_string()), new);
        assert!(matches!(result, Err(PricingError::NonPositiveRate { .. })));
    }

    #[test]
    fn rate_accessors_follow_property_type() {
        let property = Property::from_new(
            PropertyId("prop-1".to_string()),
            new_property(PropertyType::ShortTerm),
        )
        .expect("valid listing");

        assert_eq!(property.nightly_rate(), Some(dec!(145.00)));
        assert_eq!(property.monthly_rate(), None);
        assert!(property.is_active);
    }
}
