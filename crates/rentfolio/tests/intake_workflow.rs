use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use rentfolio::store::MemoryMarketplace;
use rentfolio::workflows::catalog::{
    AvailabilityWindow, CatalogService, NewProperty, PropertyAddress, PropertyType, ShortTermTerms,
};
use rentfolio::workflows::ids::{PropertyId, UserId};
use rentfolio::workflows::intake::{
    BookingStatus, IntakeError, IntakeService, NewBooking,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn address() -> PropertyAddress {
    PropertyAddress {
        street: "300 E Locust St".to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        country: "US".to_string(),
        postal_code: "50309".to_string(),
    }
}

fn setup() -> (
    Arc<MemoryMarketplace>,
    CatalogService<MemoryMarketplace>,
    IntakeService<MemoryMarketplace>,
    PropertyId,
) {
    let store = Arc::new(MemoryMarketplace::new());
    let catalog = CatalogService::new(store.clone());
    let intake = IntakeService::new(store.clone());

    let property = catalog
        .list_property(NewProperty {
            account_id: UserId("acct-1".to_string()),
            title: "East Village Studio".to_string(),
            description: None,
            property_type: PropertyType::ShortTerm,
            address: address(),
            price_per_night: Some(dec!(120.00)),
            price_per_month: None,
            bedrooms: Some(1),
            square_feet: Some(540),
            amenities: Vec::new(),
            listing_agent_id: None,
        })
        .expect("listing created");

    let mut terms = ShortTermTerms::standard(property.id.clone());
    terms.cleaning_fee = Some(dec!(60.00));
    terms.extra_guest_fee = Some(dec!(15.00));
    terms.pet_fee = Some(dec!(25.00));
    catalog.set_short_term_terms(terms).expect("terms stored");

    let id = property.id;
    (store, catalog, intake, id)
}

fn booking(property_id: &PropertyId, check_in: NaiveDate, check_out: NaiveDate) -> NewBooking {
    NewBooking {
        property_id: property_id.clone(),
        check_in_date: check_in,
        check_out_date: check_out,
        num_guests: 2,
        num_pets: 0,
        special_requests: None,
    }
}

#[test]
fn booking_is_priced_from_the_fee_schedule() {
    let (_, _, intake, property_id) = setup();

    let mut new = booking(&property_id, date(2026, 6, 1), date(2026, 6, 5));
    new.num_guests = 4;
    new.num_pets = 1;
    let stored = intake
        .request_booking(UserId("guest-1".to_string()), new)
        .expect("booking created");

    // 4 nights * 120 + 60 cleaning + 2 extra guests * 15 + 1 pet * 25
    assert_eq!(stored.total_amount, dec!(595.00));
    assert_eq!(stored.status, BookingStatus::Pending);
}

#[test]
fn overlapping_pending_booking_blocks_the_dates() {
    let (_, _, intake, property_id) = setup();

    intake
        .request_booking(
            UserId("guest-1".to_string()),
            booking(&property_id, date(2026, 6, 1), date(2026, 6, 5)),
        )
        .expect("first booking");

    let err = intake
        .request_booking(
            UserId("guest-2".to_string()),
            booking(&property_id, date(2026, 6, 4), date(2026, 6, 8)),
        )
        .expect_err("dates taken");
    assert!(matches!(err, IntakeError::Validation(_)));

    // Back-to-back turnover on the check-out day is allowed.
    intake
        .request_booking(
            UserId("guest-2".to_string()),
            booking(&property_id, date(2026, 6, 5), date(2026, 6, 8)),
        )
        .expect("check-out day reopens");
}

#[test]
fn cancelled_booking_releases_the_dates() {
    let (_, _, intake, property_id) = setup();

    let first = intake
        .request_booking(
            UserId("guest-1".to_string()),
            booking(&property_id, date(2026, 6, 1), date(2026, 6, 5)),
        )
        .expect("first booking");
    intake
        .transition_booking(
            &first.id,
            BookingStatus::Cancelled,
            Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap(),
        )
        .expect("cancelled");

    intake
        .request_booking(
            UserId("guest-2".to_string()),
            booking(&property_id, date(2026, 6, 2), date(2026, 6, 6)),
        )
        .expect("dates are free again");
}

#[test]
fn availability_blocks_stop_new_bookings() {
    let (_, catalog, intake, property_id) = setup();

    catalog
        .record_availability(AvailabilityWindow {
            property_id: property_id.clone(),
            available_from: date(2026, 7, 1),
            available_to: Some(date(2026, 7, 31)),
            is_available: false,
            reason: Some("maintenance".to_string()),
        })
        .expect("window recorded");

    let err = intake
        .request_booking(
            UserId("guest-1".to_string()),
            booking(&property_id, date(2026, 7, 10), date(2026, 7, 12)),
        )
        .expect_err("blocked by maintenance");
    assert!(matches!(err, IntakeError::Validation(_)));

    intake
        .request_booking(
            UserId("guest-1".to_string()),
            booking(&property_id, date(2026, 8, 1), date(2026, 8, 3)),
        )
        .expect("outside the block");
}

#[test]
fn deactivated_listing_rejects_intake() {
    let (_, catalog, intake, property_id) = setup();

    catalog.deactivate(&property_id).expect("deactivated");

    let err = intake
        .request_booking(
            UserId("guest-1".to_string()),
            booking(&property_id, date(2026, 6, 1), date(2026, 6, 5)),
        )
        .expect_err("inactive listing");
    assert!(matches!(err, IntakeError::Validation(_)));
}

#[test]
fn stay_length_honors_the_listing_terms() {
    let (_, catalog, intake, property_id) = setup();

    let mut terms = ShortTermTerms::standard(property_id.clone());
    terms.minimum_nights = 3;
    terms.maximum_nights = Some(14);
    catalog.set_short_term_terms(terms).expect("terms stored");

    let err = intake
        .request_booking(
            UserId("guest-1".to_string()),
            booking(&property_id, date(2026, 6, 1), date(2026, 6, 3)),
        )
        .expect_err("two nights is below the minimum");
    assert!(matches!(err, IntakeError::Validation(_)));

    intake
        .request_booking(
            UserId("guest-1".to_string()),
            booking(&property_id, date(2026, 6, 1), date(2026, 6, 4)),
        )
        .expect("three nights is allowed");
}
