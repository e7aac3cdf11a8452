use crate::infra::{parse_date, Services};
use chrono::{Duration, Local, NaiveDate, Utc};
use clap::Args;
use rust_decimal::Decimal;

use rentfolio::error::AppError;
use rentfolio::workflows::catalog::{NewProperty, PropertyAddress, PropertyType};
use rentfolio::workflows::contracts::{CommissionStatus, CommissionTerms, NewContract, SigningParty};
use rentfolio::workflows::ids::UserId;
use rentfolio::workflows::intake::{
    ApplicationStatus, NewApplication, PersonalDetails,
};
use rentfolio::workflows::viewings::NewViewing;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Lease start date (YYYY-MM-DD). Defaults to 30 days from today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) lease_start: Option<NaiveDate>,
    /// Lease length in months.
    #[arg(long, default_value_t = 12)]
    pub(crate) lease_term_months: u32,
}

/// Walk one listing from intake to a signed lease, printing each step.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let services = Services::in_memory();
    let lease_start = args
        .lease_start
        .unwrap_or_else(|| Local::now().date_naive() + Duration::days(30));
    let lease_end = lease_start + Duration::days(365);

    println!("Rentfolio leasing demo");

    let property = services.catalog.list_property(NewProperty {
        account_id: UserId("acct-demo".to_string()),
        title: "Court Avenue Loft".to_string(),
        description: Some("Two-bedroom loft above the farmers market".to_string()),
        property_type: PropertyType::LongTerm,
        address: PropertyAddress {
            street: "118 Court Ave".to_string(),
            city: "Des Moines".to_string(),
            state: "IA".to_string(),
            country: "US".to_string(),
            postal_code: "50309".to_string(),
        },
        price_per_night: None,
        price_per_month: Some(Decimal::new(165_000, 2)),
        bedrooms: Some(2),
        square_feet: Some(980),
        amenities: vec!["parking".to_string(), "laundry".to_string()],
        listing_agent_id: Some(UserId("agent-demo".to_string())),
    })?;
    println!("listed {} ({})", property.id, property.title);

    let application = services.intake.submit_application(
        UserId("tenant-demo".to_string()),
        NewApplication {
            property_id: property.id.clone(),
            personal: PersonalDetails {
                first_name: "Avery".to_string(),
                last_name: "Nolan".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1993, 2, 11).expect("valid date"),
                email: "avery@example.com".to_string(),
                phone: "515-555-0142".to_string(),
                current_address: PropertyAddress {
                    street: "900 Keo Way".to_string(),
                    city: "Des Moines".to_string(),
                    state: "IA".to_string(),
                    country: "US".to_string(),
                    postal_code: "50309".to_string(),
                },
            },
            employment: None,
            financial: None,
            background_check_consent: true,
            credit_check_consent: true,
            move_in_date: Some(lease_start),
            lease_term_requested: Some(args.lease_term_months),
        },
    )?;
    println!("application {} submitted", application.id);

    let scheduled = Utc::now() + Duration::days(1);
    let viewing = services.viewings.schedule(
        NewViewing {
            property_id: property.id.clone(),
            applicant_id: Some(application.id.clone()),
            agent_id: UserId("agent-demo".to_string()),
            scheduled_date: scheduled,
            duration_minutes: 45,
            notes: Some("Meet at the lobby entrance".to_string()),
        },
        Utc::now(),
    )?;
    services
        .viewings
        .complete(&viewing.id, scheduled, Some("Toured unit and garage".to_string()))?;
    println!("viewing {} completed", viewing.id);

    services
        .intake
        .transition_application(&application.id, ApplicationStatus::UnderReview, Utc::now())?;
    let approved = services.intake.transition_application(
        &application.id,
        ApplicationStatus::Approved,
        Utc::now(),
    )?;
    println!("application {} {}", approved.id, approved.status);

    let contract = services.contracts.create_draft(NewContract {
        property_id: property.id.clone(),
        tenant_id: UserId("tenant-demo".to_string()),
        landlord_id: UserId("acct-demo".to_string()),
        application_id: Some(application.id.clone()),
        contract_type: "lease_agreement".to_string(),
        monthly_rent: Decimal::new(165_000, 2),
        security_deposit: Some(Decimal::new(330_000, 2)),
        lease_start_date: lease_start,
        lease_end_date: lease_end,
        lease_term_months: args.lease_term_months,
    })?;
    services
        .contracts
        .dispatch(&contract.id, "envelope-demo-1".to_string())?;
    services
        .contracts
        .record_signature(&contract.id, SigningParty::Tenant, Utc::now())?;
    let executed = services
        .contracts
        .record_signature(&contract.id, SigningParty::Landlord, Utc::now())?;
    println!(
        "contract {} {} (executed {})",
        executed.id,
        executed.status,
        executed
            .fully_executed_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_default()
    );

    let mid_lease = lease_start + Duration::days(90);
    let open = services.catalog.is_available(&property.id, mid_lease)?;
    println!("{} available on {}: {}", property.id, mid_lease, open);

    let commission = services.commissions.upsert(CommissionTerms {
        contract_id: executed.id.clone(),
        agent_id: UserId("agent-demo".to_string()),
        commission_type: "listing".to_string(),
        commission_rate: Decimal::new(3, 2),
        base_amount: Decimal::new(1_980_000, 2),
        due_date: Some(lease_start),
    })?;
    let paid = services.commissions.advance(
        &commission.id,
        CommissionStatus::Processing,
        Utc::now(),
        None,
    )?;
    let paid = services.commissions.advance(
        &paid.id,
        CommissionStatus::Paid,
        Utc::now(),
        Some("tr_demo_1".to_string()),
    )?;
    println!(
        "commission {} {} for {} ({} of base {})",
        paid.id, paid.status, paid.agent_id, paid.commission_amount, paid.base_amount
    );

    Ok(())
}
