/// seed loans - bootstrap sample loans for local development
use finance_tracker::chrono::{NaiveDate, TimeZone, Utc};
use finance_tracker::{
    Decimal, EventStore, Loan, LoanConfig, Money, PaymentStatus, Rate, SafeTimeProvider,
    TimeSource,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).single().ok_or("bad seed time")?,
    ));
    let mut events = EventStore::new();
    let start = NaiveDate::from_ymd_opt(2025, 1, 5).ok_or("bad start date")?;

    let seeds = vec![
        LoanConfig::home_loan(
            "SBI",
            Money::from_major(500_000),
            Rate::from_percent(Decimal::new(85, 1)),
            start,
        ),
        LoanConfig::new(
            "Car Loan",
            "HDFC Bank",
            Money::from_major(800_000),
            Rate::from_percent(Decimal::new(925, 2)),
            60,
            start,
            10,
        ),
        LoanConfig::no_cost_emi("Phone", "Bajaj Finserv", Money::from_major(12_000), 12, start, 15),
    ];

    let mut loans = Vec::new();
    for config in seeds {
        loans.push(Loan::create(config, &time, &mut events)?);
    }

    // first installment of the phone loan already settled
    let phone = &mut loans[2];
    let first = phone.payments[0].id;
    phone.update_payment_status(first, PaymentStatus::Paid, &time, &mut events)?;

    for loan in &loans {
        println!(
            "{:<10} {:<14} emi {:>10}  remaining {:>12}  installments {}",
            loan.name,
            loan.lender_name,
            loan.emi_amount,
            loan.remaining_balance,
            loan.payments.len()
        );
    }

    println!("\n{} events recorded", events.len());
    println!("\n{}", loans[2].json());

    Ok(())
}
