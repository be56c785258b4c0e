/// monthly planner - obligations against income for one month
use finance_tracker::chrono::{NaiveDate, TimeZone, Utc};
use finance_tracker::{
    EventStore, Loan, LoanConfig, Money, MonthlyPlan, Period, Rate, SafeTimeProvider,
    SubscriptionCategory, SubscriptionConfig, SubscriptionLedger, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).single().ok_or("bad time")?,
    ));
    let mut events = EventStore::new();
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).ok_or("bad start date")?;

    let loans = vec![
        Loan::create(
            LoanConfig::new(
                "Car",
                "HDFC",
                Money::from_major(100_000),
                Rate::from_percentage(12),
                12,
                start,
                5,
            ),
            &time,
            &mut events,
        )?,
        Loan::create(
            LoanConfig::no_cost_emi(
                "Phone",
                "Bajaj Finserv",
                Money::from_major(12_000),
                12,
                start,
                10,
            ),
            &time,
            &mut events,
        )?,
    ];

    let mut subscriptions = SubscriptionLedger::new();
    subscriptions.add(SubscriptionConfig::new(
        "Music",
        Money::from_major(119),
        10,
        SubscriptionCategory::Personal,
        "Amazon Pay ICICI",
    ))?;
    subscriptions.add(SubscriptionConfig::new(
        "Cloud",
        Money::from_major(500),
        2,
        SubscriptionCategory::Work,
        "HDFC Regalia",
    ))?;

    let plan = MonthlyPlan::build(
        Period::new(2025, 3),
        Money::from_major(50_000),
        &loans,
        &mut subscriptions,
        &mut events,
    )?;

    for item in &plan.calendar_items {
        println!(
            "{:>2}  {:<8} {:<22} {:>10}  {:?}",
            item.day, item.name, item.subtitle, item.amount, item.status
        );
    }
    println!("\n{}", serde_json::to_string_pretty(&plan.summary)?);

    Ok(())
}
