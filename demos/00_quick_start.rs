/// quick start - compute an emi and print the schedule
use finance_tracker::chrono::NaiveDate;
use finance_tracker::{compute_installment, generate_schedule, LoanTerms, Money, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let terms = LoanTerms::new(
        Money::from_major(100_000),
        Rate::from_percentage(12),
        12,
        NaiveDate::from_ymd_opt(2025, 1, 5).ok_or("bad start date")?,
        5,
    )?;

    let emi = compute_installment(terms.principal(), terms.annual_rate(), terms.tenure_months());
    println!("emi: {}", Money::from_decimal(emi));

    let schedule = generate_schedule(&terms)?;
    println!(
        "{:>4} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "#", "due", "emi", "principal", "interest", "balance"
    );
    for entry in &schedule.entries {
        println!(
            "{:>4} {:>12} {:>12} {:>12} {:>12} {:>14}",
            entry.period_index + 1,
            entry.due_date,
            entry.installment_amount,
            entry.principal_portion,
            entry.interest_portion,
            entry.balance_after,
        );
    }
    println!("total interest: {}", schedule.total_interest);

    Ok(())
}
