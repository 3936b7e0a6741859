use clap::Args;
use property_leads::auth::password::hash_password;
use property_leads::error::AppError;
use property_leads::leads::scoring::{breakdown, ScoreBreakdown};
use property_leads::leads::{BudgetBand, FinancingStatus, LeadSubmission, UrgencyWindow};

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// Budget band exactly as offered on the form, e.g. "Above ₦50 million"
    #[arg(long)]
    pub(crate) budget: Option<String>,
    /// Purchase timeline, e.g. "1-3 months"
    #[arg(long)]
    pub(crate) urgency: Option<String>,
    /// Financing readiness, e.g. "Cash buyer (no loan needed)"
    #[arg(long)]
    pub(crate) financing: Option<String>,
    /// Customer email; any non-blank value earns the contact bonus
    #[arg(long)]
    pub(crate) email: Option<String>,
    /// Print the breakdown as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct HashPasswordArgs {
    /// Plaintext password to hash
    pub(crate) password: String,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let as_json = args.json;
    let scored = breakdown(&submission_from_args(args));

    if as_json {
        println!("{}", serde_json::to_string_pretty(&scored)?);
    } else {
        render_breakdown(&scored);
    }
    Ok(())
}

pub(crate) fn run_hash_password(args: HashPasswordArgs) -> Result<(), AppError> {
    let hash = hash_password(&args.password)?;
    println!("{hash}");
    Ok(())
}

fn submission_from_args(args: ScoreArgs) -> LeadSubmission {
    LeadSubmission {
        email: args.email,
        budget: args.budget.map(BudgetBand::from),
        urgency: args.urgency.map(UrgencyWindow::from),
        financing_status: args.financing.map(FinancingStatus::from),
        ..LeadSubmission::default()
    }
}

fn render_breakdown(scored: &ScoreBreakdown) {
    println!("Lead score: {}/100 ({})", scored.total, scored.band.label());
    for component in &scored.components {
        println!(
            "  {:<16} {:>3}  {}",
            component.factor.label(),
            component.points,
            component.notes
        );
    }
}
