use serde::Serialize;

use super::domain::{BudgetBand, FinancingStatus, LeadSubmission, UrgencyWindow};

pub const MAX_SCORE: u8 = 100;
pub const EMAIL_BONUS: u8 = 10;

/// Factor contributing to a lead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Budget,
    Urgency,
    Financing,
    EmailProvided,
}

impl ScoreFactor {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreFactor::Budget => "Budget",
            ScoreFactor::Urgency => "Urgency",
            ScoreFactor::Financing => "Financing",
            ScoreFactor::EmailProvided => "Email provided",
        }
    }
}

/// Points awarded for one factor, with the form value that earned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: u8,
    pub notes: String,
}

/// Composite score and the per-factor trail that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub total: u8,
    pub band: ScoreBand,
    pub components: Vec<ScoreComponent>,
}

/// Priority band derived from the score; drives notification copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Hot,
    Warm,
    Cold,
}

impl ScoreBand {
    pub const fn from_score(score: u8) -> Self {
        if score >= 70 {
            ScoreBand::Hot
        } else if score >= 50 {
            ScoreBand::Warm
        } else {
            ScoreBand::Cold
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ScoreBand::Hot => "hot",
            ScoreBand::Warm => "warm",
            ScoreBand::Cold => "cold",
        }
    }
}

pub fn budget_points(budget: Option<&BudgetBand>) -> u8 {
    match budget {
        Some(BudgetBand::AboveFiftyMillion) => 40,
        Some(BudgetBand::TwentyToFiftyMillion) => 30,
        Some(BudgetBand::FiveToTwentyMillion) => 20,
        Some(BudgetBand::UnderFiveMillion) | Some(BudgetBand::Other(_)) | None => 10,
    }
}

pub fn urgency_points(urgency: Option<&UrgencyWindow>) -> u8 {
    match urgency {
        Some(UrgencyWindow::WithinOneMonth) => 30,
        Some(UrgencyWindow::OneToThreeMonths) => 20,
        Some(UrgencyWindow::ThreeToSixMonths) => 10,
        Some(UrgencyWindow::JustBrowsing) | Some(UrgencyWindow::Other(_)) | None => 5,
    }
}

pub fn financing_points(financing: Option<&FinancingStatus>) -> u8 {
    match financing {
        Some(FinancingStatus::ReadyToPay) | Some(FinancingStatus::CashBuyer) => 20,
        Some(FinancingStatus::AwaitingMortgageApproval) => 10,
        Some(FinancingStatus::NeedsFinancingHelp)
        | Some(FinancingStatus::NotSure)
        | Some(FinancingStatus::Other(_))
        | None => 5,
    }
}

pub fn has_email(email: Option<&str>) -> bool {
    email.map_or(false, |value| !value.trim().is_empty())
}

/// Score a lead form. Total for every input; unrecognized values earn the default points.
pub fn score_lead(submission: &LeadSubmission) -> u8 {
    breakdown(submission).total
}

pub fn breakdown(submission: &LeadSubmission) -> ScoreBreakdown {
    let budget = submission.budget.as_ref();
    let urgency = submission.urgency.as_ref();
    let financing = submission.financing_status.as_ref();
    let email = submission.email.as_deref();

    let components = vec![
        ScoreComponent {
            factor: ScoreFactor::Budget,
            points: budget_points(budget),
            notes: describe(budget.map(BudgetBand::label)),
        },
        ScoreComponent {
            factor: ScoreFactor::Urgency,
            points: urgency_points(urgency),
            notes: describe(urgency.map(UrgencyWindow::label)),
        },
        ScoreComponent {
            factor: ScoreFactor::Financing,
            points: financing_points(financing),
            notes: describe(financing.map(FinancingStatus::label)),
        },
        ScoreComponent {
            factor: ScoreFactor::EmailProvided,
            points: if has_email(email) { EMAIL_BONUS } else { 0 },
            notes: describe(email),
        },
    ];

    let sum: u16 = components
        .iter()
        .map(|component| u16::from(component.points))
        .sum();
    let total = sum.min(u16::from(MAX_SCORE)) as u8;

    ScoreBreakdown {
        total,
        band: ScoreBand::from_score(total),
        components,
    }
}

fn describe(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => "not provided".to_string(),
    }
}
