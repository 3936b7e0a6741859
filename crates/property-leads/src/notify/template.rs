use std::fmt::Write as _;

use crate::agents::AgentRecord;
use crate::leads::domain::Lead;
use crate::leads::scoring::ScoreBand;

/// Rendered alert ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

struct BandCopy {
    emoji: &'static str,
    tag: &'static str,
    panel_colour: &'static str,
    action_html: &'static str,
    action_text: &'static str,
}

fn band_copy(band: ScoreBand) -> BandCopy {
    match band {
        ScoreBand::Hot => BandCopy {
            emoji: "🔥",
            tag: "HOT LEAD!",
            panel_colour: "#ffe6e6",
            action_html: "<strong>CALL IMMEDIATELY!</strong> This is a hot lead with high conversion potential. Follow up within 1 hour for best results.",
            action_text: "CALL IMMEDIATELY! This is a hot lead with high conversion potential. Follow up within 1 hour for best results.",
        },
        ScoreBand::Warm => BandCopy {
            emoji: "📞",
            tag: "WARM LEAD",
            panel_colour: "#fff9e6",
            action_html: "<strong>Follow up today.</strong> This prospect shows good interest. Call within 24 hours.",
            action_text: "Follow up today. This prospect shows good interest. Call within 24 hours.",
        },
        ScoreBand::Cold => BandCopy {
            emoji: "❄️",
            tag: "COLD LEAD",
            panel_colour: "#e6f7ff",
            action_html: "This lead needs nurturing. Send property info and follow up in 2-3 days.",
            action_text: "This lead needs nurturing. Send property info and follow up in 2-3 days.",
        },
    }
}

pub fn subject_line(lead: &Lead) -> String {
    let copy = band_copy(ScoreBand::from_score(lead.lead_score));
    format!("{} New {} - {}", copy.emoji, copy.tag, lead.customer_name)
}

/// Render the new-lead alert addressed to `agent`.
pub fn render_new_lead_email(lead: &Lead, agent: &AgentRecord) -> OutboundEmail {
    OutboundEmail {
        to: agent.email.clone(),
        subject: subject_line(lead),
        html: render_html(lead),
        text: render_text(lead),
    }
}

fn detail_rows(lead: &Lead) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Name", lead.customer_name.clone()),
        ("Phone", lead.phone.clone()),
    ];
    if let Some(email) = lead.email.as_deref().filter(|email| !email.trim().is_empty()) {
        rows.push(("Email", email.to_string()));
    }
    rows.push((
        "Budget",
        or_unspecified(lead.budget.as_ref().map(|budget| budget.label())),
    ));
    rows.push(("Location", or_unspecified(lead.location.as_deref())));
    rows.push((
        "Urgency",
        or_unspecified(lead.urgency.as_ref().map(|urgency| urgency.label())),
    ));
    rows.push((
        "Financing",
        or_unspecified(
            lead.financing_status
                .as_ref()
                .map(|financing| financing.label()),
        ),
    ));
    rows.push(("Property Type", or_unspecified(lead.property_type.as_deref())));
    rows
}

fn render_html(lead: &Lead) -> String {
    let copy = band_copy(ScoreBand::from_score(lead.lead_score));
    let phone = escape_html(&lead.phone);
    let name = escape_html(&lead.customer_name);
    let cell = "padding: 10px; background: white; border-bottom: 1px solid #eee;";

    let mut html = String::new();
    let _ = write!(
        html,
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <div style=\"background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; text-align: center;\">\
         <h1 style=\"margin: 0; font-size: 28px;\">{} New Lead Alert!</h1>\
         <p style=\"margin: 10px 0 0; font-size: 18px;\">Score: {}/100</p></div>",
        copy.emoji, lead.lead_score
    );
    html.push_str(
        "<div style=\"padding: 30px; background: #f9f9f9;\">\
         <h2 style=\"color: #333; margin-top: 0;\">Customer Details</h2>\
         <table style=\"width: 100%; border-collapse: collapse;\">",
    );

    for (label, value) in detail_rows(lead) {
        let value = escape_html(&value);
        let rendered = match label {
            "Phone" => format!("<a href=\"tel:{value}\">{value}</a>"),
            "Email" => format!("<a href=\"mailto:{value}\">{value}</a>"),
            _ => value,
        };
        let _ = write!(
            html,
            "<tr><td style=\"{cell}\"><strong>{label}:</strong></td><td style=\"{cell}\">{rendered}</td></tr>"
        );
    }
    html.push_str("</table>");

    let _ = write!(
        html,
        "<div style=\"margin-top: 30px; padding: 20px; background: {}; border-radius: 10px;\">\
         <h3 style=\"margin-top: 0; color: #333;\">📋 Recommended Action:</h3>\
         <p style=\"margin: 10px 0; line-height: 1.6;\">{}</p></div>",
        copy.panel_colour, copy.action_html
    );
    let _ = write!(
        html,
        "<div style=\"text-align: center; margin-top: 30px;\">\
         <a href=\"tel:{phone}\" style=\"display: inline-block; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 15px 30px; text-decoration: none; border-radius: 10px; font-weight: bold;\">\
         📞 Call {name} Now</a></div></div>"
    );
    html.push_str(
        "<div style=\"padding: 20px; text-align: center; color: #666; font-size: 12px;\">\
         <p>Property Lead Manager | Automated Lead Notification System</p></div></div>",
    );
    html
}

fn render_text(lead: &Lead) -> String {
    let copy = band_copy(ScoreBand::from_score(lead.lead_score));
    let mut text = String::new();
    let _ = writeln!(text, "{} New Lead Alert! Score: {}/100", copy.emoji, lead.lead_score);
    let _ = writeln!(text);
    for (label, value) in detail_rows(lead) {
        let _ = writeln!(text, "{label}: {value}");
    }
    let _ = writeln!(text);
    let _ = writeln!(text, "Recommended action: {}", copy.action_text);
    text
}

fn or_unspecified(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => "Not specified".to_string(),
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
