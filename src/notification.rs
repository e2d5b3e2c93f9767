use crate::models::NormalizedLead;

/// Human-readable summary of the inquiry, one detail per line.
///
/// Used as the CRM note body and embedded in the notification email.
pub fn build_lead_note(lead: &NormalizedLead) -> String {
    let amount = if lead.loan_amount.is_empty() {
        "(not provided)"
    } else {
        lead.loan_amount.as_str()
    };
    let message = if lead.message.is_empty() {
        "(none)"
    } else {
        lead.message.as_str()
    };

    [
        format!("Loan Type: {}", lead.loan_type),
        format!("Loan Amount: {}", amount),
        format!("Property State: {}", lead.property_state),
        format!("Timeline: {}", lead.timeline),
        format!("Message: {}", message),
    ]
    .join("\n")
}

pub fn email_subject(lead: &NormalizedLead) -> String {
    format!("New lead: {} ({})", lead.full_name(), lead.loan_type)
}

/// HTML body for the notification email. All visitor-supplied text is escaped.
pub fn render_email_html(lead: &NormalizedLead, note: &str) -> String {
    let phone = lead.phone.as_deref().unwrap_or("(not provided)");
    let note_html = note
        .lines()
        .map(escape_html)
        .collect::<Vec<_>>()
        .join("<br>");

    format!(
        concat!(
            "<h2>New website lead</h2>",
            "<p><strong>Name:</strong> {name}<br>",
            "<strong>Email:</strong> {email}<br>",
            "<strong>Phone:</strong> {phone}</p>",
            "<p>{note}</p>",
            "<p style=\"color:#64748b;font-size:12px\">Submitted {submitted} (ref {id})</p>"
        ),
        name = escape_html(&lead.full_name()),
        email = escape_html(&lead.email),
        phone = escape_html(phone),
        note = note_html,
        submitted = lead.submitted_at.format("%Y-%m-%d %H:%M UTC"),
        id = lead.submission_id,
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeadSubmission, LoanType, Timeline};
    use uuid::Uuid;

    fn lead(loan_amount: &str, message: &str) -> NormalizedLead {
        NormalizedLead::from_submission(
            &LeadSubmission {
                full_name: "Chris Miller".into(),
                email: "chris@example.com".into(),
                loan_type: LoanType::Commercial,
                loan_amount: loan_amount.into(),
                property_state: "NY".into(),
                timeline: Timeline::SixtyPlusDays,
                message: message.into(),
                consent: true,
                ..Default::default()
            },
            Uuid::nil(),
        )
    }

    #[test]
    fn test_note_lists_inquiry_details() {
        let note = build_lead_note(&lead("$750k", "Cash-out refi"));
        assert_eq!(
            note,
            "Loan Type: Commercial\n\
             Loan Amount: $750k\n\
             Property State: NY\n\
             Timeline: 60+ days\n\
             Message: Cash-out refi"
        );
    }

    #[test]
    fn test_note_placeholders_for_optional_fields() {
        let note = build_lead_note(&lead("", "  "));
        assert!(note.contains("Loan Amount: (not provided)"));
        assert!(note.contains("Message: (none)"));
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            email_subject(&lead("", "")),
            "New lead: Chris Miller (Commercial)"
        );
    }

    #[test]
    fn test_html_escapes_visitor_text() {
        let lead = lead("", "<script>alert('x')</script>");
        let html = render_email_html(&lead, &build_lead_note(&lead));

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("Loan Type: Commercial<br>"));
        assert!(html.contains("<strong>Phone:</strong> (not provided)"));
    }
}
