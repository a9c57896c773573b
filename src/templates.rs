//! Built-in document templates and placeholder filling.
//!
//! The editor seeds new documents from these; the CLI uses them as demo
//! inputs. Placeholders use `{{name}}` syntax and are substituted verbatim.

use std::collections::HashMap;

/// The default formal-notice document a new editing session starts from.
pub fn notice_template() -> &'static str {
    r##"
<h2 style="text-align:center;">Notice of Demand</h2>
<p>Date: {{date}}</p>
<p>Recipient: {{recipient}}</p>
<p>Recipient address: {{recipient_address}}</p>
<p>Sender: {{sender}}</p>
<p>Sender address: {{sender_address}}</p>
<p>Subject: Formal notice regarding unpaid severance</p>
<p>1. We wish your company continued prosperity.</p>
<p>2. The undersigned was employed by your company and duly separated from
employment on the date stated above.</p>
<p>3. Upon reviewing the severance payment received after separation, the
undersigned has determined that a portion of the amount owed remains
outstanding, and hereby demands payment of the remaining balance within
fourteen (14) days of receipt of this notice.</p>
<p>4. Should payment not be received within the stated period, the undersigned
intends to pursue all remedies available under applicable law without further
notice.</p>
<p style="text-align:right;">Sender: {{sender}} (signed)</p>
"##
}

/// A long sample that reliably spans several pages.
pub fn long_brief_template() -> &'static str {
    r##"
<h1>Statement of Claim</h1>
<p>This brief sets out the claimant's position in full, including the factual
background, the contractual terms at issue, and the relief sought.</p>
<h2>Background</h2>
<p>The parties entered into a written agreement for the provision of services.
Performance proceeded without incident for the first two quarters, after which
the respondent ceased remitting payment while continuing to accept
deliverables.</p>
<ul>
<li>Agreement executed and countersigned by both parties</li>
<li>Invoices issued monthly under the agreed schedule</li>
<li>Payments outstanding for four consecutive billing periods</li>
<li>Written reminders sent on three separate occasions</li>
</ul>
<h2>Contractual terms</h2>
<p>Clause 4.2 provides that invoices fall due thirty days after issue. Clause
7.1 provides that continued acceptance of deliverables constitutes
acknowledgment that the work conforms to the specification. Neither clause
was disputed at any point before this claim was filed.</p>
<blockquote>Payment of undisputed invoices shall not be withheld for any
reason, including pending resolution of unrelated disputes between the
parties.</blockquote>
<h2>Chronology</h2>
<ol>
<li>Services commenced under the agreement</li>
<li>First unpaid invoice issued</li>
<li>First written reminder delivered</li>
<li>Second and third reminders delivered</li>
<li>Final demand issued with a fourteen-day deadline</li>
<li>Deadline passed without payment or response</li>
</ol>
<h2>Relief sought</h2>
<p>The claimant seeks the outstanding principal, contractual interest accrued
from each due date, and costs. The claimant remains willing to resolve the
matter without a hearing should payment be received in full.</p>
<p>The facts stated above are within the direct knowledge of the claimant and
are supported by the exhibited correspondence and invoices. The claimant
reserves the right to supplement this statement should further non-payment
occur during the pendency of the claim.</p>
<h2>Declaration</h2>
<p>I declare that the contents of this statement are true to the best of my
knowledge and belief.</p>
<p style="text-align:right;">Claimant (signed)</p>
"##
}

/// Minimal template for smoke tests.
pub fn minimal_template() -> &'static str {
    "<h1>Title</h1><p>Body text</p>"
}

/// Replace every `{{name}}` placeholder with its value. Unknown placeholders
/// are left in place so a half-filled document is visibly half-filled.
pub fn fill_placeholders(template: &str, variables: &HashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (name, value) in variables {
        out = out.replace(&format!("{{{{{name}}}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_known_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("date".to_string(), "2025-06-01".to_string());
        vars.insert("recipient".to_string(), "Acme Corp".to_string());
        let filled = fill_placeholders(notice_template(), &vars);
        assert!(filled.contains("2025-06-01"));
        assert!(filled.contains("Acme Corp"));
        assert!(!filled.contains("{{date}}"));
    }

    #[test]
    fn unknown_placeholders_survive() {
        let filled = fill_placeholders(notice_template(), &HashMap::new());
        assert!(filled.contains("{{sender}}"));
    }

    #[test]
    fn templates_parse_to_blocks() {
        for (name, markup) in [
            ("notice", notice_template()),
            ("brief", long_brief_template()),
            ("minimal", minimal_template()),
        ] {
            let nodes = crate::dom::parse_markup(markup);
            assert!(!nodes.is_empty(), "template '{name}' parsed to nothing");
        }
    }
}
