// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Relay form extraction
//!
//! Gateways hand session state between hops with a page holding a single
//! auto-submitting form. This module pulls the form's target and fields
//! out of such a page.

use crate::dom::parse_markup;
use crate::error::{Error, Result};
use crate::http::{Endpoint, FormFields};

/// Form found on a relay page, consumed by exactly one POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayForm {
    /// Where the form posts to
    pub action: Endpoint,
    /// Input fields in document order
    pub fields: FormFields,
    /// Input types, parallel to `fields`
    field_types: Vec<String>,
}

impl RelayForm {
    /// Extract the form from a relay page served at `page`
    ///
    /// A relative or empty `action` resolves against `page`. Inputs without
    /// a name are skipped, inputs without a value post an empty string.
    pub fn extract(body: &str, page: &Endpoint) -> Result<Self> {
        let doc = parse_markup(body).map_err(|e| e.with_url(page.to_string()))?;

        let forms = doc.find_all("form");
        let form_idx = match forms.as_slice() {
            [] => {
                return Err(Error::malformed_relay("no form element").with_url(page.to_string()))
            }
            [only] => *only,
            [first, ..] => {
                tracing::debug!(
                    forms = forms.len(),
                    page = %page,
                    "Relay page has several forms, using the first"
                );
                *first
            }
        };

        let action = match doc
            .get(form_idx)
            .and_then(|f| f.get_attribute("action"))
            .map(str::trim)
        {
            Some(action) if !action.is_empty() => Endpoint::from_location(&page.host, action),
            _ => page.clone(),
        };

        let mut inputs = doc.descendants_named(form_idx, "input");
        if inputs.is_empty() {
            // A form opened inside a table is closed at once; its inputs follow it
            inputs = doc.following_named(form_idx, "input", "form");
        }

        let mut fields = FormFields::new();
        let mut field_types = Vec::new();
        for input in inputs {
            let Some(name) = input.get_attribute("name") else {
                continue;
            };
            fields.push(name, input.get_attribute("value").unwrap_or_default());
            field_types.push(input.input_type());
        }

        if fields.is_empty() {
            tracing::warn!(page = %page, action = %action, "Relay form has no named inputs");
        } else {
            tracing::debug!(action = %action, fields = ?fields.names(), "Extracted relay form");
        }

        Ok(Self {
            action,
            fields,
            field_types,
        })
    }

    /// Extract the form only if the page looks like a relay page
    ///
    /// A relay page has a form with at least one field and nothing a user
    /// would fill in: every input is hidden or a submit control.
    pub fn sniff(body: &str, page: &Endpoint) -> Option<Self> {
        let form = Self::extract(body, page).ok()?;
        if form.is_hidden_only() {
            Some(form)
        } else {
            None
        }
    }

    /// Check if the form has fields and all of them are hidden or submit controls
    pub fn is_hidden_only(&self) -> bool {
        !self.fields.is_empty()
            && self
                .field_types
                .iter()
                .all(|t| matches!(t.as_str(), "hidden" | "submit"))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the form has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn page() -> Endpoint {
        Endpoint::new("intranet.example.com", "/vdesk/relay.php3")
    }

    #[test]
    fn test_extract_absolute_action_in_order() {
        let html = r#"
            <html><body onload="document.forms[0].submit()">
                <form method="post" action="https://idp.example/submit">
                    <input type="hidden" name="a" value="1">
                    <input type="hidden" name="b" value="2">
                </form>
            </body></html>
        "#;

        let form = RelayForm::extract(html, &page()).unwrap();

        assert_eq!(form.action, Endpoint::new("idp.example", "/submit"));
        assert_eq!(form.fields.iter().collect::<Vec<_>>(), vec![("a", "1"), ("b", "2")]);
        assert!(form.is_hidden_only());
    }

    #[test]
    fn test_relative_and_missing_action() {
        let relative =
            r#"<form action="/sso/post?x=1"><input type="hidden" name="t" value="v"></form>"#;
        let form = RelayForm::extract(relative, &page()).unwrap();
        assert_eq!(form.action, Endpoint::new("intranet.example.com", "/sso/post?x=1"));

        let missing = r#"<form><input type="hidden" name="t" value="v"></form>"#;
        let form = RelayForm::extract(missing, &page()).unwrap();
        assert_eq!(form.action, page());
    }

    #[test]
    fn test_unnamed_inputs_skipped_and_empty_values_kept() {
        let html =
            r#"<form action="/x"><input type="submit"><input type="hidden" name="empty"></form>"#;
        let form = RelayForm::extract(html, &page()).unwrap();

        assert_eq!(form.len(), 1);
        assert_eq!(form.fields.get("empty"), Some(""));
    }

    #[test]
    fn test_no_form_is_malformed() {
        let html = "<html><body>Access denied</body></html>";
        let err = RelayForm::extract(html, &page()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRelayPage);
        assert_eq!(err.url(), Some("intranet.example.com/vdesk/relay.php3"));
    }

    #[test]
    fn test_form_inside_table() {
        let html = r#"
            <html><body>
                <table>
                    <form method="post" action="/vdesk/post">
                    <tr><td>
                        <input type="hidden" name="a" value="1">
                        <input type="hidden" name="b" value="2">
                    </td></tr>
                    </form>
                </table>
                <form action="/search"><input name="q"></form>
            </body></html>
        "#;

        let form = RelayForm::extract(html, &page()).unwrap();

        assert_eq!(form.action, Endpoint::new("intranet.example.com", "/vdesk/post"));
        assert_eq!(form.fields.names(), vec!["a", "b"]);
        assert!(form.is_hidden_only());
    }

    #[test]
    fn test_sniff_rejects_user_forms() {
        let login = r#"<form action="/search"><input name="q" value=""></form>"#;
        assert!(RelayForm::sniff(login, &page()).is_none());

        let relay = r#"<form action="/r"><input type="hidden" name="SAMLResponse" value="PHNhbWw+"></form>"#;
        assert!(RelayForm::sniff(relay, &page()).is_some());

        assert!(RelayForm::sniff("<p>Welcome</p>", &page()).is_none());
    }
}
