use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Services a client can ask for. The set is fixed; anything else is rejected on submit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceTag {
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Branding")]
    Branding,
    #[serde(rename = "Web Dev")]
    WebDev,
    #[serde(rename = "Mobile App")]
    MobileApp,
}

impl ServiceTag {
    pub const ALL: [ServiceTag; 4] = [
        ServiceTag::UiUx,
        ServiceTag::Branding,
        ServiceTag::WebDev,
        ServiceTag::MobileApp,
    ];

    /// Wire tag, as sent in the request body.
    pub fn tag(self) -> &'static str {
        match self {
            ServiceTag::UiUx => "UI/UX",
            ServiceTag::Branding => "Branding",
            ServiceTag::WebDev => "Web Dev",
            ServiceTag::MobileApp => "Mobile App",
        }
    }

    /// Human label shown next to the checkbox.
    pub fn label(self) -> &'static str {
        match self {
            ServiceTag::UiUx => "UI/UX Design",
            ServiceTag::Branding => "Branding",
            ServiceTag::WebDev => "Web Development",
            ServiceTag::MobileApp => "Mobile App Development",
        }
    }
}

impl fmt::Display for ServiceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ServiceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceTag::ALL
            .into_iter()
            .find(|t| t.tag() == s)
            .ok_or_else(|| format!("unknown service: '{s}'"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    FullName,
    Email,
    CompanyName,
    Services,
    BudgetUsd,
    ProjectStartDate,
    AcceptTerms,
}

impl FieldName {
    /// JSON key used on the wire and in error maps.
    pub fn key(self) -> &'static str {
        match self {
            FieldName::FullName => "fullName",
            FieldName::Email => "email",
            FieldName::CompanyName => "companyName",
            FieldName::Services => "services",
            FieldName::BudgetUsd => "budgetUsd",
            FieldName::ProjectStartDate => "projectStartDate",
            FieldName::AcceptTerms => "acceptTerms",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// New value for one draft field. The variant must match the field's shape.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Option<f64>),
    Tags(Vec<String>),
    Bool(bool),
}

/// In-progress form data. Nothing here is validated until submit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DraftRecord {
    pub full_name: String,
    pub email: String,
    pub company_name: String,
    pub services: Vec<String>,
    // Kept as a float so fractional and out-of-range input can be reported instead of lost.
    pub budget_usd: Option<f64>,
    pub project_start_date: String,
    pub accept_terms: bool,
}

impl DraftRecord {
    pub fn is_untouched(&self) -> bool {
        *self == DraftRecord::default()
    }

    /// Applies one edit. Returns false when the value shape does not fit the field.
    pub fn set(&mut self, field: FieldName, value: FieldValue) -> bool {
        match (field, value) {
            (FieldName::FullName, FieldValue::Text(s)) => self.full_name = s,
            (FieldName::Email, FieldValue::Text(s)) => self.email = s,
            (FieldName::CompanyName, FieldValue::Text(s)) => self.company_name = s,
            (FieldName::ProjectStartDate, FieldValue::Text(s)) => self.project_start_date = s,
            (FieldName::Services, FieldValue::Tags(tags)) => self.services = tags,
            (FieldName::BudgetUsd, FieldValue::Number(n)) => self.budget_usd = n,
            (FieldName::BudgetUsd, FieldValue::Text(s)) => self.budget_usd = parse_budget_text(&s),
            (FieldName::AcceptTerms, FieldValue::Bool(b)) => self.accept_terms = b,
            _ => return false,
        }
        true
    }

    pub fn has_service(&self, tag: ServiceTag) -> bool {
        self.services.iter().any(|s| s == tag.tag())
    }

    /// Adds or removes a catalog tag, keeping the existing order of the rest.
    pub fn toggle_service(&self, tag: ServiceTag) -> Vec<String> {
        let mut next = self.services.clone();
        if let Some(pos) = next.iter().position(|s| s == tag.tag()) {
            next.remove(pos);
        } else {
            next.push(tag.tag().to_string());
        }
        next
    }
}

// Empty text clears the budget; unparseable text becomes NaN so the validator can flag it.
fn parse_budget_text(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    Some(t.parse::<f64>().unwrap_or(f64::NAN))
}

/// Output of a successful validation, ready to be sent as the request body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub full_name: String,
    pub email: String,
    pub company_name: String,
    pub services: Vec<ServiceTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_usd: Option<u32>,
    pub project_start_date: NaiveDate,
    pub accept_terms: bool,
}

impl NormalizedRecord {
    pub fn services_joined(&self) -> String {
        self.services
            .iter()
            .map(|s| s.tag())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One message per failing field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FieldName, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    // A later message for the same field replaces the earlier one.
    pub fn insert(&mut self, field: FieldName, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.0.keys().copied()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SubmissionOutcome {
    #[default]
    Idle,
    InFlight,
    Success {
        record: NormalizedRecord,
        message: String,
    },
    Failure(String),
}

impl SubmissionOutcome {
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Failure(m) => Some(m),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn service_tags_parse_from_wire_names_only() {
        assert_eq!("UI/UX".parse::<ServiceTag>(), Ok(ServiceTag::UiUx));
        assert_eq!("Web Dev".parse::<ServiceTag>(), Ok(ServiceTag::WebDev));
        assert!("UI/UX Design".parse::<ServiceTag>().is_err());
        assert!("ui/ux".parse::<ServiceTag>().is_err());
    }

    #[test]
    fn draft_set_rejects_mismatched_shapes() {
        let mut d = DraftRecord::default();
        assert!(!d.set(FieldName::AcceptTerms, FieldValue::Text("yes".into())));
        assert!(!d.set(FieldName::Services, FieldValue::Bool(true)));
        assert!(d.is_untouched());
        assert!(d.set(FieldName::AcceptTerms, FieldValue::Bool(true)));
        assert!(!d.is_untouched());
    }

    #[test]
    fn budget_text_parsing() {
        let mut d = DraftRecord::default();
        d.set(FieldName::BudgetUsd, FieldValue::Text(" 2500 ".into()));
        assert_eq!(d.budget_usd, Some(2500.0));
        d.set(FieldName::BudgetUsd, FieldValue::Text("12.5".into()));
        assert_eq!(d.budget_usd, Some(12.5));
        d.set(FieldName::BudgetUsd, FieldValue::Text("1.2.3".into()));
        assert!(d.budget_usd.unwrap().is_nan());
        d.set(FieldName::BudgetUsd, FieldValue::Text(String::new()));
        assert_eq!(d.budget_usd, None);
    }

    #[test]
    fn toggle_service_adds_then_removes() {
        let mut d = DraftRecord::default();
        d.services = d.toggle_service(ServiceTag::Branding);
        d.services = d.toggle_service(ServiceTag::UiUx);
        assert_eq!(d.services, vec!["Branding", "UI/UX"]);
        d.services = d.toggle_service(ServiceTag::Branding);
        assert_eq!(d.services, vec!["UI/UX"]);
        assert!(d.has_service(ServiceTag::UiUx));
    }

    #[test]
    fn normalized_record_wire_shape() {
        let rec = NormalizedRecord {
            full_name: "Jane Doe".into(),
            email: "jane@acme.com".into(),
            company_name: "Acme Inc".into(),
            services: vec![ServiceTag::UiUx, ServiceTag::MobileApp],
            budget_usd: None,
            project_start_date: NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
            accept_terms: true,
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            v,
            json!({
                "fullName": "Jane Doe",
                "email": "jane@acme.com",
                "companyName": "Acme Inc",
                "services": ["UI/UX", "Mobile App"],
                "projectStartDate": "2030-01-02",
                "acceptTerms": true
            })
        );
        let with_budget = NormalizedRecord {
            budget_usd: Some(5000),
            ..rec
        };
        assert_eq!(serde_json::to_value(&with_budget).unwrap()["budgetUsd"], json!(5000));
    }
}
