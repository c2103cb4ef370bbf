use crate::model::{DraftRecord, FieldErrors, FieldName, NormalizedRecord, ServiceTag};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 80;
pub const COMPANY_MIN: usize = 2;
pub const COMPANY_MAX: usize = 100;
pub const BUDGET_MIN: u32 = 100;
pub const BUDGET_MAX: u32 = 1_000_000;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z\s'-]+$").expect("name pattern"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$",
        )
        .expect("email pattern")
    })
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern"))
}

/// Checks a draft against the onboarding schema.
///
/// Every rule runs, so the error map carries one entry for each failing field.
/// `today` is the reference day for the start-date rule; the function reads no clock.
pub fn validate(draft: &DraftRecord, today: NaiveDate) -> Result<NormalizedRecord, FieldErrors> {
    let mut errors = FieldErrors::new();

    let full_name = check_full_name(&draft.full_name, &mut errors);
    let email = check_email(&draft.email, &mut errors);
    let company_name = check_company_name(&draft.company_name, &mut errors);
    let services = check_services(&draft.services, &mut errors);
    let budget_usd = check_budget(draft.budget_usd, &mut errors);
    let project_start_date = check_start_date(&draft.project_start_date, today, &mut errors);
    if !draft.accept_terms {
        errors.insert(
            FieldName::AcceptTerms,
            "You must accept the terms and conditions",
        );
    }

    match (
        full_name,
        email,
        company_name,
        services,
        budget_usd,
        project_start_date,
    ) {
        (
            Some(full_name),
            Some(email),
            Some(company_name),
            Some(services),
            Some(budget_usd),
            Some(project_start_date),
        ) if errors.is_empty() => Ok(NormalizedRecord {
            full_name,
            email,
            company_name,
            services,
            budget_usd,
            project_start_date,
            accept_terms: true,
        }),
        _ => Err(errors),
    }
}

fn check_full_name(raw: &str, errors: &mut FieldErrors) -> Option<String> {
    let name = raw.trim();
    let len = name.chars().count();
    let mut ok = true;
    if len < NAME_MIN {
        errors.insert(
            FieldName::FullName,
            format!("Full name must be at least {NAME_MIN} characters"),
        );
        ok = false;
    } else if len > NAME_MAX {
        errors.insert(
            FieldName::FullName,
            format!("Full name must be no more than {NAME_MAX} characters"),
        );
        ok = false;
    }
    if !name.is_empty() && !name_re().is_match(name) {
        errors.insert(
            FieldName::FullName,
            "Full name can only contain letters, spaces, hyphens, and apostrophes",
        );
        ok = false;
    }
    ok.then(|| name.to_string())
}

fn check_email(raw: &str, errors: &mut FieldErrors) -> Option<String> {
    let email = raw.trim();
    if email.chars().any(char::is_control) || !email_re().is_match(email) {
        errors.insert(FieldName::Email, "Please enter a valid email address");
        return None;
    }
    Some(email.to_string())
}

fn check_company_name(raw: &str, errors: &mut FieldErrors) -> Option<String> {
    let company = raw.trim();
    let len = company.chars().count();
    if len < COMPANY_MIN {
        errors.insert(
            FieldName::CompanyName,
            format!("Company name must be at least {COMPANY_MIN} characters"),
        );
        return None;
    }
    if len > COMPANY_MAX {
        errors.insert(
            FieldName::CompanyName,
            format!("Company name must be no more than {COMPANY_MAX} characters"),
        );
        return None;
    }
    Some(company.to_string())
}

fn check_services(raw: &[String], errors: &mut FieldErrors) -> Option<Vec<ServiceTag>> {
    if raw.is_empty() {
        errors.insert(FieldName::Services, "Please select at least one service");
        return None;
    }
    let mut out: Vec<ServiceTag> = Vec::with_capacity(raw.len());
    for s in raw {
        match s.parse::<ServiceTag>() {
            Ok(tag) => {
                if !out.contains(&tag) {
                    out.push(tag);
                }
            }
            Err(_) => {
                errors.insert(FieldName::Services, format!("Unknown service: {s}"));
                return None;
            }
        }
    }
    Some(out)
}

// Outer None means the field failed; Some(None) means no budget was given.
fn check_budget(raw: Option<f64>, errors: &mut FieldErrors) -> Option<Option<u32>> {
    let Some(v) = raw else {
        return Some(None);
    };
    let msg = if !v.is_finite() {
        "Budget must be a number".to_string()
    } else if v.fract() != 0.0 {
        "Budget must be a whole number".to_string()
    } else if v < f64::from(BUDGET_MIN) {
        format!("Budget must be at least ${BUDGET_MIN}")
    } else if v > f64::from(BUDGET_MAX) {
        "Budget cannot exceed $1,000,000".to_string()
    } else {
        return Some(Some(v as u32));
    };
    errors.insert(FieldName::BudgetUsd, msg);
    None
}

fn check_start_date(raw: &str, today: NaiveDate, errors: &mut FieldErrors) -> Option<NaiveDate> {
    let s = raw.trim();
    let parsed = if date_re().is_match(s) {
        NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
    } else {
        None
    };
    match parsed {
        None => {
            errors.insert(
                FieldName::ProjectStartDate,
                "Please enter a valid date (YYYY-MM-DD)",
            );
            None
        }
        Some(d) if d < today => {
            errors.insert(
                FieldName::ProjectStartDate,
                "Project start date must be today or later",
            );
            None
        }
        Some(d) => Some(d),
    }
}
