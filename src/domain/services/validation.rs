use chrono::{NaiveDate, NaiveTime};
use crate::error::AppError;

pub fn require_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))
}

/// Accepts `H:MM` or `HH:MM` and returns the canonical `HH:MM` form so stored times sort
/// lexicographically.
pub fn normalize_time(raw: &str) -> Result<String, AppError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))
}

pub fn check_duration(minutes: i32) -> Result<i32, AppError> {
    if minutes <= 0 {
        return Err(AppError::Validation("Duration must be a positive number of minutes".into()));
    }
    Ok(minutes)
}

pub fn check_price(price: f64) -> Result<f64, AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation("Price must be a non-negative amount".into()));
    }
    Ok(price)
}

pub fn check_capacity(max_bookings: i32) -> Result<i32, AppError> {
    if max_bookings <= 0 {
        return Err(AppError::Validation("Max bookings must be at least 1".into()));
    }
    Ok(max_bookings)
}

/// Blank clears the link.
pub fn normalize_meeting_url(raw: Option<String>) -> Result<Option<String>, AppError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) if url.starts_with("https://") || url.starts_with("http://") => Ok(Some(url.to_string())),
        Some(_) => Err(AppError::Validation("Meeting URL must be an http(s) link".into())),
    }
}

pub fn check_email(raw: &str) -> Result<String, AppError> {
    let email = require_text("Email", raw)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::Validation("Invalid email address".into())),
    }
}

pub fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    skills.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
