//! Tagged field values and schema-driven validation.
//!
//! # Responsibility
//! - Enumerate the closed set of semantic field types.
//! - Validate raw human-written field input into typed values.
//!
//! # Invariants
//! - Every semantic type is an explicit variant; there is no open-ended
//!   dictionary access.
//! - Validation failures carry the field name and a reason.

use crate::temporal::{self, When};
use chrono::{Duration, NaiveDateTime};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A numeric estimate: a point, an inclusive range, or a mean with spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    Point(f64),
    Range(f64, f64),
    Spread { mean: f64, std: f64 },
}

impl Estimate {
    /// Parses estimate input: `N`, `LO-HI`, or `MEAN~STD`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let input = raw.trim();
        if let Some((mean, std)) = input.split_once('~') {
            let mean = parse_number(mean)
                .ok_or_else(|| format!("`{raw}` has a non-numeric mean"))?;
            let std = parse_number(std)
                .ok_or_else(|| format!("`{raw}` has a non-numeric spread"))?;
            return Ok(Self::Spread { mean, std });
        }
        if let Some((lo, hi)) = input.split_once('-') {
            if let (Some(lo), Some(hi)) = (parse_number(lo), parse_number(hi)) {
                if lo > hi {
                    return Err(format!("range `{raw}` has its bounds reversed"));
                }
                return Ok(Self::Range(lo, hi));
            }
        }
        parse_number(input)
            .map(Self::Point)
            .ok_or_else(|| format!("`{raw}` is not a number, range, or mean~spread"))
    }
}

fn parse_number(input: &str) -> Option<f64> {
    let value: f64 = input.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// One typed field value, validated against its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(When),
    Duration(Duration),
    Estimate(Estimate),
    Choice(String),
}

/// Semantic type of a schema field, driving validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Duration,
    Estimate,
    Choice(Vec<String>),
}

impl FieldKind {
    /// Validates raw input into a typed value.
    ///
    /// Date fields go through the temporal parser anchored at `reference`
    /// (a note's creation instant), so relative expressions stay stable
    /// across rescans.
    pub fn validate(
        &self,
        field: &str,
        raw: &str,
        reference: NaiveDateTime,
    ) -> Result<FieldValue, FieldValidationError> {
        let invalid = |reason: String| FieldValidationError {
            field: field.to_string(),
            reason,
        };
        match self {
            Self::Text => Ok(FieldValue::Text(raw.trim().to_string())),
            Self::Date => temporal::parse(raw, reference)
                .map(FieldValue::Date)
                .map_err(|err| invalid(err.to_string())),
            Self::Duration => temporal::parse_duration(raw)
                .map(FieldValue::Duration)
                .map_err(|err| invalid(err.to_string())),
            Self::Estimate => Estimate::parse(raw)
                .map(FieldValue::Estimate)
                .map_err(invalid),
            Self::Choice(allowed) => {
                let value = raw.trim().to_ascii_lowercase();
                if allowed.iter().any(|choice| choice.eq_ignore_ascii_case(&value)) {
                    Ok(FieldValue::Choice(value))
                } else {
                    Err(invalid(format!(
                        "`{raw}` is not one of [{}]",
                        allowed.join(", ")
                    )))
                }
            }
        }
    }
}

/// A single field value rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationError {
    pub field: String,
    pub reason: String,
}

impl Display for FieldValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid value for field `{}`: {}", self.field, self.reason)
    }
}

impl Error for FieldValidationError {}
