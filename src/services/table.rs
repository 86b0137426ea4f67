//! Ordering for the appointment table.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::appointment::AppointmentRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    CloserName,
    SetterName,
    #[default]
    BookedFor,
    Disposition,
    CreditScore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(Self::Name),
            "closer_name" => Some(Self::CloserName),
            "setter_name" => Some(Self::SetterName),
            "booked_for" => Some(Self::BookedFor),
            "confirmation_disposition" | "disposition" => Some(Self::Disposition),
            "credit_score" => Some(Self::CreditScore),
            _ => None,
        }
    }
}

/// Stable sort; equal keys keep their relative order. Missing values sort
/// before present ones in ascending order.
pub fn sort_appointments(rows: &mut [AppointmentRecord], field: SortField, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = compare(a, b, field);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn compare(a: &AppointmentRecord, b: &AppointmentRecord, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::CloserName => a.closer_name.cmp(&b.closer_name),
        SortField::SetterName => a.setter_name.cmp(&b.setter_name),
        SortField::BookedFor => a.booked_for.cmp(&b.booked_for),
        SortField::Disposition => a.disposition.as_str().cmp(b.disposition.as_str()),
        SortField::CreditScore => a.credit_score.cmp(&b.credit_score),
    }
}
