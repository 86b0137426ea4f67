//! Appointment record model and the fixed disposition vocabulary.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// -- Enums matching PostgreSQL --

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "appointment_disposition")]
pub enum Disposition {
    Sat,
    Rescheduled,
    #[sqlx(rename = "Not Interested")]
    #[serde(rename = "Not Interested")]
    NotInterested,
    Disqualified,
    #[sqlx(rename = "Follow-up")]
    #[serde(rename = "Follow-up")]
    FollowUp,
    Pending,
    #[sqlx(rename = "No Show")]
    #[serde(rename = "No Show")]
    NoShow,
    Closed,
}

impl Disposition {
    /// Every disposition, in display order.
    pub const ALL: [Disposition; 8] = [
        Self::Sat,
        Self::Rescheduled,
        Self::NotInterested,
        Self::Disqualified,
        Self::FollowUp,
        Self::Pending,
        Self::NoShow,
        Self::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sat => "Sat",
            Self::Rescheduled => "Rescheduled",
            Self::NotInterested => "Not Interested",
            Self::Disqualified => "Disqualified",
            Self::FollowUp => "Follow-up",
            Self::Pending => "Pending",
            Self::NoShow => "No Show",
            Self::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled appointment. Read-only as far as the dashboard is concerned.
///
/// `booked_for` is a business-local wall-clock timestamp; its calendar day is
/// what date filters and daily buckets compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AppointmentRecord {
    pub id: Uuid,
    pub company_id: String,
    pub name: String,
    pub closer_name: String,
    pub setter_name: Option<String>,
    pub booked_for: NaiveDateTime,
    #[sqlx(rename = "confirmation_disposition")]
    #[serde(rename = "confirmation_disposition")]
    pub disposition: Disposition,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub credit_score: Option<i32>,
    pub m1_commission: Option<f64>,
    pub m2_commission: Option<f64>,
    pub roof_type: Option<String>,
    pub existing_solar: Option<bool>,
    pub shading: Option<String>,
    pub appointment_type: Option<String>,
    pub confirmed: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl AppointmentRecord {
    /// Minimal record with every optional attribute unset.
    pub fn new(
        company_id: impl Into<String>,
        closer_name: impl Into<String>,
        setter_name: Option<&str>,
        booked_for: NaiveDateTime,
        disposition: Disposition,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id: company_id.into(),
            name: String::new(),
            closer_name: closer_name.into(),
            setter_name: setter_name.map(str::to_string),
            booked_for,
            disposition,
            phone_number: None,
            email: None,
            address: None,
            note: None,
            credit_score: None,
            m1_commission: None,
            m2_commission: None,
            roof_type: None,
            existing_solar: None,
            shading: None,
            appointment_type: None,
            confirmed: None,
            created_at: Utc::now(),
        }
    }

    /// Calendar day the appointment is booked for.
    pub fn booked_day(&self) -> NaiveDate {
        self.booked_for.date()
    }
}
