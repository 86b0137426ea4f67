//! Closer and setter option lists for the filter dropdowns.

use std::collections::BTreeSet;

use crate::models::appointment::AppointmentRecord;
use crate::models::metrics::Roster;

/// Distinct, sorted names. Records without a setter contribute no setter.
pub fn build_roster<'a, I>(records: I) -> Roster
where
    I: IntoIterator<Item = &'a AppointmentRecord>,
{
    let mut closers = BTreeSet::new();
    let mut setters = BTreeSet::new();
    for record in records {
        if !record.closer_name.trim().is_empty() {
            closers.insert(record.closer_name.clone());
        }
        if let Some(setter) = record.setter_name.as_deref().filter(|s| !s.trim().is_empty()) {
            setters.insert(setter.to_string());
        }
    }
    Roster {
        closers: closers.into_iter().collect(),
        setters: setters.into_iter().collect(),
    }
}

/// Sort and deduplicate an already fetched roster.
pub fn tidy(roster: Roster) -> Roster {
    fn clean(names: Vec<String>) -> Vec<String> {
        names
            .into_iter()
            .filter(|n| !n.trim().is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
    Roster {
        closers: clean(roster.closers),
        setters: clean(roster.setters),
    }
}
