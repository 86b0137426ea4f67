//! Filter request (what the caller asked for) and canonical filter (what the
//! pipeline actually applies).

use std::hash::{Hash, Hasher};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive calendar-day range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range from two bounds in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// Monday through Sunday of the week containing `day`.
    pub fn week_of(day: NaiveDate) -> Self {
        let start = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn num_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Every day in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.num_days())
    }
}

/// Ordered list of names with set semantics: equality and hashing ignore
/// order, iteration keeps the caller's order minus duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameSet(Vec<String>);

impl NameSet {
    /// Drops blank entries and repeated names, keeping first occurrences.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if name.trim().is_empty() || out.iter().any(|n| n == name) {
                continue;
            }
            out.push(name.to_string());
        }
        Self(out)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// An empty set admits everything; otherwise the name must be present.
    pub fn admits(&self, name: Option<&str>) -> bool {
        self.is_empty() || name.is_some_and(|n| self.contains(n))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Names in ascending order, for order-insensitive comparisons.
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PartialEq for NameSet {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for NameSet {}

impl Hash for NameSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

/// Which companies a query may see.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "companyId", rename_all = "snake_case")]
pub enum CompanyScope {
    /// All companies. Only ever produced for privileged callers.
    Unrestricted,
    Company(String),
}

impl CompanyScope {
    pub fn admits(&self, company_id: &str) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Company(id) => id == company_id,
        }
    }

    pub fn company_id(&self) -> Option<&str> {
        match self {
            Self::Unrestricted => None,
            Self::Company(id) => Some(id),
        }
    }
}

/// Raw date bounds as typed or picked by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestedRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Caller-supplied, partially specified filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub date_range: Option<RequestedRange>,
    pub selected_closers: Option<Vec<String>>,
    pub selected_setters: Option<Vec<String>>,
    pub selected_company: Option<String>,
}

impl FilterRequest {
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(RequestedRange {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        });
        self
    }

    pub fn with_closers<S: Into<String>>(mut self, closers: impl IntoIterator<Item = S>) -> Self {
        self.selected_closers = Some(closers.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_setters<S: Into<String>>(mut self, setters: impl IntoIterator<Item = S>) -> Self {
        self.selected_setters = Some(setters.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
        self.selected_company = Some(company_id.into());
        self
    }
}

/// Fully resolved, role-scoped, defaulted filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalFilter {
    pub date_range: DateRange,
    pub closers: NameSet,
    pub setters: NameSet,
    pub company: CompanyScope,
}

impl CanonicalFilter {
    /// Express this filter as an equivalent request.
    pub fn to_request(&self) -> FilterRequest {
        FilterRequest {
            date_range: Some(RequestedRange {
                start: Some(self.date_range.start.to_string()),
                end: Some(self.date_range.end.to_string()),
            }),
            selected_closers: Some(self.closers.as_slice().to_vec()),
            selected_setters: Some(self.setters.as_slice().to_vec()),
            selected_company: self.company.company_id().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn week_of_starts_on_monday() {
        // 2026-10-15 is a Thursday.
        let week = DateRange::week_of(day(2026, 10, 15));
        assert_eq!(week.start, day(2026, 10, 12));
        assert_eq!(week.end, day(2026, 10, 18));
        assert_eq!(week.num_days(), 7);
    }

    #[test]
    fn week_of_sunday_belongs_to_preceding_monday() {
        let week = DateRange::week_of(day(2026, 10, 18));
        assert_eq!(week.start, day(2026, 10, 12));
    }

    #[test]
    fn range_new_orders_bounds() {
        let range = DateRange::new(day(2026, 3, 9), day(2026, 3, 2));
        assert_eq!(range.start, day(2026, 3, 2));
        assert_eq!(range.end, day(2026, 3, 9));
        assert_eq!(range.days().count(), 8);
    }

    #[test]
    fn name_set_drops_blanks_and_duplicates() {
        let set = NameSet::from_names(["Mike", "", "Emma", "Mike", "  "]);
        assert_eq!(set.as_slice(), &["Mike".to_string(), "Emma".to_string()]);
    }

    #[test]
    fn name_set_equality_ignores_order() {
        let a = NameSet::from_names(["Mike", "Emma"]);
        let b = NameSet::from_names(["Emma", "Mike"]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn empty_name_set_admits_missing_names() {
        assert!(NameSet::default().admits(None));
        assert!(!NameSet::from_names(["Lisa"]).admits(None));
        assert!(NameSet::from_names(["Lisa"]).admits(Some("Lisa")));
    }

    #[test]
    fn company_scope_admits() {
        assert!(CompanyScope::Unrestricted.admits("anything"));
        let scope = CompanyScope::Company("acme".to_string());
        assert!(scope.admits("acme"));
        assert!(!scope.admits("globex"));
    }

    #[test]
    fn filter_request_deserializes_camel_case() {
        let request: FilterRequest = serde_json::from_str(
            r#"{"dateRange":{"start":"2026-10-12","end":"2026-10-18"},"selectedClosers":["Mike"]}"#,
        )
        .unwrap();
        assert_eq!(request.selected_closers, Some(vec!["Mike".to_string()]));
        assert!(request.selected_setters.is_none());
    }
}
