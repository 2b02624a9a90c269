//! Turns the full student list plus whatever the filter bar says into what the table shows.
//!
//! Nothing in here touches the network: the list always comes from a fresh `list()` call made
//! by the caller, and the view state comes from the table request's query string.

use crate::data::student::{GradeBand, Student};
use serde::Deserialize;
use std::cmp::Ordering;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Name,
    Email,
    Grade,
    CreatedAt,
}

impl SortField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Grade => "grade",
            Self::CreatedAt => "createdAt",
        }
    }

    fn compare(self, a: &Student, b: &Student) -> Ordering {
        match self {
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::Email => a
                .email_or_empty()
                .to_lowercase()
                .cmp(&b.email_or_empty().to_lowercase()),
            Self::Grade => a.grade.partial_cmp(&b.grade).unwrap_or(Ordering::Equal),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search: String,
    pub grade_filter: Option<f64>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl ViewState {
    /// The state after clicking the `field` column header: same column flips, new column starts ascending.
    #[must_use]
    pub fn sorted_by(&self, field: SortField) -> Self {
        let sort_order = if self.sort_field == field {
            self.sort_order.flipped()
        } else {
            SortOrder::Asc
        };

        Self {
            sort_field: field,
            sort_order,
            ..self.clone()
        }
    }

    #[allow(clippy::float_cmp)]
    pub fn matches(&self, student: &Student) -> bool {
        self.matches_search(student) && self.grade_filter.is_none_or(|grade| student.grade == grade)
    }

    fn matches_search(&self, student: &Student) -> bool {
        let search = self.search.trim();
        if search.is_empty() {
            return true;
        }

        let search = search.to_lowercase();
        if student.name.to_lowercase().contains(&search)
            || student.email_or_empty().to_lowercase().contains(&search)
        {
            return true;
        }

        cpf_fragment(&search).is_some_and(|digits| student.cpf.contains(&digits))
    }
}

///`Some(digits)` if the search looks like (part of) a CPF, eg. `123.45`
fn cpf_fragment(search: &str) -> Option<String> {
    let looks_like_cpf = search
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_punctuation() || c.is_whitespace());
    if !looks_like_cpf {
        return None;
    }

    let digits: String = search.chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then_some(digits)
}

/// Counts over the whole collection, never the filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradeStats {
    pub total: usize,
    pub excellent: usize,
    pub good: usize,
    pub average: usize,
    pub poor: usize,
    pub mean: f64,
}

impl GradeStats {
    #[allow(clippy::cast_precision_loss)]
    pub fn from_students(students: &[Student]) -> Self {
        let mut stats = Self {
            total: students.len(),
            ..Self::default()
        };

        let mut sum = 0.0;
        for student in students {
            sum += student.grade;
            match student.band() {
                GradeBand::Excellent => stats.excellent += 1,
                GradeBand::Good => stats.good += 1,
                GradeBand::Average => stats.average += 1,
                GradeBand::Poor => stats.poor += 1,
            }
        }

        if !students.is_empty() {
            stats.mean = sum / students.len() as f64;
        }
        stats
    }

    pub const fn count(&self, band: GradeBand) -> usize {
        match band {
            GradeBand::Excellent => self.excellent,
            GradeBand::Good => self.good,
            GradeBand::Average => self.average,
            GradeBand::Poor => self.poor,
        }
    }

    pub fn mean_for_display(&self) -> String {
        format!("{:.1}", self.mean)
    }
}

#[derive(Debug)]
pub struct CollectionView<'a> {
    pub display: Vec<&'a Student>,
    pub stats: GradeStats,
    ///every distinct grade, highest first. the "all grades" option isn't in here
    pub grade_options: Vec<f64>,
}

impl CollectionView<'_> {
    pub const fn is_collection_empty(&self) -> bool {
        self.stats.total == 0
    }
}

pub fn filter<'a>(
    students: impl IntoIterator<Item = &'a Student>,
    state: &ViewState,
) -> Vec<&'a Student> {
    students
        .into_iter()
        .filter(|student| state.matches(student))
        .collect()
}

///stable, so ties keep whatever order they came in
pub fn sort(display: &mut [&Student], field: SortField, order: SortOrder) {
    display.sort_by(|a, b| {
        let ordering = field.compare(a, b);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

pub fn grade_options(students: &[Student]) -> Vec<f64> {
    let mut grades: Vec<f64> = students.iter().map(|student| student.grade).collect();
    grades.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    grades.dedup();
    grades
}

pub fn derive<'a>(students: &'a [Student], state: &ViewState) -> CollectionView<'a> {
    let mut display = filter(students, state);
    sort(&mut display, state.sort_field, state.sort_order);

    CollectionView {
        display,
        stats: GradeStats::from_students(students),
        grade_options: grade_options(students),
    }
}
