use crate::data::student::{NewStudent, Student};
use bitflags::bitflags;
use email_address::EmailAddress;
use serde::Deserialize;

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct StudentFormErrors: u8 {
        const EMPTY_NAME =        0b0000_0001;
        const MALFORMED_CPF =     0b0000_0010;
        const INVALID_EMAIL =     0b0000_0100;

        const UNPARSEABLE_GRADE = 0b0001_0000;
        const GRADE_TOO_LOW =     0b0010_0000;
        const GRADE_TOO_HIGH =    0b0100_0000;
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FormField {
    Name,
    Cpf,
    Email,
    Grade,
}

impl StudentFormErrors {
    pub const fn field(self) -> Option<FormField> {
        if self.intersects(Self::EMPTY_NAME) {
            Some(FormField::Name)
        } else if self.intersects(Self::MALFORMED_CPF) {
            Some(FormField::Cpf)
        } else if self.intersects(Self::INVALID_EMAIL) {
            Some(FormField::Email)
        } else if self.intersects(
            Self::UNPARSEABLE_GRADE
                .union(Self::GRADE_TOO_LOW)
                .union(Self::GRADE_TOO_HIGH),
        ) {
            Some(FormField::Grade)
        } else {
            None
        }
    }

    pub fn as_nice_list(&self) -> impl Iterator<Item = &'static str> {
        self.iter().filter_map(|x| match x {
            Self::EMPTY_NAME => Some("Name is required"),
            Self::MALFORMED_CPF => Some("CPF must contain exactly 11 digits"),
            Self::INVALID_EMAIL => Some("Invalid email"),
            Self::UNPARSEABLE_GRADE => Some("Invalid grade"),
            Self::GRADE_TOO_LOW => Some("Minimum grade is 0"),
            Self::GRADE_TOO_HIGH => Some("Maximum grade is 10"),
            _ => None,
        })
    }

    /// The message to show next to `field`, if it failed.
    pub fn message_for(self, field: FormField) -> Option<&'static str> {
        self.iter()
            .filter(|flag| flag.field() == Some(field))
            .find_map(|flag| flag.as_nice_list().next())
    }
}

/// Raw form input, as typed. The create form has no email input so it defaults to empty.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct StudentForm {
    pub name: String,
    pub cpf: String,
    #[serde(default)]
    pub email: String,
    pub grade: String,
}

/// What the edit form showed when it was opened. Changes are worked out against this, not
/// against whatever the service holds by the time the form comes back.
#[derive(Debug, Clone, PartialEq)]
pub struct EditBaseline {
    pub id: String,
    pub name: String,
    pub cpf: String,
    pub email: Option<String>,
    pub grade: f64,
}

impl From<&Student> for EditBaseline {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            cpf: student.cpf.clone(),
            email: student.email.clone(),
            grade: student.grade,
        }
    }
}

/// The fields of an edit that actually differ from the original, one service call each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentEdit {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub grade: Option<f64>,
}

impl StudentEdit {
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.cpf.is_none() && self.email.is_none() && self.grade.is_none()
    }

    ///the service takes grades as a two-decimal string
    pub fn grade_for_service(&self) -> Option<String> {
        self.grade.map(|grade| format!("{grade:.2}"))
    }
}

pub fn validate_name(raw: &str) -> Result<String, StudentFormErrors> {
    let name = raw.trim();
    if name.is_empty() {
        Err(StudentFormErrors::EMPTY_NAME)
    } else {
        Ok(name.to_string())
    }
}

///strips dots, dashes, spaces & co. before insisting on 11 digits
pub fn normalise_cpf(raw: &str) -> Result<String, StudentFormErrors> {
    let cpf: String = raw
        .chars()
        .filter(|c| !(c.is_ascii_punctuation() || c.is_whitespace()))
        .collect();

    if cpf.len() == 11 && cpf.chars().all(|c| c.is_ascii_digit()) {
        Ok(cpf)
    } else {
        Err(StudentFormErrors::MALFORMED_CPF)
    }
}

pub fn validate_email(raw: &str) -> Result<String, StudentFormErrors> {
    let email = raw.trim();
    if EmailAddress::is_valid(email) {
        Ok(email.to_string())
    } else {
        Err(StudentFormErrors::INVALID_EMAIL)
    }
}

/// Accepts `7,5` as well as `7.5`. Anything that isn't a finite number is a different error to
/// one that is out of `[0, 10]`.
pub fn parse_grade(raw: &str) -> Result<f64, StudentFormErrors> {
    let grade = raw
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|grade| grade.is_finite())
        .ok_or(StudentFormErrors::UNPARSEABLE_GRADE)?;

    if grade < 0.0 {
        Err(StudentFormErrors::GRADE_TOO_LOW)
    } else if grade > 10.0 {
        Err(StudentFormErrors::GRADE_TOO_HIGH)
    } else {
        Ok(grade)
    }
}

fn collect<T>(result: Result<T, StudentFormErrors>, errors: &mut StudentFormErrors) -> Option<T> {
    result.map_err(|e| errors.insert(e)).ok()
}

pub fn validate_new_student(form: &StudentForm) -> Result<NewStudent, StudentFormErrors> {
    let mut errors = StudentFormErrors::empty();

    let name = collect(validate_name(&form.name), &mut errors);
    let cpf = collect(normalise_cpf(&form.cpf), &mut errors);
    let grade = collect(parse_grade(&form.grade), &mut errors);

    match (name, cpf, grade) {
        (Some(name), Some(cpf), Some(grade)) => Ok(NewStudent { name, cpf, grade }),
        _ => Err(errors),
    }
}

/// Validates the whole merged record, then keeps only what differs from `original`.
///
/// An empty email is fine as long as the student never had one.
#[allow(clippy::float_cmp)]
pub fn validate_student_edit(
    original: &EditBaseline,
    form: &StudentForm,
) -> Result<StudentEdit, StudentFormErrors> {
    let mut errors = StudentFormErrors::empty();

    let name = collect(validate_name(&form.name), &mut errors);
    let cpf = collect(normalise_cpf(&form.cpf), &mut errors);
    let grade = collect(parse_grade(&form.grade), &mut errors);
    let email = if form.email.trim().is_empty() && original.email.is_none() {
        Some(None)
    } else {
        collect(validate_email(&form.email), &mut errors).map(Some)
    };

    let (Some(name), Some(cpf), Some(grade), Some(email)) = (name, cpf, grade, email) else {
        return Err(errors);
    };

    Ok(StudentEdit {
        name: (name != original.name).then_some(name),
        cpf: (cpf != original.cpf).then_some(cpf),
        email: email.filter(|email| original.email.as_deref() != Some(email.as_str())),
        grade: (grade != original.grade).then_some(grade),
    })
}
