use jiff::Timestamp;
use maud::Render;
use serde::{Deserialize, Serialize};

/// A student as the student service hands it back.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub cpf: String,
    #[serde(default)]
    pub email: Option<String>,
    pub grade: f64,
    #[serde(default)]
    pub first_letter_that_dont_repeat: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of the create call. Email is deliberately absent, it can only be set afterwards.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub cpf: String,
    pub grade: f64,
}

impl Student {
    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn band(&self) -> GradeBand {
        GradeBand::from_grade(self.grade)
    }

    ///up to two upper-cased letters, one from each of the first words of the name
    pub fn initials(&self) -> String {
        self.name
            .split(' ')
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }

    pub fn formatted_cpf(&self) -> String {
        format_cpf(&self.cpf)
    }
}

impl Render for Student {
    fn render_to(&self, buffer: &mut String) {
        self.name.render_to(buffer);
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GradeBand {
    Excellent,
    Good,
    Average,
    Poor,
}

impl GradeBand {
    pub const ALL: [Self; 4] = [Self::Excellent, Self::Good, Self::Average, Self::Poor];

    pub fn from_grade(grade: f64) -> Self {
        if grade >= 9.0 {
            Self::Excellent
        } else if grade >= 7.0 {
            Self::Good
        } else if grade >= 5.0 {
            Self::Average
        } else {
            Self::Poor
        }
    }

    pub const fn status(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Fair",
            Self::Poor => "Needs improvement",
        }
    }

    pub const fn range_label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent (9+)",
            Self::Good => "Good (7-8.9)",
            Self::Average => "Fair (5-6.9)",
            Self::Poor => "Needs improvement (<5)",
        }
    }

    pub const fn badge_classes(self) -> &'static str {
        match self {
            Self::Excellent => "bg-green-600 text-white",
            Self::Good => "bg-blue-600 text-white",
            Self::Average => "bg-yellow-500 text-gray-900",
            Self::Poor => "bg-red-600 text-white",
        }
    }

    pub const fn bar_classes(self) -> &'static str {
        match self {
            Self::Excellent => "bg-green-500",
            Self::Good => "bg-blue-500",
            Self::Average => "bg-yellow-400",
            Self::Poor => "bg-red-500",
        }
    }
}

/// Groups the digits of a CPF as `###.###.###-##`, as far as there are digits to group.
pub fn format_cpf(raw: &str) -> String {
    let mut output = String::with_capacity(14);
    for (i, digit) in raw.chars().filter(char::is_ascii_digit).take(11).enumerate() {
        match i {
            3 | 6 => output.push('.'),
            9 => output.push('-'),
            _ => {}
        }
        output.push(digit);
    }
    output
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn student(id: &str, name: &str, grade: f64) -> Student {
        Student {
            id: id.to_string(),
            name: name.to_string(),
            cpf: "12345678901".to_string(),
            email: Some(format!("{}@example.org", name.to_lowercase())),
            grade,
            first_letter_that_dont_repeat: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn cpf_is_grouped() {
        assert_eq!(format_cpf("12345678901"), "123.456.789-01");
        assert_eq!(format_cpf("1234"), "123.4");
        assert_eq!(format_cpf("123.456.789-01"), "123.456.789-01");
        assert_eq!(format_cpf(""), "");
    }

    #[test]
    fn band_edges() {
        assert_eq!(GradeBand::from_grade(9.0), GradeBand::Excellent);
        assert_eq!(GradeBand::from_grade(8.99), GradeBand::Good);
        assert_eq!(GradeBand::from_grade(7.0), GradeBand::Good);
        assert_eq!(GradeBand::from_grade(6.9), GradeBand::Average);
        assert_eq!(GradeBand::from_grade(5.0), GradeBand::Average);
        assert_eq!(GradeBand::from_grade(4.99), GradeBand::Poor);
        assert_eq!(GradeBand::from_grade(0.0), GradeBand::Poor);
    }

    #[test]
    fn initials_use_first_two_words() {
        assert_eq!(student("1", "ana maria souza", 5.0).initials(), "AM");
        assert_eq!(student("1", "Bob", 5.0).initials(), "B");
        assert_eq!(student("1", "  Carla  Dias", 5.0).initials(), "CD");
    }

    #[test]
    fn deserialises_service_json() {
        let json = r#"{
            "id": "ckx1",
            "name": "Ana",
            "cpf": "12345678901",
            "email": "ana@example.org",
            "grade": 9.5,
            "firstLetterThatDontRepeat": "n",
            "createdAt": "2024-03-01T12:00:00.000Z",
            "updatedAt": "2024-03-02T08:30:00Z"
        }"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.first_letter_that_dont_repeat.as_deref(), Some("n"));
        assert_eq!(student.email.as_deref(), Some("ana@example.org"));
        assert!(student.created_at < student.updated_at);
    }

    #[test]
    fn email_may_be_missing() {
        let json = r#"{"id":"x","name":"Bob","cpf":"1","grade":6,"createdAt":"2024-03-01T12:00:00Z","updatedAt":"2024-03-01T12:00:00Z"}"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.email, None);
        assert_eq!(student.email_or_empty(), "");
    }
}
