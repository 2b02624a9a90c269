use crate::{
    data::{
        StudentGateway,
        student::{NewStudent, Student},
    },
    error::TweedError,
    validation::{
        EditBaseline, StudentEdit, StudentForm, StudentFormErrors, validate_new_student,
        validate_student_edit,
    },
};

/// Every submit goes `idle -> submitting -> idle`; this is how it got back to idle.
#[derive(Debug)]
pub enum SubmitOutcome<T> {
    ///the service took it, the list needs re-fetching
    Done(T),
    ///never left the form, nothing was sent
    Invalid(StudentFormErrors),
    Failed {
        error: TweedError,
        ///some of an edit's calls went through before/while another failed
        partially_applied: bool,
    },
}

impl<T> SubmitOutcome<T> {
    const fn failed(error: TweedError) -> Self {
        Self::Failed {
            error,
            partially_applied: false,
        }
    }

    pub const fn needs_refresh(&self) -> bool {
        matches!(
            self,
            Self::Done(_)
                | Self::Failed {
                    partially_applied: true,
                    ..
                }
        )
    }
}

pub async fn submit_new_student(
    gateway: &impl StudentGateway,
    form: &StudentForm,
) -> SubmitOutcome<Student> {
    let to_be_added: NewStudent = match validate_new_student(form) {
        Ok(x) => x,
        Err(errors) => return SubmitOutcome::Invalid(errors),
    };

    match gateway.create(&to_be_added).await {
        Ok(student) => {
            info!(id = ?student.id, "Registered student");
            SubmitOutcome::Done(student)
        }
        Err(error) => {
            error!(?error, "Unable to register student");
            SubmitOutcome::failed(error)
        }
    }
}

/// Sends one request per field that differs from what the form was opened with, all at once.
/// There is no rollback: if one fails, the others stay applied and only the first failure
/// (name, cpf, grade, email) is reported.
pub async fn submit_student_edit(
    gateway: &impl StudentGateway,
    original: &EditBaseline,
    form: &StudentForm,
) -> SubmitOutcome<StudentEdit> {
    let edit = match validate_student_edit(original, form) {
        Ok(x) => x,
        Err(errors) => return SubmitOutcome::Invalid(errors),
    };
    if edit.is_empty() {
        debug!(id = ?original.id, "Edit submitted with nothing changed");
        return SubmitOutcome::Done(edit);
    }

    let id = original.id.as_str();
    let grade = edit.grade_for_service();
    let (name, cpf, grade, email) = tokio::join!(
        async {
            match &edit.name {
                Some(name) => Some(gateway.change_name(id, name).await),
                None => None,
            }
        },
        async {
            match &edit.cpf {
                Some(cpf) => Some(gateway.change_cpf(id, cpf).await),
                None => None,
            }
        },
        async {
            match &grade {
                Some(grade) => Some(gateway.change_grade(id, grade).await),
                None => None,
            }
        },
        async {
            match &edit.email {
                Some(email) => Some(gateway.change_email(id, email).await),
                None => None,
            }
        },
    );

    let mut applied = 0_usize;
    let mut first_error = None;
    for result in [name, cpf, grade, email].into_iter().flatten() {
        match result {
            Ok(_) => applied += 1,
            Err(e) => {
                error!(?e, ?id, "Unable to apply student change");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        None => {
            info!(?id, applied, "Edited student");
            SubmitOutcome::Done(edit)
        }
        Some(error) => {
            if applied > 0 {
                warn!(?id, applied, "Student edit only partially applied");
            }
            SubmitOutcome::Failed {
                error,
                partially_applied: applied > 0,
            }
        }
    }
}

pub async fn submit_deactivation(gateway: &impl StudentGateway, id: &str) -> SubmitOutcome<()> {
    match gateway.deactivate(id).await {
        Ok(()) => {
            info!(?id, "Deactivated student");
            SubmitOutcome::Done(())
        }
        Err(error) => {
            error!(?error, "Unable to deactivate student");
            SubmitOutcome::failed(error)
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::{data::student::tests::student, error::TweedResult};
    use std::sync::Mutex;

    /// Keeps students in memory and writes down every call it gets.
    #[derive(Default)]
    pub struct RecordingGateway {
        pub students: Mutex<Vec<Student>>,
        pub calls: Mutex<Vec<String>>,
        pub fail_on: Option<&'static str>,
    }

    impl RecordingGateway {
        pub fn with(students: Vec<Student>) -> Self {
            Self {
                students: Mutex::new(students),
                ..Self::default()
            }
        }

        fn record(&self, call: String, id: &str) -> TweedResult<()> {
            let failed = self.fail_on.is_some_and(|f| call.starts_with(f));
            self.calls.lock().unwrap().push(call);
            if failed {
                Err(TweedError::MissingStudent { id: id.to_string() })
            } else {
                Ok(())
            }
        }

        fn update(&self, id: &str, f: impl FnOnce(&mut Student)) -> TweedResult<Student> {
            let mut students = self.students.lock().unwrap();
            let student = students
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| TweedError::MissingStudent { id: id.to_string() })?;
            f(student);
            Ok(student.clone())
        }

        pub fn sorted_calls(&self) -> Vec<String> {
            let mut calls = self.calls.lock().unwrap().clone();
            calls.sort();
            calls
        }
    }

    impl StudentGateway for RecordingGateway {
        async fn list(&self) -> TweedResult<Vec<Student>> {
            self.record("list".to_string(), "")?;
            Ok(self.students.lock().unwrap().clone())
        }

        async fn get_by_id(&self, id: &str) -> TweedResult<Student> {
            self.record(format!("get {id}"), id)?;
            self.update(id, |_| {})
        }

        async fn create(&self, to_be_added: &NewStudent) -> TweedResult<Student> {
            self.record(format!("create {}", to_be_added.cpf), "")?;
            let mut created = student("new", &to_be_added.name, to_be_added.grade);
            created.cpf.clone_from(&to_be_added.cpf);
            created.email = None;
            self.students.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn change_name(&self, id: &str, name: &str) -> TweedResult<Student> {
            self.record(format!("change_name {id} {name}"), id)?;
            self.update(id, |s| s.name = name.to_string())
        }

        async fn change_cpf(&self, id: &str, cpf: &str) -> TweedResult<Student> {
            self.record(format!("change_cpf {id} {cpf}"), id)?;
            self.update(id, |s| s.cpf = cpf.to_string())
        }

        async fn change_email(&self, id: &str, email: &str) -> TweedResult<Student> {
            self.record(format!("change_email {id} {email}"), id)?;
            self.update(id, |s| s.email = Some(email.to_string()))
        }

        async fn change_grade(&self, id: &str, grade: &str) -> TweedResult<Student> {
            self.record(format!("change_grade {id} {grade}"), id)?;
            let grade: f64 = grade.parse().unwrap();
            self.update(id, |s| s.grade = grade)
        }

        async fn deactivate(&self, id: &str) -> TweedResult<()> {
            self.record(format!("deactivate {id}"), id)?;
            self.students.lock().unwrap().retain(|s| s.id != id);
            Ok(())
        }
    }

    fn form(name: &str, cpf: &str, email: &str, grade: &str) -> StudentForm {
        StudentForm {
            name: name.to_string(),
            cpf: cpf.to_string(),
            email: email.to_string(),
            grade: grade.to_string(),
        }
    }

    #[tokio::test]
    async fn valid_create_reaches_the_service() {
        let gateway = RecordingGateway::default();
        let outcome =
            submit_new_student(&gateway, &form("Ana", "12345678901", "", "9.5")).await;

        assert!(matches!(&outcome, SubmitOutcome::Done(s) if s.cpf == "12345678901"));
        assert!(outcome.needs_refresh());
        assert_eq!(gateway.sorted_calls(), ["create 12345678901"]);
    }

    #[tokio::test]
    async fn short_cpf_never_reaches_the_service() {
        let gateway = RecordingGateway::default();
        let outcome = submit_new_student(&gateway, &form("Ana", "1234567890", "", "9.5")).await;

        assert!(matches!(
            outcome,
            SubmitOutcome::Invalid(errors) if errors == StudentFormErrors::MALFORMED_CPF
        ));
        assert!(gateway.sorted_calls().is_empty());
    }

    #[tokio::test]
    async fn failed_create_is_reported_without_refresh() {
        let gateway = RecordingGateway {
            fail_on: Some("create"),
            ..RecordingGateway::default()
        };
        let outcome = submit_new_student(&gateway, &form("Ana", "12345678901", "", "5")).await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed {
                partially_applied: false,
                ..
            }
        ));
        assert!(!outcome.needs_refresh());
    }

    #[tokio::test]
    async fn unchanged_edit_makes_no_calls() {
        let original = student("s1", "Ana", 9.5);
        let gateway = RecordingGateway::with(vec![original.clone()]);
        let original = EditBaseline::from(&original);
        let outcome = submit_student_edit(
            &gateway,
            &original,
            &form(" Ana ", "123.456.789-01", "ana@example.org", "9,5"),
        )
        .await;

        assert!(matches!(outcome, SubmitOutcome::Done(edit) if edit.is_empty()));
        assert!(gateway.sorted_calls().is_empty());
    }

    #[tokio::test]
    async fn edit_calls_only_changed_fields() {
        let original = student("s1", "Ana", 9.5);
        let gateway = RecordingGateway::with(vec![original.clone()]);
        let original = EditBaseline::from(&original);
        let outcome = submit_student_edit(
            &gateway,
            &original,
            &form("Ana Souza", "12345678901", "ana@example.org", "7.5"),
        )
        .await;

        assert!(matches!(outcome, SubmitOutcome::Done(_)));
        assert_eq!(
            gateway.sorted_calls(),
            ["change_grade s1 7.50", "change_name s1 Ana Souza"]
        );
        let stored = gateway.students.lock().unwrap()[0].clone();
        assert_eq!(stored.name, "Ana Souza");
        assert_eq!(stored.grade.to_bits(), 7.5_f64.to_bits());
    }

    #[tokio::test]
    async fn invalid_edit_makes_no_calls() {
        let original = student("s1", "Ana", 9.5);
        let gateway = RecordingGateway::with(vec![original.clone()]);
        let original = EditBaseline::from(&original);
        let outcome = submit_student_edit(
            &gateway,
            &original,
            &form("Bia", "12345678901", "ana@example.org", "10.1"),
        )
        .await;

        assert!(matches!(
            outcome,
            SubmitOutcome::Invalid(errors) if errors == StudentFormErrors::GRADE_TOO_HIGH
        ));
        assert!(gateway.sorted_calls().is_empty());
    }

    #[tokio::test]
    async fn partial_edit_failure_keeps_the_rest() {
        let original = student("s1", "Ana", 9.5);
        let gateway = RecordingGateway {
            fail_on: Some("change_grade"),
            ..RecordingGateway::with(vec![original.clone()])
        };
        let original = EditBaseline::from(&original);
        let outcome = submit_student_edit(
            &gateway,
            &original,
            &form("Bia", "12345678901", "ana@example.org", "3"),
        )
        .await;

        assert!(outcome.needs_refresh());
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed {
                error: TweedError::MissingStudent { .. },
                partially_applied: true,
            }
        ));
        assert_eq!(gateway.students.lock().unwrap()[0].name, "Bia");
    }

    #[tokio::test]
    async fn edit_leaves_fields_changed_elsewhere_alone() {
        let opened = student("s1", "Ana", 9.5);
        let mut renamed = opened.clone();
        renamed.name = "Bia".to_string();
        let gateway = RecordingGateway::with(vec![renamed]);

        //only the grade was touched in a form opened while the name was still "Ana"
        let outcome = submit_student_edit(
            &gateway,
            &EditBaseline::from(&opened),
            &form("Ana", "12345678901", "ana@example.org", "6"),
        )
        .await;

        assert!(matches!(outcome, SubmitOutcome::Done(_)));
        assert_eq!(gateway.sorted_calls(), ["change_grade s1 6.00"]);
        assert_eq!(gateway.students.lock().unwrap()[0].name, "Bia");
    }

    #[tokio::test]
    async fn deactivation_removes_from_the_next_listing() {
        let gateway = RecordingGateway::with(vec![
            student("s1", "Ana", 9.5),
            student("s2", "Bob", 6.0),
        ]);
        let outcome = submit_deactivation(&gateway, "s1").await;
        assert!(outcome.needs_refresh());

        let remaining = gateway.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "s2");
    }
}
