use crate::{
    data::{IdForm, StudentGateway, student::format_cpf},
    error::TweedResult,
    flow::{SubmitOutcome, submit_new_student, submit_student_edit},
    maud_conveniences::{error_banner, form_submit_button, simple_form_element, title},
    routes::{failure_banner, sse::SseEvent, student_in_detail::student_in_detail},
    state::TweedState,
    validation::{EditBaseline, FormField, StudentForm, StudentFormErrors},
};
use axum::{
    Form,
    extract::{Query, State},
};
use maud::{Markup, html};
use serde::Deserialize;

fn new_student_form(
    values: &StudentForm,
    errors: StudentFormErrors,
    failure: Option<&str>,
) -> Markup {
    html! {
        div class="bg-gray-800 rounded shadow-md p-6 max-w-xl w-full mx-auto" {
            (title("Add New Student"))
            @if let Some(failure) = failure {
                (error_banner(failure))
            }

            form hx-put="/internal/students/new_form" hx-trigger="submit" hx-target="#in_focus" hx-disabled-elt="find button[type='submit']" class="p-4" {
                (simple_form_element("name", "Full name", true, None, Some(values.name.as_str()), errors.message_for(FormField::Name)))
                (simple_form_element("cpf", "CPF", true, None, Some(values.cpf.as_str()), errors.message_for(FormField::Cpf)))
                (simple_form_element("grade", "Grade (0-10)", true, None, Some(values.grade.as_str()), errors.message_for(FormField::Grade)))
                p class="text-gray-400 text-xs mb-4" {"An email can be added once the student is registered."}

                (form_submit_button(Some("Add Student")))
            }
        }
    }
}

fn edit_student_form(
    baseline: &EditBaseline,
    values: &StudentForm,
    errors: StudentFormErrors,
    failure: Option<&str>,
) -> Markup {
    html! {
        div class="bg-gray-800 rounded shadow-md p-6 max-w-xl w-full mx-auto" {
            (title(html! {"Edit " (baseline.name)}))
            @if let Some(failure) = failure {
                (error_banner(failure))
            }

            form hx-post="/internal/students/edit_form" hx-trigger="submit" hx-target="#in_focus" hx-disabled-elt="find button[type='submit']" class="p-4" {
                input type="hidden" name="id" value=(baseline.id) {}
                input type="hidden" name="opened_name" value=(baseline.name) {}
                input type="hidden" name="opened_cpf" value=(baseline.cpf) {}
                input type="hidden" name="opened_email" value=(baseline.email.as_deref().unwrap_or_default()) {}
                input type="hidden" name="opened_grade" value=(baseline.grade) {}

                (simple_form_element("name", "Full name", true, None, Some(values.name.as_str()), errors.message_for(FormField::Name)))
                (simple_form_element("cpf", "CPF", true, None, Some(values.cpf.as_str()), errors.message_for(FormField::Cpf)))
                (simple_form_element("email", "Email", baseline.email.is_some(), Some("email"), Some(values.email.as_str()), errors.message_for(FormField::Email)))
                (simple_form_element("grade", "Grade (0-10)", true, None, Some(values.grade.as_str()), errors.message_for(FormField::Grade)))

                (form_submit_button(Some("Save changes")))
            }
        }
    }
}

/// The edit form starts out holding what the service had when it was opened.
fn prefilled(baseline: &EditBaseline) -> StudentForm {
    StudentForm {
        name: baseline.name.clone(),
        cpf: format_cpf(&baseline.cpf),
        email: baseline.email.clone().unwrap_or_default(),
        grade: baseline.grade.to_string(),
    }
}

pub async fn internal_get_new_student_form() -> Markup {
    new_student_form(&StudentForm::default(), StudentFormErrors::empty(), None)
}

pub async fn internal_put_new_student(
    State(state): State<TweedState>,
    Form(form): Form<StudentForm>,
) -> TweedResult<Markup> {
    match submit_new_student(state.client(), &form).await {
        SubmitOutcome::Done(student) => {
            state.send_sse_event(SseEvent::CrudStudent);
            student_in_detail(&state, &student, Some("Student registered."))
        }
        SubmitOutcome::Invalid(errors) => Ok(new_student_form(&form, errors, None)),
        SubmitOutcome::Failed { error, .. } => Ok(new_student_form(
            &form,
            StudentFormErrors::empty(),
            Some(&error.to_string()),
        )),
    }
}

pub async fn internal_get_edit_student_form(
    State(state): State<TweedState>,
    Query(IdForm { id }): Query<IdForm>,
) -> Markup {
    match state.client().get_by_id(&id).await {
        Ok(student) => {
            let baseline = EditBaseline::from(&student);
            edit_student_form(
                &baseline,
                &prefilled(&baseline),
                StudentFormErrors::empty(),
                None,
            )
        }
        Err(e) => failure_banner(&e),
    }
}

/// The edited values plus, in `opened_*`, what the form showed when it was opened.
#[derive(Deserialize, Debug)]
pub struct EditStudentForm {
    id: String,
    name: String,
    cpf: String,
    #[serde(default)]
    email: String,
    grade: String,
    opened_name: String,
    opened_cpf: String,
    #[serde(default)]
    opened_email: String,
    opened_grade: String,
}

impl EditStudentForm {
    fn split(self) -> Option<(EditBaseline, StudentForm)> {
        let grade = self
            .opened_grade
            .parse::<f64>()
            .ok()
            .filter(|grade| grade.is_finite())?;
        let email = self.opened_email.trim();

        let baseline = EditBaseline {
            id: self.id,
            name: self.opened_name,
            cpf: self.opened_cpf,
            email: (!email.is_empty()).then(|| email.to_string()),
            grade,
        };
        let fields = StudentForm {
            name: self.name,
            cpf: self.cpf,
            email: self.email,
            grade: self.grade,
        };
        Some((baseline, fields))
    }
}

pub async fn internal_post_edit_student(
    State(state): State<TweedState>,
    Form(form): Form<EditStudentForm>,
) -> TweedResult<Markup> {
    let Some((baseline, fields)) = form.split() else {
        warn!("Edit form came back without the values it was opened with");
        return Ok(error_banner("This form is out of date, reopen it and try again"));
    };

    let outcome = submit_student_edit(state.client(), &baseline, &fields).await;
    let changed_something = !matches!(&outcome, SubmitOutcome::Done(edit) if edit.is_empty());
    if outcome.needs_refresh() && changed_something {
        state.send_sse_event(SseEvent::CrudStudent);
    }

    match outcome {
        SubmitOutcome::Done(_) => {
            let note = if changed_something {
                "Changes saved."
            } else {
                "Nothing to save."
            };
            match state.client().get_by_id(&baseline.id).await {
                Ok(student) => student_in_detail(&state, &student, Some(note)),
                Err(e) => Ok(failure_banner(&e)),
            }
        }
        SubmitOutcome::Invalid(errors) => {
            Ok(edit_student_form(&baseline, &fields, errors, None))
        }
        SubmitOutcome::Failed {
            error,
            partially_applied,
        } => {
            let failure = if partially_applied {
                format!("{error}. Some of the other changes were saved.")
            } else {
                error.to_string()
            };
            Ok(edit_student_form(
                &baseline,
                &fields,
                StudentFormErrors::empty(),
                Some(&failure),
            ))
        }
    }
}
