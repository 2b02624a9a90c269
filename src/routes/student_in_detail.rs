use crate::{
    data::{IdForm, StudentGateway, student::Student},
    error::TweedResult,
    maud_conveniences::{copy_button, id_vals, subtitle},
    routes::{
        all_students::{grade_badge, grade_bar, initials_avatar},
        failure_banner,
    },
    state::TweedState,
};
use axum::extract::{Query, State};
use maud::{Markup, html};

pub async fn internal_get_student_in_detail(
    State(state): State<TweedState>,
    Query(IdForm { id }): Query<IdForm>,
) -> TweedResult<Markup> {
    match state.client().get_by_id(&id).await {
        Ok(student) => student_in_detail(&state, &student, None),
        Err(e) => Ok(failure_banner(&e)),
    }
}

/// The detail card, optionally with a green note on top (eg. after a save).
pub fn student_in_detail(
    state: &TweedState,
    student: &Student,
    note: Option<&str>,
) -> TweedResult<Markup> {
    let dates = state.config().date_locale_config();
    let created = dates.long_ymdet(student.created_at)?;
    let updated = dates.long_ymdet(student.updated_at)?;
    let band = student.band();
    let vals = id_vals(&student.id);

    Ok(html! {
        div class="rounded-lg shadow-md overflow-hidden bg-gray-800 max-w-xl w-full mx-auto p-6 flex flex-col space-y-4" {
            @if let Some(note) = note {
                div class="bg-green-100 border border-green-400 text-green-700 px-4 py-3 rounded" role="status" {(note)}
            }

            div class="flex flex-row items-center space-x-4" {
                (initials_avatar(student))
                div {
                    (subtitle(student))
                    span class={"px-2 py-1 rounded text-xs font-semibold " (band.badge_classes())} {
                        (band.status())
                    }
                }
            }

            div {
                p class="text-gray-200 font-semibold" {
                    "Academic performance: "
                    (grade_badge(student.grade))
                    span class="text-gray-400 text-sm" {" / 10"}
                }
                (grade_bar(student.grade))
            }

            div class="flex flex-col space-y-2" {
                p class="text-gray-200 font-semibold flex flex-row items-center" {
                    "Email: "
                    @match &student.email {
                        Some(email) => {
                            a href={"mailto:" (email)} class="font-medium ml-1 hover:text-blue-300" {(email)}
                            (copy_button(email))
                        },
                        None => span class="font-medium ml-1 text-gray-500 italic" {"No email on record"},
                    }
                }
                p class="text-gray-200 font-semibold flex flex-row items-center" {
                    "CPF: "
                    span class="font-mono font-medium ml-1" {(student.formatted_cpf())}
                    (copy_button(&student.cpf))
                }
                @if let Some(letter) = &student.first_letter_that_dont_repeat {
                    p class="text-gray-200 font-semibold" {
                        "First letter that doesn't repeat: "
                        span class="font-medium" {(letter)}
                    }
                }
                p class="text-gray-400 text-sm" {"Registered " (created)}
                p class="text-gray-400 text-sm" {"Last updated " (updated)}
            }

            div class="flex flex-row space-x-4" {
                button class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" hx-get="/internal/students/edit_form" hx-vals=(vals) hx-target="#in_focus" {
                    "Edit"
                }
                button class="bg-red-600 hover:bg-red-800 font-bold py-2 px-4 rounded" hx-get="/internal/students/deactivate_form" hx-vals=(vals) hx-target="#in_focus" {
                    "Deactivate"
                }
            }
        }
    })
}
