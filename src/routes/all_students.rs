use crate::{
    data::{
        IdForm, StudentGateway,
        student::{GradeBand, Student},
    },
    error::TweedResult,
    flow::{SubmitOutcome, submit_deactivation},
    maud_conveniences::{INPUT_CLASSES, error_banner, id_vals, stat_card, table, title},
    routes::{failure_banner, sse::SseEvent},
    state::TweedState,
    view::{CollectionView, SortField, SortOrder, ViewState, derive},
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use jiff::Timestamp;
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::json;

pub async fn get_students(State(state): State<TweedState>) -> impl IntoResponse {
    state.render(html! {
        div class="container mx-auto px-4 flex flex-col space-y-4 max-w-6xl w-full" {
            div class="flex flex-row items-center justify-between" {
                div {
                    (title("Students"))
                    p class="text-gray-400 -mt-2 mb-2" {"Everyone registered with the student service"}
                }
                button class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" hx-get="/internal/students/new_form" hx-target="#in_focus" {
                    "Add Student"
                }
            }
            div id="in_focus" {}
            div sse-connect="/sse_feed" {
                div id="all_students" hx-get="/internal/students" hx-trigger="load, sse:crud_student" hx-include="#student_filters" {
                    p class="text-gray-400 text-center py-8" {"Loading students..."}
                }
            }
        }
    })
}

/// What the filter bar and column headers send back.
#[derive(Deserialize, Debug, Default)]
pub struct StudentsQuery {
    #[serde(default)]
    search: String,
    ///empty is "All grades"
    #[serde(default)]
    grade: String,
    #[serde(default)]
    sort: SortField,
    #[serde(default)]
    order: SortOrder,
}

impl From<StudentsQuery> for ViewState {
    fn from(query: StudentsQuery) -> Self {
        Self {
            search: query.search,
            grade_filter: query
                .grade
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|grade| grade.is_finite()),
            sort_field: query.sort,
            sort_order: query.order,
        }
    }
}

pub async fn internal_get_students(
    State(state): State<TweedState>,
    Query(query): Query<StudentsQuery>,
) -> TweedResult<Markup> {
    let view_state = ViewState::from(query);

    let students = match state.client().list().await {
        Ok(students) => students,
        Err(e) => {
            error!(?e, "Unable to load students");
            return Ok(html! {
                div class="bg-gray-800 rounded shadow-md p-8 flex flex-col items-center space-y-4" {
                    (error_banner(e.to_string()))
                    button class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" hx-get="/internal/students" hx-target="#all_students" hx-include="#student_filters" {
                        "Try again"
                    }
                }
            });
        }
    };

    let view = derive(&students, &view_state);
    let rows = student_rows(&state, &view)?;
    let last_refreshed = state
        .config()
        .date_locale_config()
        .short_ymdet(Timestamp::now())?;

    Ok(html! {
        div class="flex flex-col space-y-4" {
            (stats_cards(&view))
            (filter_bar(&view, &view_state))

            @if view.is_collection_empty() {
                div class="bg-gray-800 rounded shadow-md p-8 text-center flex flex-col items-center space-y-4" {
                    p class="text-lg font-semibold" {"No students registered yet"}
                    p class="text-gray-400" {"Students you add will show up here."}
                    button class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" hx-get="/internal/students/new_form" hx-target="#in_focus" {
                        "Add the first student"
                    }
                }
            } @else if view.display.is_empty() {
                div class="bg-gray-800 rounded shadow-md p-8 text-center" {
                    p class="text-lg font-semibold" {"No students match these filters"}
                    p class="text-gray-400" {"Try a different search or grade."}
                }
            } @else {
                (table(
                    [
                        sort_header(&view_state, SortField::Name, "Name"),
                        sort_header(&view_state, SortField::Email, "Email"),
                        sort_header(&view_state, SortField::Grade, "Grade"),
                        html! {"CPF"},
                        sort_header(&view_state, SortField::CreatedAt, "Registered"),
                        html! {"Actions"},
                    ],
                    rows,
                ))
            }

            div class="flex flex-row items-center justify-between text-sm text-gray-400" {
                p {"Showing " (view.display.len()) " of " (view.stats.total) " students"}
                div class="flex flex-row items-center space-x-2" {
                    span {"Last refreshed " (last_refreshed)}
                    button class="bg-gray-700 hover:bg-gray-600 py-1 px-3 rounded" hx-get="/internal/students" hx-target="#all_students" hx-include="#student_filters" {
                        "Refresh"
                    }
                }
            }
        }
    })
}

fn stats_cards(view: &CollectionView<'_>) -> Markup {
    let accent = |band: GradeBand| match band {
        GradeBand::Excellent => "border-green-500",
        GradeBand::Good => "border-blue-500",
        GradeBand::Average => "border-yellow-400",
        GradeBand::Poor => "border-red-500",
    };

    html! {
        div class="grid grid-cols-2 md:grid-cols-3 lg:grid-cols-6 gap-4" {
            (stat_card("Total", view.stats.total, "border-gray-400"))
            @for band in GradeBand::ALL {
                (stat_card(band.range_label(), view.stats.count(band), accent(band)))
            }
            (stat_card("Mean grade", view.stats.mean_for_display(), "border-purple-500"))
        }
    }
}

fn filter_bar(view: &CollectionView<'_>, view_state: &ViewState) -> Markup {
    html! {
        form id="student_filters" hx-get="/internal/students" hx-target="#all_students" hx-trigger="input changed delay:500ms from:#search, change from:#grade, submit" class="flex flex-col md:flex-row gap-4" {
            input type="search" id="search" name="search" placeholder="Search by name, email or CPF" value=(view_state.search) class=(INPUT_CLASSES) {}
            select id="grade" name="grade" class={(INPUT_CLASSES) " md:w-48"} {
                option value="" selected[view_state.grade_filter.is_none()] {"All grades"}
                @for grade in &view.grade_options {
                    option value=(grade) selected[view_state.grade_filter.is_some_and(|g| g.to_bits() == grade.to_bits())] {
                        "Grade " (grade)
                    }
                }
            }
            input type="hidden" name="sort" value=(view_state.sort_field.as_str()) {}
            input type="hidden" name="order" value=(view_state.sort_order.as_str()) {}
        }
    }
}

fn sort_header(view_state: &ViewState, field: SortField, label: &str) -> Markup {
    let next = view_state.sorted_by(field);
    let vals = json!({
        "sort": next.sort_field.as_str(),
        "order": next.sort_order.as_str(),
    })
    .to_string();
    let indicator = if view_state.sort_field == field {
        match view_state.sort_order {
            SortOrder::Asc => "▲",
            SortOrder::Desc => "▼",
        }
    } else {
        ""
    };

    html! {
        button type="button" class="flex flex-row items-center space-x-1 hover:text-white" hx-get="/internal/students" hx-target="#all_students" hx-include="#student_filters" hx-vals=(vals) {
            span {(label)}
            span class="text-xs" {(indicator)}
        }
    }
}

pub fn initials_avatar(student: &Student) -> Markup {
    html! {
        div class={"rounded-full w-9 h-9 flex items-center justify-center font-bold text-sm " (student.band().badge_classes())} {
            (student.initials())
        }
    }
}

pub fn grade_badge(grade: f64) -> Markup {
    let band = GradeBand::from_grade(grade);
    html! {
        span class={"px-2 py-1 rounded text-xs font-semibold " (band.badge_classes())} {
            (format!("{grade:.1}"))
        }
    }
}

pub fn grade_bar(grade: f64) -> Markup {
    let band = GradeBand::from_grade(grade);
    let width = (grade * 10.0).clamp(0.0, 100.0);
    html! {
        div class="w-full bg-gray-600 rounded-full h-2 mt-1" {
            div class={"h-2 rounded-full " (band.bar_classes())} style=(format!("width: {width:.0}%")) {}
        }
    }
}

fn student_rows(state: &TweedState, view: &CollectionView<'_>) -> TweedResult<Vec<[Markup; 6]>> {
    let dates = state.config().date_locale_config();

    view.display
        .iter()
        .map(|student| {
            let vals = id_vals(&student.id);
            let registered = dates.long_ymd(student.created_at)?;
            Ok([
                html! {
                    div class="flex flex-row items-center space-x-3" {
                        (initials_avatar(student))
                        span class="font-medium" {(student)}
                        @if let Some(letter) = &student.first_letter_that_dont_repeat {
                            span class="text-xs bg-gray-600 px-2 py-1 rounded" title="First letter that doesn't repeat" {(letter)}
                        }
                    }
                },
                html! {
                    @match &student.email {
                        Some(email) => a href={"mailto:" (email)} class="hover:text-blue-300" {(email)},
                        None => span class="text-gray-500 italic" {"No email"},
                    }
                },
                html! {
                    div class="w-24" {
                        (grade_badge(student.grade))
                        (grade_bar(student.grade))
                    }
                },
                html! {
                    span class="font-mono" {(student.formatted_cpf())}
                },
                html! {
                    (registered)
                },
                html! {
                    div class="flex flex-row space-x-2" {
                        button class="bg-slate-600 hover:bg-slate-800 py-1 px-2 rounded text-sm" hx-get="/internal/student" hx-target="#in_focus" hx-vals=(vals) {"View"}
                        button class="bg-blue-600 hover:bg-blue-800 py-1 px-2 rounded text-sm" hx-get="/internal/students/edit_form" hx-target="#in_focus" hx-vals=(vals) {"Edit"}
                        button class="bg-red-600 hover:bg-red-800 py-1 px-2 rounded text-sm" hx-get="/internal/students/deactivate_form" hx-target="#in_focus" hx-vals=(vals) {"Deactivate"}
                    }
                },
            ])
        })
        .collect()
}

pub async fn internal_get_deactivate_form(
    State(state): State<TweedState>,
    Query(IdForm { id }): Query<IdForm>,
) -> Markup {
    let student = match state.client().get_by_id(&id).await {
        Ok(student) => student,
        Err(e) => return failure_banner(&e),
    };
    let vals = id_vals(&student.id);

    html! {
        div class="bg-gray-800 rounded shadow-md p-6 max-w-md mx-auto" {
            (title("Deactivate student?"))
            p class="text-gray-300 mb-4" {
                "Are you sure you want to deactivate "
                span class="font-semibold" {(student)}
                "? They will no longer show up in the list."
            }
            div class="flex flex-row space-x-4" {
                button class="bg-red-600 hover:bg-red-800 disabled:opacity-50 font-bold py-2 px-4 rounded" hx-delete="/students" hx-vals=(vals) hx-target="#in_focus" hx-disabled-elt="this" {
                    "Deactivate"
                }
                button class="bg-gray-600 hover:bg-gray-500 font-bold py-2 px-4 rounded" hx-get="/internal/student" hx-vals=(vals) hx-target="#in_focus" {
                    "Cancel"
                }
            }
        }
    }
}

pub async fn delete_student(
    State(state): State<TweedState>,
    Query(IdForm { id }): Query<IdForm>,
) -> Markup {
    match submit_deactivation(state.client(), &id).await {
        SubmitOutcome::Done(()) => {
            state.send_sse_event(SseEvent::CrudStudent);
            html! {
                div class="bg-green-100 border border-green-400 text-green-700 px-4 py-3 rounded mb-4" role="status" {
                    "Student deactivated."
                }
            }
        }
        SubmitOutcome::Failed { error, .. } => error_banner(error.to_string()),
        SubmitOutcome::Invalid(_) => html! {},
    }
}
