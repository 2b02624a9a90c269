use crate::state::TweedState;
use axum::{extract::State, response::IntoResponse};
use maud::{Markup, html};

fn feature_card(heading: &str, blurb: &str) -> Markup {
    html! {
        div class="bg-gray-700 rounded-lg shadow-md p-4 flex flex-col space-y-2" {
            h2 class="text-lg font-semibold" {(heading)}
            p class="text-gray-300 text-sm" {(blurb)}
        }
    }
}

pub async fn get_index_route(State(state): State<TweedState>) -> impl IntoResponse {
    state.render(html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-3xl w-full flex flex-col space-y-6" {
            h1 class="text-3xl font-semibold text-center" {
                "Tweed"
            }
            p class="text-center text-gray-300" {
                "Keep track of every student, their CPF, email and grade in one place."
            }

            div class="grid grid-cols-1 md:grid-cols-3 gap-4" {
                (feature_card("Register", "Add students with their name, CPF and grade."))
                (feature_card("Find", "Search by name, email or CPF, filter by grade and sort any column."))
                (feature_card("Follow up", "See how grades spread across bands and the class average at a glance."))
            }

            div class="flex flex-row justify-center" {
                a href="/students" class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" {
                    "View Students"
                }
            }
        }
    })
}
