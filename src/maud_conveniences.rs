use maud::{Markup, Render, html};
use serde_json::json;

pub const INPUT_CLASSES: &str = "shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";

pub fn table<const N: usize>(titles: [Markup; N], rows: Vec<[Markup; N]>) -> Markup {
    html! {
        div class="overflow-x-auto" {
            table class="min-w-full bg-gray-800 rounded shadow-md" {
                thead class="bg-gray-700" {
                    tr {
                        @for title in titles {
                            th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                        }
                    }
                }
                tbody {
                    @for row in rows {
                        tr class="hover:bg-gray-700" {
                            @for col in row {
                                td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn subtitle(s: impl Render) -> Markup {
    html! {
        h2 class="text-xl font-semibold mb-2" {(s)}
    }
}

pub fn form_element(id: &'static str, label: &'static str, input: Markup, error: Option<&str>) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (input)
            @if let Some(error) = error {
                p class="text-red-400 text-xs italic mt-1" {(error)}
            }
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    required: bool,
    ty: Option<&'static str>,
    value: Option<&str>,
    error: Option<&str>,
) -> Markup {
    let border = if error.is_some() { "border-red-500" } else { "" };
    form_element(
        id,
        label,
        html! {
            input required[required] type=(ty.unwrap_or("text")) id=(id) name=(id) value=[value] class={(INPUT_CLASSES) " " (border)} {}
        },
        error,
    )
}

pub fn form_submit_button(text: Option<&str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class="bg-blue-500 hover:bg-blue-700 disabled:opacity-50 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                (text.unwrap_or("Submit"))
            }
        }
    }
}

pub fn error_banner(desc: impl Render) -> Markup {
    html! {
        div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
            strong class="font-bold" {"Error: "}
            span {(desc)}
        }
    }
}

pub fn stat_card(label: &str, value: impl Render, accent: &'static str) -> Markup {
    html! {
        div class={"bg-gray-800 rounded shadow-md p-4 border-l-4 " (accent)} {
            p class="text-sm text-gray-400 font-medium" {(label)}
            p class="text-2xl font-bold" {(value)}
        }
    }
}

/// `{"id": "..."}` for `hx-vals`.
pub fn id_vals(id: &str) -> String {
    json!({ "id": id }).to_string()
}

pub fn copy_button(value: &str) -> Markup {
    html! {
        button type="button" data-copy=(value) onclick="navigator.clipboard.writeText(this.dataset.copy)" class="ml-2 text-xs bg-gray-600 hover:bg-gray-500 py-1 px-2 rounded" {
            "Copy"
        }
    }
}
