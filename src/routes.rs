use crate::{error::TweedError, maud_conveniences::error_banner};
use maud::Markup;

pub mod all_students;
pub mod index;
pub mod sse;
pub mod student_forms;
pub mod student_in_detail;

/// For fragments: logs the failure and hands back a banner to swap in where the panel would go.
pub fn failure_banner(error: &TweedError) -> Markup {
    error!(?error, "Unable to fill in panel");
    error_banner(error.to_string())
}
