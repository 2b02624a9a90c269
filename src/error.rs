use crate::data::client::Operation;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use snafu::Snafu;

pub type TweedResult<T> = Result<T, TweedError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TweedError {
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unknown timezone {:?}", tz))]
    InvalidTimezone { source: jiff::Error, tz: String },
    #[snafu(display("Unable to parse locale {:?}", provided))]
    InvalidLocale {
        source: icu::locale::ParseError,
        provided: String,
    },
    #[snafu(display("Unknown hour cycle {:?}, expected one of h11, h12 or h23", provided))]
    InvalidHourCycle { provided: String },
    #[snafu(display("Unknown calendar algorithm {:?}", provided))]
    InvalidCalendarAlgorithm { provided: String },
    #[snafu(display("Unable to load date formatting data"))]
    BadDateTimeFormatter {
        source: icu::datetime::DateTimeFormatterLoadError,
    },
    #[snafu(display("Unable to build the HTTP client"))]
    BuildHttpClient { source: reqwest::Error },
    #[snafu(display("Unable to {}: the student service could not be reached", operation))]
    SendRequest {
        source: reqwest::Error,
        operation: Operation,
    },
    #[snafu(display("Unable to {}: the student service refused the request", operation))]
    BackendStatus {
        source: reqwest::Error,
        operation: Operation,
    },
    #[snafu(display("Unable to {}: the student service sent an unreadable reply", operation))]
    DecodeResponse {
        source: reqwest::Error,
        operation: Operation,
    },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: String },
}

impl TweedError {
    /// The operation a gateway failure belongs to, if this came from the student service.
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::SendRequest { operation, .. }
            | Self::BackendStatus { operation, .. }
            | Self::DecodeResponse { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

impl IntoResponse for TweedError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BG: StatusCode = StatusCode::BAD_GATEWAY; //backend failed us

        let status_code = match &self {
            Self::BadEnvVar { .. } => ISE,
            Self::InvalidTimezone { .. }
            | Self::InvalidLocale { .. }
            | Self::InvalidHourCycle { .. }
            | Self::InvalidCalendarAlgorithm { .. } => ISE,
            Self::BadDateTimeFormatter { .. } => ISE,
            Self::BuildHttpClient { .. } => ISE,
            Self::SendRequest { .. } | Self::BackendStatus { .. } | Self::DecodeResponse { .. } => {
                BG
            }
            Self::MissingStudent { .. } => NF,
        };

        error!(?self, operation = ?self.operation(), "Error!");
        (
            status_code,
            Html(crate::maud_conveniences::error_banner(self.to_string())),
        )
            .into_response()
    }
}
