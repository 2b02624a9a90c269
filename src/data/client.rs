use crate::{
    config::ApiConfig,
    data::{
        StudentGateway,
        student::{NewStudent, Student},
    },
    error::{
        BackendStatusSnafu, BuildHttpClientSnafu, DecodeResponseSnafu, MissingStudentSnafu,
        SendRequestSnafu, TweedResult,
    },
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use snafu::ResultExt;
use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    ChangeName,
    ChangeCpf,
    ChangeEmail,
    ChangeGrade,
    Deactivate,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let what = match self {
            Self::List => "load the student list",
            Self::Get => "load the student",
            Self::Create => "register the student",
            Self::ChangeName => "change the student's name",
            Self::ChangeCpf => "change the student's CPF",
            Self::ChangeEmail => "change the student's email",
            Self::ChangeGrade => "change the student's grade",
            Self::Deactivate => "deactivate the student",
        };
        f.write_str(what)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum ChangedField<'a> {
    Name(&'a str),
    Cpf(&'a str),
    Email(&'a str),
    Grade(&'a str),
}

impl ChangedField<'_> {
    const fn path(&self) -> &'static str {
        match self {
            Self::Name(_) => "student/change/name",
            Self::Cpf(_) => "student/change/cpf",
            Self::Email(_) => "student/change/email",
            Self::Grade(_) => "student/change/grade",
        }
    }

    const fn operation(&self) -> Operation {
        match self {
            Self::Name(_) => Operation::ChangeName,
            Self::Cpf(_) => Operation::ChangeCpf,
            Self::Email(_) => Operation::ChangeEmail,
            Self::Grade(_) => Operation::ChangeGrade,
        }
    }
}

#[derive(Serialize)]
struct FieldChange<'a> {
    id: &'a str,
    #[serde(flatten)]
    field: ChangedField<'a>,
}

/// `reqwest`-backed access to the student service, cheap to clone.
#[derive(Clone, Debug)]
pub struct StudentClient {
    http: Client,
    base_url: Arc<str>,
}

impl StudentClient {
    pub fn new(config: &ApiConfig) -> TweedResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("tweed/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(BuildHttpClientSnafu)?;

        Ok(Self {
            http,
            base_url: config.base_url().trim_end_matches('/').into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn dispatch(&self, operation: Operation, request: RequestBuilder) -> TweedResult<Response> {
        debug!(%operation, "Calling student service");
        request
            .send()
            .await
            .context(SendRequestSnafu { operation })?
            .error_for_status()
            .context(BackendStatusSnafu { operation })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> TweedResult<T> {
        self.dispatch(operation, request)
            .await?
            .json()
            .await
            .context(DecodeResponseSnafu { operation })
    }

    async fn change(&self, id: &str, field: ChangedField<'_>) -> TweedResult<Student> {
        let operation = field.operation();
        let request = self
            .http
            .patch(self.url(field.path()))
            .json(&FieldChange { id, field });
        self.fetch(operation, request).await
    }
}

impl StudentGateway for StudentClient {
    async fn list(&self) -> TweedResult<Vec<Student>> {
        self.fetch(Operation::List, self.http.get(self.url("student")))
            .await
    }

    async fn get_by_id(&self, id: &str) -> TweedResult<Student> {
        let operation = Operation::Get;
        debug!(%operation, ?id, "Calling student service");

        let rsp = self
            .http
            .get(self.url(&format!("student/{id}")))
            .send()
            .await
            .context(SendRequestSnafu { operation })?;
        if rsp.status() == StatusCode::NOT_FOUND {
            return MissingStudentSnafu { id }.fail();
        }

        rsp.error_for_status()
            .context(BackendStatusSnafu { operation })?
            .json()
            .await
            .context(DecodeResponseSnafu { operation })
    }

    async fn create(&self, to_be_added: &NewStudent) -> TweedResult<Student> {
        let request = self.http.post(self.url("student")).json(to_be_added);
        self.fetch(Operation::Create, request).await
    }

    async fn change_name(&self, id: &str, name: &str) -> TweedResult<Student> {
        self.change(id, ChangedField::Name(name)).await
    }

    async fn change_cpf(&self, id: &str, cpf: &str) -> TweedResult<Student> {
        self.change(id, ChangedField::Cpf(cpf)).await
    }

    async fn change_email(&self, id: &str, email: &str) -> TweedResult<Student> {
        self.change(id, ChangedField::Email(email)).await
    }

    async fn change_grade(&self, id: &str, grade: &str) -> TweedResult<Student> {
        self.change(id, ChangedField::Grade(grade)).await
    }

    async fn deactivate(&self, id: &str) -> TweedResult<()> {
        let request = self.http.delete(self.url(&format!("student/{id}")));
        self.dispatch(Operation::Deactivate, request).await?;
        Ok(())
    }
}
