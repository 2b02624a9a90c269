use crate::{
    data::student::{NewStudent, Student},
    error::TweedResult,
};
use serde::Deserialize;

pub mod client;
pub mod student;

#[derive(Deserialize)]
pub struct IdForm {
    pub id: String,
}

/// Everything the frontend can ask of the student service. Every method is exactly one request.
#[allow(async_fn_in_trait)]
pub trait StudentGateway {
    async fn list(&self) -> TweedResult<Vec<Student>>;
    async fn get_by_id(&self, id: &str) -> TweedResult<Student>;
    async fn create(&self, to_be_added: &NewStudent) -> TweedResult<Student>;
    async fn change_name(&self, id: &str, name: &str) -> TweedResult<Student>;
    async fn change_cpf(&self, id: &str, cpf: &str) -> TweedResult<Student>;
    async fn change_email(&self, id: &str, email: &str) -> TweedResult<Student>;
    ///the service wants the grade as a string, eg. `"7.50"`
    async fn change_grade(&self, id: &str, grade: &str) -> TweedResult<Student>;
    async fn deactivate(&self, id: &str) -> TweedResult<()>;
}
