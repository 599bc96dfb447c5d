//! SeaORM Entity for students table

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub full_name: String,
    pub grade: i32,
    pub course: i32,
    /// Sequential position within the (grade, course) group; the access
    /// code is derived from it.
    pub list_number: i32,
    #[sea_orm(unique)]
    pub access_code: String,
    pub has_voted: bool,
    pub voted_at: Option<DateTime>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
