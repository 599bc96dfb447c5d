//! SeaORM Entity for the config singleton row

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Election status values stored in `config.election_status`.
pub const STATUS_OPEN: &str = "open";
pub const STATUS_CLOSED: &str = "closed";

/// The one row that exists, keyed by this id.
pub const SINGLETON_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub school_name: String,
    pub logo_url: Option<String>,
    pub election_status: String,
    pub admin_code: String,
    pub updated_at: DateTime,
}

impl Model {
    pub fn is_open(&self) -> bool {
        self.election_status == STATUS_OPEN
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
