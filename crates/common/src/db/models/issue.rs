//! Issue entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "issues")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    #[sea_orm(unique)]
    pub slug: String,

    pub volume: Option<i16>,

    pub date: Option<Date>,

    pub issn: String,

    /// Path of the uploaded PDF, empty when none
    pub file: String,

    #[sea_orm(column_type = "Text")]
    pub desc: String,

    pub link: String,

    pub front_cover: String,

    pub back_cover: String,

    pub custom_txt: String,

    pub custom_num: Option<i32>,

    pub custom_bool: bool,

    pub redactor_id: Option<Uuid>,

    pub journal_id: Uuid,

    pub created_by: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal::Entity",
        from = "Column::JournalId",
        to = "super::journal::Column::Id",
        on_delete = "Cascade"
    )]
    Journal,

    #[sea_orm(
        belongs_to = "super::author::Entity",
        from = "Column::RedactorId",
        to = "super::author::Column::Id",
        on_delete = "SetNull"
    )]
    Redactor,
}

impl Related<super::journal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journal.def()
    }
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Redactor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
