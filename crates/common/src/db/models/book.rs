//! Book entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text")]
    pub desc: String,

    pub link: String,

    #[sea_orm(nullable)]
    pub front_cover: Option<String>,

    #[sea_orm(nullable)]
    pub back_cover: Option<String>,

    pub volume: Option<i16>,

    pub date: Option<Date>,

    pub issn: String,

    pub file: String,

    pub custom_txt: String,

    pub custom_num: Option<i32>,

    pub custom_bool: bool,

    pub created_by: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
