//! Journal entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "journals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    /// Assigned once on first insert, never rewritten
    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text")]
    pub desc: String,

    pub link: String,

    pub front_cover: String,

    #[sea_orm(nullable)]
    pub back_cover: Option<String>,

    pub custom_txt: String,

    pub custom_num: Option<i32>,

    pub custom_bool: bool,

    pub publisher_id: Option<Uuid>,

    pub county_id: Option<Uuid>,

    pub city_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::issue::Entity")]
    Issues,

    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::PublisherId",
        to = "super::organization::Column::Id",
        on_delete = "SetNull"
    )]
    Publisher,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issues.def()
    }
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Publisher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
