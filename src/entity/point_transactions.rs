use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    #[sea_orm(string_value = "earning")]
    Earning,
    #[sea_orm(string_value = "redemption")]
    Redemption,
}

/// Append-only. Never updated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub store_id: Uuid,
    pub order_id: Option<Uuid>,
    pub delta: i64,
    pub kind: PointKind,
    pub note: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::points_accounts::Entity",
        from = "Column::AccountId",
        to = "super::points_accounts::Column::Id"
    )]
    PointsAccounts,
}

impl Related<super::points_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PointsAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
