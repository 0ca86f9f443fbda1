use sea_orm::entity::prelude::*;

/// Keyed by `(store_id, customer_phone)`, not by customer row, so balances
/// survive customer edits.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "points_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_id: Uuid,
    pub customer_phone: String,
    pub accumulated_points: i64,
    pub current_points: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::point_transactions::Entity")]
    PointTransactions,
}

impl Related<super::point_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PointTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
