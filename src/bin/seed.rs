use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use laundry_pos::{
    config::AppConfig,
    db::{OrmConn, create_orm_conn, run_migrations},
    domain::pricing::{DurationUnit, PricingMode},
    entity::{
        services::{ActiveModel as ServiceActive, Column as ServiceCol, Entity as Services},
        store_members::{
            ActiveModel as MemberActive, Column as MemberCol, Entity as StoreMembers, MemberRole,
        },
        stores::{ActiveModel as StoreActive, Column as StoreCol, Entity as Stores},
    },
    middleware::auth::Claims,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

const STORE_NAME: &str = "Fresh Laundry";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let store_id = ensure_store(&orm).await?;
    let owner_id =
        ensure_member(&orm, store_id, env_uuid("SEED_OWNER_ID"), MemberRole::Owner).await?;
    let staff_id =
        ensure_member(&orm, store_id, env_uuid("SEED_STAFF_ID"), MemberRole::Staff).await?;
    seed_services(&orm, store_id).await?;

    println!("Seed completed. Store ID: {store_id}");
    println!("Owner ID: {owner_id}");
    println!("Staff ID: {staff_id}");

    if let Ok(secret) = std::env::var("JWT_SECRET") {
        println!("Owner token: {}", dev_token(&secret, owner_id)?);
        println!("Staff token: {}", dev_token(&secret, staff_id)?);
    }
    Ok(())
}

fn env_uuid(key: &str) -> Option<Uuid> {
    std::env::var(key).ok().and_then(|v| Uuid::parse_str(&v).ok())
}

async fn ensure_store(orm: &OrmConn) -> anyhow::Result<Uuid> {
    if let Some(store) = Stores::find()
        .filter(StoreCol::Name.eq(STORE_NAME))
        .one(orm)
        .await?
    {
        return Ok(store.id);
    }

    let now = Utc::now();
    let store = StoreActive {
        id: Set(Uuid::new_v4()),
        name: Set(STORE_NAME.into()),
        phone: Set(Some("081122223333".into())),
        address: Set(Some("Jl. Merdeka 10".into())),
        points_enabled: Set(true),
        use_own_number_for_messages: Set(false),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(orm)
    .await?;
    println!("Created store {STORE_NAME}");
    Ok(store.id)
}

async fn ensure_member(
    orm: &OrmConn,
    store_id: Uuid,
    user_id: Option<Uuid>,
    role: MemberRole,
) -> anyhow::Result<Uuid> {
    // If a member with this role already exists, reuse it
    let mut existing = StoreMembers::find()
        .filter(MemberCol::StoreId.eq(store_id))
        .filter(MemberCol::Role.eq(role));
    if let Some(user_id) = user_id {
        existing = existing.filter(MemberCol::UserId.eq(user_id));
    }
    if let Some(member) = existing.one(orm).await? {
        return Ok(member.user_id);
    }

    let user_id = user_id.unwrap_or_else(Uuid::new_v4);
    MemberActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        user_id: Set(user_id),
        role: Set(role),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;
    println!("Ensured {role:?} membership for {user_id}");
    Ok(user_id)
}

async fn seed_services(orm: &OrmConn, store_id: Uuid) -> anyhow::Result<()> {
    let days = |n| Some((n, DurationUnit::Days));
    let hours = |n| Some((n, DurationUnit::Hours));
    let services = vec![
        ("Wash & Fold", "laundry", PricingMode::Weight, None, Some(7_000), days(2)),
        ("Express Wash", "laundry", PricingMode::Weight, None, Some(12_000), hours(6)),
        ("Shirt Pressing", "ironing", PricingMode::Unit, Some(8_000), None, days(1)),
        ("Bed Cover", "laundry", PricingMode::Combined, Some(15_000), Some(5_000), days(3)),
        ("Laundry Bag", "product", PricingMode::Unit, Some(10_000), None, None),
    ];

    for (name, category, mode, unit_price, weight_price, duration) in services {
        let exists = Services::find()
            .filter(ServiceCol::StoreId.eq(store_id))
            .filter(ServiceCol::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }
        ServiceActive {
            id: Set(Uuid::new_v4()),
            store_id: Set(store_id),
            name: Set(name.into()),
            category: Set(category.into()),
            pricing_mode: Set(mode),
            unit_price: Set(unit_price),
            weight_price: Set(weight_price),
            duration_value: Set(duration.map(|(value, _)| value)),
            duration_unit: Set(duration.map(|(_, unit)| unit)),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded services");
    Ok(())
}

fn dev_token(secret: &str, user_id: Uuid) -> anyhow::Result<String> {
    let exp = (Utc::now() + chrono::Duration::days(7)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}
