use crate::auth::hash_password;
use crate::models::{customer, outsource, outsource_cost, sale, sale_type, user};
use sea_orm::*;

/// Seeds a small demo data set: an admin user, a few customers, vendors and
/// sale types, and a spread of sales across recent months.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339();

    // 1. Admin user
    let admin_password = hash_password("admin").map_err(DbErr::Custom)?;
    let admin = user::ActiveModel {
        username: Set("admin".to_owned()),
        password_hash: Set(admin_password),
        role: Set("admin".to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };
    user::Entity::insert(admin)
        .on_conflict(
            sea_query::OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await?;

    // 2. Sale types (id 1, Uncategorized, is seeded by the migrations)
    let mut type_ids = Vec::new();
    for (name, description) in [
        ("Web Design", "Website design and build work"),
        ("Printing", "Flyers, business cards and other print jobs"),
        ("Consulting", "Hourly consulting engagements"),
    ] {
        let model = sale_type::ActiveModel {
            name: Set(name.to_owned()),
            description: Set(Some(description.to_owned())),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        let res = sale_type::Entity::insert(model).exec(db).await?;
        type_ids.push(res.last_insert_id);
    }

    // 3. Customers
    let mut customer_ids = Vec::new();
    for (name, contact) in [
        ("Yamada Trading Co.", Some("Yamada")),
        ("Suzuki Industries", Some("Suzuki")),
        ("Cafe Hikari", None),
        ("Tanaka Design Office", Some("Tanaka")),
    ] {
        let model = customer::ActiveModel {
            name: Set(name.to_owned()),
            contact_person: Set(contact.map(str::to_owned)),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        let res = customer::Entity::insert(model).exec(db).await?;
        customer_ids.push(res.last_insert_id);
    }

    // 4. Outsource vendors
    let mut vendor_ids = Vec::new();
    for (name, email) in [
        ("Print Partner KK", Some("orders@printpartner.example")),
        ("Freelance Dev Sato", None),
    ] {
        let model = outsource::ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.map(str::to_owned)),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        let res = outsource::Entity::insert(model).exec(db).await?;
        vendor_ids.push(res.last_insert_id);
    }

    // 5. Sales across a few months, some with an outsource cost
    let today = chrono::Local::now().date_naive();
    let sales: [(usize, &str, i64, &str, Option<(usize, i64)>); 5] = [
        (0, "completed", 120_000, "website refresh", Some((1, 40_000))),
        (1, "completed", 55_000, "spring flyer run", Some((0, 18_000))),
        (2, "in_progress", 30_000, "menu redesign", None),
        (3, "in_progress", 200_000, "branding project", Some((1, 60_000))),
        (0, "on_hold", 15_000, "maintenance retainer", None),
    ];

    for (i, (cust, status, amount, note, cost)) in sales.into_iter().enumerate() {
        let sale_date = today - chrono::Days::new(20 * i as u64);
        let delivery = sale_date + chrono::Days::new(30);
        let model = sale::ActiveModel {
            customer_id: Set(customer_ids[cust]),
            sale_date: Set(sale_date.format("%Y-%m-%d").to_string()),
            delivery_date: Set(Some(delivery.format("%Y-%m-%d").to_string())),
            total_amount: Set(amount),
            sale_status: Set(status.to_owned()),
            sale_type_id: Set(type_ids[i % type_ids.len()]),
            notes: Set(Some(note.to_owned())),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        let res = sale::Entity::insert(model).exec(db).await?;

        if let Some((vendor, cost_amount)) = cost {
            let cost_row = outsource_cost::ActiveModel {
                sale_id: Set(res.last_insert_id),
                outsource_id: Set(vendor_ids[vendor]),
                amount: Set(cost_amount),
                description: Set(None),
                created_at: Set(now.clone()),
                ..Default::default()
            };
            outsource_cost::Entity::insert(cost_row).exec(db).await?;
        }
    }

    Ok(())
}
