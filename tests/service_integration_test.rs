use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, Statement,
};

use uriage::db;
use uriage::domain::errors::DomainError;
use uriage::models::{customer, outsource, outsource_cost, sale, sale_item, sale_type};
use uriage::models::customer::CustomerDto;
use uriage::models::outsource::OutsourceDto;
use uriage::models::outsource_cost::OutsourceCostInput;
use uriage::models::sale::SaleDto;
use uriage::models::sale_type::{SaleTypeDto, UNCATEGORIZED_ID};
use uriage::services::{
    customer_service, outsource_service, sale_service, sale_type_service,
};
use uriage::services::sale_service::SaleFilter;

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    // In-memory SQLite for testing
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_customer(db: &DatabaseConnection, name: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let model = customer::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    customer::Entity::insert(model)
        .exec(db)
        .await
        .expect("Failed to create customer")
        .last_insert_id
}

async fn create_test_outsource(db: &DatabaseConnection, name: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let model = outsource::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    outsource::Entity::insert(model)
        .exec(db)
        .await
        .expect("Failed to create outsource")
        .last_insert_id
}

async fn create_test_sale(
    db: &DatabaseConnection,
    customer_id: i32,
    sale_date: &str,
    amount: i64,
    status: &str,
) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let model = sale::ActiveModel {
        customer_id: Set(customer_id),
        sale_date: Set(sale_date.to_string()),
        total_amount: Set(amount),
        sale_status: Set(status.to_string()),
        sale_type_id: Set(UNCATEGORIZED_ID),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    sale::Entity::insert(model)
        .exec(db)
        .await
        .expect("Failed to create sale")
        .last_insert_id
}

async fn create_test_cost(db: &DatabaseConnection, sale_id: i32, outsource_id: i32, amount: i64) {
    let model = outsource_cost::ActiveModel {
        sale_id: Set(sale_id),
        outsource_id: Set(outsource_id),
        amount: Set(amount),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };
    outsource_cost::Entity::insert(model)
        .exec(db)
        .await
        .expect("Failed to create cost");
}

async fn create_test_item(db: &DatabaseConnection, sale_id: i32, amount: i64) {
    let model = sale_item::ActiveModel {
        sale_id: Set(sale_id),
        description: Set("line item".to_string()),
        amount: Set(amount),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };
    sale_item::Entity::insert(model)
        .exec(db)
        .await
        .expect("Failed to create sale item");
}

fn sale_dto(customer_id: i32, sale_date: &str, amount: i64) -> SaleDto {
    SaleDto {
        customer_id,
        user_name: None,
        sale_date: sale_date.to_string(),
        delivery_date: None,
        total_amount: amount,
        sale_status: None,
        sale_type_id: None,
        source: None,
        notes: None,
        outsource_cost: None,
    }
}

#[tokio::test]
async fn migrations_seed_the_uncategorized_sale_type() {
    let db = setup_test_db().await;
    let sentinel = sale_type::Entity::find_by_id(UNCATEGORIZED_ID)
        .one(&db)
        .await
        .unwrap()
        .expect("sentinel row should exist");
    assert_eq!(sentinel.name, "Uncategorized");
}

#[tokio::test]
async fn customer_crud_round_trip() {
    let db = setup_test_db().await;

    let created = customer_service::create_customer(
        &db,
        CustomerDto {
            name: "  Acme Corp  ".to_string(),
            contact_person: Some("".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.name, "Acme Corp");
    assert_eq!(created.contact_person, None);

    let updated = customer_service::update_customer(
        &db,
        created.id,
        CustomerDto {
            name: "Acme KK".to_string(),
            contact_person: Some("Sato".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Acme KK");
    assert_eq!(updated.contact_person.as_deref(), Some("Sato"));

    let all = customer_service::list_customers(&db).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn customer_name_is_required() {
    let db = setup_test_db().await;
    let result = customer_service::create_customer(
        &db,
        CustomerDto {
            name: "   ".to_string(),
            contact_person: None,
        },
    )
    .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn deleting_a_customer_without_sales_needs_no_confirmation() {
    let db = setup_test_db().await;
    let id = create_test_customer(&db, "Solo").await;

    customer_service::delete_customer(&db, id, false)
        .await
        .unwrap();
    assert!(customer::Entity::find_by_id(id)
        .one(&db)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn deleting_a_customer_with_sales_requires_confirmation() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Busy Corp").await;
    create_test_sale(&db, customer_id, "2025-01-10", 1_000, "completed").await;
    create_test_sale(&db, customer_id, "2025-02-10", 2_000, "completed").await;

    let result = customer_service::delete_customer(&db, customer_id, false).await;
    assert!(matches!(result, Err(DomainError::ConfirmationRequired(2))));

    // nothing was deleted
    assert!(customer::Entity::find_by_id(customer_id)
        .one(&db)
        .await
        .unwrap()
        .is_some());
    assert_eq!(sale::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn confirmed_customer_delete_removes_sales_items_and_costs() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Departing Corp").await;
    let vendor_id = create_test_outsource(&db, "Vendor").await;
    let sale_id = create_test_sale(&db, customer_id, "2025-03-05", 10_000, "completed").await;
    create_test_item(&db, sale_id, 4_000).await;
    create_test_cost(&db, sale_id, vendor_id, 3_000).await;

    customer_service::delete_customer(&db, customer_id, true)
        .await
        .unwrap();

    assert_eq!(sale::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(sale_item::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(outsource_cost::Entity::find().count(&db).await.unwrap(), 0);
    assert!(customer::Entity::find_by_id(customer_id)
        .one(&db)
        .await
        .unwrap()
        .is_none());
    // the vendor itself survives
    assert!(outsource::Entity::find_by_id(vendor_id)
        .one(&db)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn failed_cascade_step_halts_before_deleting_the_customer() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Sticky Corp").await;
    let vendor_id = create_test_outsource(&db, "Vendor").await;
    let sale_id = create_test_sale(&db, customer_id, "2025-03-05", 10_000, "completed").await;
    create_test_cost(&db, sale_id, vendor_id, 3_000).await;

    // make the cost-row step fail mid-cascade
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "DROP TABLE outsource_costs".to_owned(),
    ))
    .await
    .unwrap();

    let result = customer_service::delete_customer(&db, customer_id, true).await;
    assert!(matches!(
        result,
        Err(DomainError::Cascade {
            step: "outsource_costs",
            ..
        })
    ));

    // the later steps never ran: the sale and the customer survive
    assert!(sale::Entity::find_by_id(sale_id)
        .one(&db)
        .await
        .unwrap()
        .is_some());
    assert!(customer::Entity::find_by_id(customer_id)
        .one(&db)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn deleting_a_sale_removes_its_items_and_costs() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;
    let vendor_id = create_test_outsource(&db, "Vendor").await;
    let sale_id = create_test_sale(&db, customer_id, "2025-03-05", 10_000, "completed").await;
    let other_sale = create_test_sale(&db, customer_id, "2025-03-06", 5_000, "completed").await;
    create_test_item(&db, sale_id, 4_000).await;
    create_test_cost(&db, sale_id, vendor_id, 3_000).await;
    create_test_cost(&db, other_sale, vendor_id, 1_000).await;

    sale_service::delete_sale(&db, sale_id).await.unwrap();

    assert!(sale::Entity::find_by_id(sale_id)
        .one(&db)
        .await
        .unwrap()
        .is_none());
    assert_eq!(sale_item::Entity::find().count(&db).await.unwrap(), 0);
    // only the deleted sale's cost rows are gone
    let remaining = outsource_cost::Entity::find().all(&db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].sale_id, other_sale);
}

#[tokio::test]
async fn deleting_a_missing_sale_reports_not_found() {
    let db = setup_test_db().await;
    let result = sale_service::delete_sale(&db, 999).await;
    assert!(matches!(result, Err(DomainError::NotFound)));
}

#[tokio::test]
async fn deleting_the_uncategorized_sale_type_is_refused() {
    let db = setup_test_db().await;
    let result = sale_type_service::delete_sale_type(&db, UNCATEGORIZED_ID).await;
    assert!(matches!(result, Err(DomainError::Precondition(_))));
    assert!(sale_type::Entity::find_by_id(UNCATEGORIZED_ID)
        .one(&db)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn deleting_a_sale_type_reassigns_its_sales() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;
    let design = sale_type_service::create_sale_type(
        &db,
        SaleTypeDto {
            name: "Design".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    let sale_id = create_test_sale(&db, customer_id, "2025-04-01", 7_000, "completed").await;
    let mut active: sale::ActiveModel = sale::Entity::find_by_id(sale_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap()
        .into();
    active.sale_type_id = Set(design.id);
    sea_orm::ActiveModelTrait::update(active, &db).await.unwrap();

    sale_type_service::delete_sale_type(&db, design.id)
        .await
        .unwrap();

    let reassigned = sale::Entity::find_by_id(sale_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reassigned.sale_type_id, UNCATEGORIZED_ID);
    assert!(sale_type::Entity::find_by_id(design.id)
        .one(&db)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn deleting_a_vendor_removes_its_cost_rows() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;
    let vendor_id = create_test_outsource(&db, "Vendor").await;
    let other_vendor = create_test_outsource(&db, "Other Vendor").await;
    let sale_id = create_test_sale(&db, customer_id, "2025-03-05", 10_000, "completed").await;
    create_test_cost(&db, sale_id, vendor_id, 3_000).await;
    create_test_cost(&db, sale_id, other_vendor, 500).await;

    outsource_service::delete_outsource(&db, vendor_id)
        .await
        .unwrap();

    assert!(outsource::Entity::find_by_id(vendor_id)
        .one(&db)
        .await
        .unwrap()
        .is_none());
    let remaining = outsource_cost::Entity::find().all(&db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].outsource_id, other_vendor);
    // the sale itself is untouched
    assert!(sale::Entity::find_by_id(sale_id)
        .one(&db)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn creating_a_sale_applies_defaults() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;

    let sale = sale_service::create_sale(&db, sale_dto(customer_id, "2025-03-05", 10_000))
        .await
        .unwrap();
    assert_eq!(sale.sale_status, "completed");
    assert_eq!(sale.sale_type_id, UNCATEGORIZED_ID);
}

#[tokio::test]
async fn creating_a_sale_validates_before_writing() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;

    let bad_date = sale_service::create_sale(&db, sale_dto(customer_id, "05/03/2025", 100)).await;
    assert!(matches!(bad_date, Err(DomainError::Validation(_))));

    let negative = sale_service::create_sale(&db, sale_dto(customer_id, "2025-03-05", -5)).await;
    assert!(matches!(negative, Err(DomainError::Validation(_))));

    let mut bad_status = sale_dto(customer_id, "2025-03-05", 100);
    bad_status.sale_status = Some("shipped".to_string());
    let result = sale_service::create_sale(&db, bad_status).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let missing_customer = sale_service::create_sale(&db, sale_dto(999, "2025-03-05", 100)).await;
    assert!(matches!(missing_customer, Err(DomainError::Validation(_))));

    assert_eq!(sale::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn sale_form_inserts_and_replaces_the_cost_row() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;
    let vendor_id = create_test_outsource(&db, "Vendor").await;
    let other_vendor = create_test_outsource(&db, "Other Vendor").await;

    let mut dto = sale_dto(customer_id, "2025-03-05", 10_000);
    dto.outsource_cost = Some(OutsourceCostInput {
        outsource_id: vendor_id,
        amount: 3_000,
        description: None,
    });
    let sale = sale_service::create_sale(&db, dto).await.unwrap();

    let costs = outsource_cost::Entity::find()
        .filter(outsource_cost::Column::SaleId.eq(sale.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(costs.len(), 1);
    assert_eq!(costs[0].amount, 3_000);

    // updating swaps the row for the new vendor and amount
    let mut dto = sale_dto(customer_id, "2025-03-05", 10_000);
    dto.outsource_cost = Some(OutsourceCostInput {
        outsource_id: other_vendor,
        amount: 4_500,
        description: Some("rush fee".to_string()),
    });
    sale_service::update_sale(&db, sale.id, dto).await.unwrap();

    let costs = outsource_cost::Entity::find()
        .filter(outsource_cost::Column::SaleId.eq(sale.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(costs.len(), 1);
    assert_eq!(costs[0].outsource_id, other_vendor);
    assert_eq!(costs[0].amount, 4_500);

    // a zero amount clears the cost entirely
    let mut dto = sale_dto(customer_id, "2025-03-05", 10_000);
    dto.outsource_cost = Some(OutsourceCostInput {
        outsource_id: other_vendor,
        amount: 0,
        description: None,
    });
    sale_service::update_sale(&db, sale.id, dto).await.unwrap();
    assert_eq!(outsource_cost::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn get_sale_annotates_cost_and_profit() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;
    let vendor_id = create_test_outsource(&db, "Vendor").await;
    let sale_id = create_test_sale(&db, customer_id, "2025-03-05", 10_000, "completed").await;
    create_test_cost(&db, sale_id, vendor_id, 3_000).await;

    let sale = sale_service::get_sale(&db, sale_id).await.unwrap();
    assert_eq!(sale.outsource_cost_total, 3_000);
    assert_eq!(sale.profit, 7_000);
    assert_eq!(sale.customer_name, "Customer");
    assert_eq!(sale.outsource_costs.len(), 1);
    assert_eq!(sale.outsource_costs[0].outsource_name, "Vendor");
    assert!(!sale.overdue);
}

#[tokio::test]
async fn overdue_flag_is_set_for_late_in_progress_sales() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;
    let now = chrono::Utc::now().to_rfc3339();
    let model = sale::ActiveModel {
        customer_id: Set(customer_id),
        sale_date: Set("2020-01-01".to_string()),
        delivery_date: Set(Some("2020-02-01".to_string())),
        total_amount: Set(1_000),
        sale_status: Set("in_progress".to_string()),
        sale_type_id: Set(UNCATEGORIZED_ID),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let sale_id = sale::Entity::insert(model)
        .exec(&db)
        .await
        .unwrap()
        .last_insert_id;

    let sale = sale_service::get_sale(&db, sale_id).await.unwrap();
    assert!(sale.overdue);
}

#[tokio::test]
async fn list_sales_filters_by_status_amount_and_date() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;
    create_test_sale(&db, customer_id, "2025-01-15", 1_000, "completed").await;
    create_test_sale(&db, customer_id, "2025-02-15", 5_000, "in_progress").await;
    create_test_sale(&db, customer_id, "2025-03-15", 20_000, "completed").await;

    let page = sale_service::list_sales(
        &db,
        SaleFilter {
            status: Some("completed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total_count, 2);

    let page = sale_service::list_sales(
        &db,
        SaleFilter {
            min_amount: Some(2_000),
            max_amount: Some(10_000),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.sales[0].total_amount, 5_000);

    let page = sale_service::list_sales(
        &db,
        SaleFilter {
            start_date: Some("2025-02-01".to_string()),
            end_date: Some("2025-02-28".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.sales[0].sale_date, "2025-02-15");
}

#[tokio::test]
async fn list_sales_filters_by_customer_name_substring() {
    let db = setup_test_db().await;
    let yamada = create_test_customer(&db, "Yamada Trading").await;
    let suzuki = create_test_customer(&db, "Suzuki Industries").await;
    create_test_sale(&db, yamada, "2025-01-15", 1_000, "completed").await;
    create_test_sale(&db, suzuki, "2025-01-16", 2_000, "completed").await;

    let page = sale_service::list_sales(
        &db,
        SaleFilter {
            customer_name: Some("AMADA".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.sales[0].customer_name, "Yamada Trading");

    // no matching customer short-circuits to an empty page
    let page = sale_service::list_sales(
        &db,
        SaleFilter {
            customer_name: Some("Nakamura".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total_count, 0);
    assert!(page.sales.is_empty());
}

#[tokio::test]
async fn list_sales_paginates_with_exact_counts() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;
    for day in 1..=15 {
        let date = format!("2025-03-{:02}", day);
        create_test_sale(&db, customer_id, &date, day as i64 * 100, "completed").await;
    }

    let page = sale_service::list_sales(&db, SaleFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 15);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.sales.len(), 10);
    // default sort is sale_date descending
    assert_eq!(page.sales[0].sale_date, "2025-03-15");

    let page = sale_service::list_sales(
        &db,
        SaleFilter {
            page: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.sales.len(), 5);

    let page = sale_service::list_sales(
        &db,
        SaleFilter {
            sort_field: Some("total_amount".to_string()),
            sort_order: Some("asc".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.sales[0].total_amount, 100);
}

#[tokio::test]
async fn complete_sale_sets_the_status() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;
    let sale_id = create_test_sale(&db, customer_id, "2025-03-05", 10_000, "in_progress").await;

    let sale = sale_service::complete_sale(&db, sale_id).await.unwrap();
    assert_eq!(sale.sale_status, "completed");

    let missing = sale_service::complete_sale(&db, 999).await;
    assert!(matches!(missing, Err(DomainError::NotFound)));
}

#[tokio::test]
async fn vendor_cost_rollup_groups_rows_per_vendor() {
    let db = setup_test_db().await;
    let customer_id = create_test_customer(&db, "Customer").await;
    let vendor_a = create_test_outsource(&db, "Vendor A").await;
    let vendor_b = create_test_outsource(&db, "Vendor B").await;
    let sale_1 = create_test_sale(&db, customer_id, "2025-03-05", 10_000, "completed").await;
    let sale_2 = create_test_sale(&db, customer_id, "2025-03-06", 20_000, "completed").await;
    create_test_cost(&db, sale_1, vendor_a, 3_000).await;
    create_test_cost(&db, sale_2, vendor_a, 2_000).await;
    create_test_cost(&db, sale_2, vendor_b, 1_500).await;

    let rollup = outsource_service::vendor_cost_rollup(&db).await.unwrap();
    assert_eq!(rollup.len(), 2);

    let a = rollup.iter().find(|v| v.id == vendor_a).unwrap();
    assert_eq!(a.total_cost, 5_000);
    assert_eq!(a.entries.len(), 2);
    assert_eq!(a.name, "Vendor A");

    let b = rollup.iter().find(|v| v.id == vendor_b).unwrap();
    assert_eq!(b.total_cost, 1_500);
    assert_eq!(b.entries[0].customer_name, "Customer");
    assert_eq!(b.entries[0].sale_total, 20_000);
}

#[tokio::test]
async fn create_outsource_trims_and_validates() {
    let db = setup_test_db().await;
    let result = outsource_service::create_outsource(
        &db,
        OutsourceDto {
            name: " ".to_string(),
            email: None,
            notes: None,
        },
    )
    .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let vendor = outsource_service::create_outsource(
        &db,
        OutsourceDto {
            name: " Print Shop ".to_string(),
            email: Some("".to_string()),
            notes: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(vendor.name, "Print Shop");
    assert_eq!(vendor.email, None);
}
