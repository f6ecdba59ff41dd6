use rust_decimal::Decimal;
use sqlx::PgPool;
use storage::{
    dto::{
        athlete::AthleteFilter, category::CreateCategoryRequest,
        training_center::CreateTrainingCenterRequest,
    },
    error::StorageError,
    repository::{
        athlete::{AthleteRepository, NewAthlete, timestamp_now},
        category::CategoryRepository,
        training_center::TrainingCenterRepository,
    },
};
use uuid::Uuid;

async fn seed(pool: &PgPool, athletes: &[(&str, &str)]) {
    let category = CategoryRepository::new(pool)
        .create(&CreateCategoryRequest {
            name: "RX".to_string(),
        })
        .await
        .unwrap();
    let center = TrainingCenterRepository::new(pool)
        .create(&CreateTrainingCenterRequest {
            name: "CT King".to_string(),
            address: "Rua X, Q02".to_string(),
            owner: "Marcos".to_string(),
        })
        .await
        .unwrap();

    let repo = AthleteRepository::new(pool);
    for (name, cpf) in athletes {
        let now = timestamp_now();
        repo.insert(&NewAthlete {
            id: Uuid::new_v4(),
            name: name.to_string(),
            cpf: cpf.to_string(),
            weight: Decimal::new(70, 0),
            height: Decimal::new(175, 2),
            sex: "F".to_string(),
            created_at: now,
            updated_at: now,
            category_id: category.id,
            training_center_id: center.id,
        })
        .await
        .unwrap();
    }
}

fn filter(nome: Option<&str>, cpf: Option<&str>) -> AthleteFilter {
    AthleteFilter {
        nome: nome.map(str::to_string),
        cpf: cpf.map(str::to_string),
        ..AthleteFilter::default()
    }
}

#[sqlx::test]
#[ignore = "requires a Postgres server at DATABASE_URL"]
async fn test_cpf_filter_is_exact_substring(pool: PgPool) {
    seed(
        &pool,
        &[
            ("Ana", "11123000000"),
            ("Bia", "99999999123"),
            ("Caio", "12000000003"),
        ],
    )
    .await;

    let (athletes, total) = AthleteRepository::new(&pool)
        .list(&filter(None, Some("123")))
        .await
        .unwrap();

    let names: Vec<_> = athletes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Bia"]);
    assert_eq!(total, 2);
}

#[sqlx::test]
#[ignore = "requires a Postgres server at DATABASE_URL"]
async fn test_name_filter_is_case_sensitive_and_anded(pool: PgPool) {
    seed(
        &pool,
        &[
            ("Joana", "11111111111"),
            ("joaquim", "22222222222"),
            ("Joao", "33333333333"),
        ],
    )
    .await;

    let repo = AthleteRepository::new(&pool);

    let (athletes, _) = repo.list(&filter(Some("Jo"), None)).await.unwrap();
    assert_eq!(athletes.len(), 2);

    let (athletes, total) = repo
        .list(&filter(Some("Jo"), Some("333")))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(athletes[0].name, "Joao");
}

#[sqlx::test]
#[ignore = "requires a Postgres server at DATABASE_URL"]
async fn test_pagination_windows_results(pool: PgPool) {
    seed(
        &pool,
        &[
            ("A", "00000000001"),
            ("B", "00000000002"),
            ("C", "00000000003"),
        ],
    )
    .await;

    let page_two = AthleteFilter {
        page: 2,
        page_size: 2,
        ..AthleteFilter::default()
    };
    let (athletes, total) = AthleteRepository::new(&pool)
        .list(&page_two)
        .await
        .unwrap();

    assert_eq!(total, 3);
    assert_eq!(athletes.len(), 1);
    assert_eq!(athletes[0].name, "C");
}

#[sqlx::test]
#[ignore = "requires a Postgres server at DATABASE_URL"]
async fn test_unique_constraints_back_the_checks(pool: PgPool) {
    seed(&pool, &[("Ana", "11111111111")]).await;

    let duplicate = CategoryRepository::new(&pool)
        .create(&CreateCategoryRequest {
            name: "RX".to_string(),
        })
        .await;
    assert!(matches!(duplicate, Err(StorageError::Conflict(_))));

    let existing = AthleteRepository::new(&pool)
        .find_conflicting("Zed", "11111111111")
        .await
        .unwrap()
        .expect("cpf collision");
    assert_eq!(existing.name, "Ana");
}

#[sqlx::test]
#[ignore = "requires a Postgres server at DATABASE_URL"]
async fn test_insert_with_unknown_references_is_a_foreign_key_violation(pool: PgPool) {
    let now = timestamp_now();
    let result = AthleteRepository::new(&pool)
        .insert(&NewAthlete {
            id: Uuid::new_v4(),
            name: "Orfa".to_string(),
            cpf: "44444444444".to_string(),
            weight: Decimal::new(60, 0),
            height: Decimal::new(160, 2),
            sex: "F".to_string(),
            created_at: now,
            updated_at: now,
            category_id: Uuid::new_v4(),
            training_center_id: Uuid::new_v4(),
        })
        .await;

    let error = result.expect_err("insert must fail");
    assert!(error.is_foreign_key_violation());
    assert!(!error.is_unique_violation());
}

#[sqlx::test]
#[ignore = "requires a Postgres server at DATABASE_URL"]
async fn test_duplicate_cpf_insert_is_a_unique_violation(pool: PgPool) {
    seed(&pool, &[("Ana", "11111111111")]).await;
    let existing = AthleteRepository::new(&pool)
        .list(&AthleteFilter::default())
        .await
        .unwrap()
        .0
        .remove(0);

    let now = timestamp_now();
    let error = AthleteRepository::new(&pool)
        .insert(&NewAthlete {
            id: Uuid::new_v4(),
            name: "Outra".to_string(),
            cpf: existing.cpf.clone(),
            weight: existing.weight,
            height: existing.height,
            sex: existing.sex.clone(),
            created_at: now,
            updated_at: now,
            category_id: existing.category_id,
            training_center_id: existing.training_center_id,
        })
        .await
        .expect_err("duplicate cpf must fail");

    assert!(error.is_unique_violation());
}
