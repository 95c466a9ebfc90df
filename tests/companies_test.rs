//! Integration tests for the company directory

mod common;

use common::{database::*, fixtures::*};
use unsaid::company;
use unsaid::error::Error;
use unsaid::moderation::ModerationRules;
use unsaid::orm::posts::Sentiment;
use unsaid::post_lifecycle;

async fn post_with(
    db: &sea_orm::DatabaseConnection,
    company_id: i32,
    author_id: i32,
    category: &str,
    sentiment: Sentiment,
) {
    let mut post = new_post(company_id);
    post.primary_category = category.to_string();
    post.sub_category = None;
    post.sentiment = sentiment;
    post_lifecycle::create(db, &ModerationRules::default(), Some(author_id), post, t0())
        .await
        .expect("Failed to create post");
}

#[actix_rt::test]
async fn test_create_company_slug_and_trim() {
    let db = setup_test_database().await.expect("Failed to set up database");

    let created = company::create(
        &db,
        "  Globex Industries  ",
        Some("  Manufacturing ".to_string()),
        Some("   ".to_string()),
        None,
        t0(),
    )
    .await
    .unwrap();

    assert_eq!(created.name, "Globex Industries");
    assert_eq!(created.slug, "globex-industries");
    assert_eq!(created.industry.as_deref(), Some("Manufacturing"));
    assert_eq!(created.location, None);

    let found = company::find_by_slug(&db, "globex-industries").await.unwrap();
    assert_eq!(found.id, created.id);
}

#[actix_rt::test]
async fn test_create_company_requires_name() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let result = company::create(&db, "   ", None, None, None, t0()).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[actix_rt::test]
async fn test_duplicate_company_conflicts_with_existing_id() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let original = create_test_company(&db, "Acme Corp").await;

    for name in ["acme corp", "ACME CORP", "Acme-Corp"] {
        match company::create(&db, name, None, None, None, t0()).await {
            Err(Error::Conflict { existing_id, .. }) => {
                assert_eq!(existing_id, Some(original.id), "name {:?}", name)
            }
            other => panic!("Expected conflict for {:?}, got {:?}", name, other),
        }
    }
}

#[actix_rt::test]
async fn test_find_unknown_slug() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let result = company::find_by_slug(&db, "nope").await;
    assert!(matches!(result, Err(Error::CompanyNotFound)));
}

#[actix_rt::test]
async fn test_search() {
    let db = setup_test_database().await.expect("Failed to set up database");
    create_test_company(&db, "Acme Corp").await;
    create_test_company(&db, "Acme Labs").await;
    create_test_company(&db, "Initech").await;

    assert!(company::search(&db, "a").await.unwrap().is_empty());
    assert!(company::search(&db, "  ").await.unwrap().is_empty());

    let found = company::search(&db, "ACME").await.unwrap();
    let names: Vec<&str> = found.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Acme Labs", "Acme Corp"]);

    let found = company::search(&db, "tech").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Initech");
}

#[actix_rt::test]
async fn test_search_treats_wildcards_literally() {
    let db = setup_test_database().await.expect("Failed to set up database");
    create_test_company(&db, "Data_Lab").await;
    create_test_company(&db, "Datablab").await;
    create_test_company(&db, "Acme Corp").await;

    let found = company::search(&db, "a_l").await.unwrap();
    let names: Vec<&str> = found.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Data_Lab"]);

    assert!(company::search(&db, "%%").await.unwrap().is_empty());
    assert!(company::search(&db, "b_").await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_list_with_post_counts() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let (acme, author, _post) = seed_post(&db).await;
    create_test_post(&db, acme.id, author.id).await;
    let initech = create_test_company(&db, "Initech").await;

    let listed = company::list(&db, 20).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].company.id, initech.id);
    assert_eq!(listed[0].post_count, 0);
    assert_eq!(listed[1].company.id, acme.id);
    assert_eq!(listed[1].post_count, 2);

    assert_eq!(company::list(&db, 1).await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_stats_over_visible_posts() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let acme = create_test_company(&db, "Acme Corp").await;
    let author = create_test_user(&db, "author-uid").await;

    post_with(&db, acme.id, author.id, "wlb", Sentiment::Negative).await;
    post_with(&db, acme.id, author.id, "wlb", Sentiment::Negative).await;
    post_with(&db, acme.id, author.id, "manager", Sentiment::Positive).await;

    // Not yet published: nothing counts.
    let stats = company::stats(&db, "acme-corp", t0() + minutes(1)).await.unwrap();
    assert_eq!(stats.total_posts, 0);
    assert!(stats.top_categories.is_empty());

    let stats = company::stats(&db, "acme-corp", t0() + minutes(10)).await.unwrap();
    assert_eq!(stats.total_posts, 3);
    assert_eq!(stats.negative_percent, 67);
    assert_eq!(stats.positive_percent, 33);
    assert_eq!(stats.neutral_percent, 0);
    assert_eq!(stats.top_categories[0].category, "wlb");
    assert_eq!(stats.top_categories[0].count, 2);
    assert_eq!(stats.recent_activity, 3);

    let much_later = t0() + chrono::Duration::days(45);
    let stats = company::stats(&db, "acme-corp", much_later).await.unwrap();
    assert_eq!(stats.recent_activity, 0);
}

#[actix_rt::test]
async fn test_compare() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let acme = create_test_company(&db, "Acme Corp").await;
    let initech = create_test_company(&db, "Initech").await;
    let author = create_test_user(&db, "author-uid").await;

    post_with(&db, acme.id, author.id, "wlb", Sentiment::Positive).await;
    post_with(&db, initech.id, author.id, "salary", Sentiment::Negative).await;

    let slugs = vec![
        "initech".to_string(),
        "acme-corp".to_string(),
        "ghost".to_string(),
    ];
    let result = company::compare(&db, &slugs, t0() + minutes(10)).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].company.id, initech.id);
    assert_eq!(result[0].stats.culture_score, 0);
    assert_eq!(result[0].stats.negative_percentage, 100);
    assert_eq!(result[1].company.id, acme.id);
    assert_eq!(result[1].stats.culture_score, 100);
    assert_eq!(result[1].stats.sentiment_counts.positive, 1);
}

#[actix_rt::test]
async fn test_compare_bounds() {
    let db = setup_test_database().await.expect("Failed to set up database");
    create_test_company(&db, "Acme Corp").await;

    let one = vec!["acme-corp".to_string()];
    assert!(matches!(
        company::compare(&db, &one, t0()).await,
        Err(Error::InvalidInput(_))
    ));

    let five: Vec<String> = (0..5).map(|i| format!("c{}", i)).collect();
    assert!(matches!(
        company::compare(&db, &five, t0()).await,
        Err(Error::InvalidInput(_))
    ));

    let unresolved = vec!["acme-corp".to_string(), "ghost".to_string()];
    assert!(matches!(
        company::compare(&db, &unresolved, t0()).await,
        Err(Error::NotFound(_))
    ));
}
