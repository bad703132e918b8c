//! Tests for the in-memory model store used directly through `ModelStore`

use serde_json::json;

use repository_core::{InMemoryStore, ModelStore, Query};
use test_utils::{attributes, Article, ArticleFixtures, User, UserFixtures};

async fn store_with_users() -> InMemoryStore {
    let store = InMemoryStore::new();
    for fields in [UserFixtures::ada(), UserFixtures::grace(), UserFixtures::edsger()] {
        ModelStore::<User>::insert(&store, fields).await.unwrap();
    }
    store
}

mod writes {
    use super::*;

    #[tokio::test]
    async fn test_insert_generates_sequential_keys() {
        let store = store_with_users().await;

        let keys: Vec<i64> = ModelStore::<User>::fetch(&store, &Query::new())
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_generated_key_follows_highest_key() {
        let store = store_with_users().await;
        ModelStore::<User>::delete(&store, &3).await.unwrap();
        ModelStore::<User>::insert(&store, attributes(json!({"id": 10, "name": "Ten"})))
            .await
            .unwrap();

        let next: User = store.insert(UserFixtures::ada()).await.unwrap();
        assert_eq!(next.id, 11);
    }

    #[tokio::test]
    async fn test_key_generation_stops_at_highest_integer() {
        let store = InMemoryStore::new();
        ModelStore::<User>::insert(&store, attributes(json!({"id": i64::MAX, "name": "Last"})))
            .await
            .unwrap();

        let result = ModelStore::<User>::insert(&store, UserFixtures::ada()).await;

        assert!(result.unwrap_err().is_constraint_violation());
        assert_eq!(store.row_count("users").await, 1);

        // The table stays writable after the rejected insert
        let explicit: User = store
            .insert(attributes(json!({"id": 5, "name": "Five"})))
            .await
            .unwrap();
        assert_eq!(explicit.id, 5);
    }

    #[tokio::test]
    async fn test_insert_drops_unknown_attributes() {
        let store = InMemoryStore::new();

        let user: User = store
            .insert(attributes(json!({"name": "Ada", "nickname": "Countess"})))
            .await
            .unwrap();

        let stored: Vec<User> = store
            .fetch(&Query::new().where_eq("nickname", "Countess"))
            .await
            .unwrap();
        assert!(stored.is_empty());
        assert_eq!(user.name, "Ada");
    }

    #[tokio::test]
    async fn test_update_reports_missing_rows() {
        let store = store_with_users().await;

        let updated = ModelStore::<User>::update(&store, &99, attributes(json!({"name": "X"})))
            .await
            .unwrap();
        assert!(!updated);

        let empty = InMemoryStore::new();
        let updated = ModelStore::<User>::update(&empty, &1, attributes(json!({"name": "X"})))
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_row_untouched() {
        let store = store_with_users().await;

        let result =
            ModelStore::<User>::update(&store, &1, attributes(json!({"active": "sometimes"}))).await;
        assert!(result.unwrap_err().is_constraint_violation());

        let ada: Option<User> = store.find(&1).await.unwrap();
        assert!(!ada.unwrap().active);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_row_existed() {
        let store = store_with_users().await;

        assert!(ModelStore::<User>::delete(&store, &2).await.unwrap());
        assert!(!ModelStore::<User>::delete(&store, &2).await.unwrap());
        assert_eq!(store.row_count("users").await, 2);
    }

    #[tokio::test]
    async fn test_truncate_clears_one_table() {
        let store = store_with_users().await;
        ModelStore::<Article>::insert(&store, ArticleFixtures::draft(1))
            .await
            .unwrap();

        store.truncate("users").await;

        assert_eq!(store.row_count("users").await, 0);
        assert_eq!(store.row_count("articles").await, 1);
    }
}

mod reads {
    use super::*;

    #[tokio::test]
    async fn test_fetch_applies_offset_then_limit() {
        let store = store_with_users().await;

        let window: Vec<User> = store
            .fetch(&Query::new().offset(1).limit(1))
            .await
            .unwrap();

        assert_eq!(window.len(), 1);
        assert_eq!(window[0].name, "Grace");
    }

    #[tokio::test]
    async fn test_offset_past_end_is_empty() {
        let store = store_with_users().await;

        let window: Vec<User> = store.fetch(&Query::new().offset(10)).await.unwrap();
        assert!(window.is_empty());
    }

    #[tokio::test]
    async fn test_count_ignores_window() {
        let store = store_with_users().await;

        let query = Query::new().where_eq("role", "admin").limit(1);
        let count = ModelStore::<User>::count(&store, &query).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_reads_on_unknown_table_are_empty() {
        let store = InMemoryStore::new();

        let rows: Vec<User> = store.fetch(&Query::new()).await.unwrap();
        let count = ModelStore::<User>::count(&store, &Query::new()).await.unwrap();
        let found: Option<User> = store.find(&1).await.unwrap();

        assert!(rows.is_empty());
        assert_eq!(count, 0);
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_text_keys_sort_lexically() {
        let store = InMemoryStore::new();
        let first = ModelStore::<Article>::insert(&store, ArticleFixtures::draft(1))
            .await
            .unwrap();
        let second = ModelStore::<Article>::insert(&store, ArticleFixtures::draft(2))
            .await
            .unwrap();

        let mut expected = vec![first.id.to_string(), second.id.to_string()];
        expected.sort();

        let articles: Vec<Article> = store.fetch(&Query::new()).await.unwrap();
        let actual: Vec<String> = articles.iter().map(|a| a.id.to_string()).collect();
        assert_eq!(actual, expected);
    }
}

mod constraints {
    use super::*;

    #[tokio::test]
    async fn test_constraints_are_scoped_to_their_table() {
        let store = InMemoryStore::new().require("articles", &["title"]);

        let user: User = store.insert(UserFixtures::ada()).await.unwrap();
        assert_eq!(user.email, None);
    }

    #[tokio::test]
    async fn test_constraints_survive_clone() {
        let store = InMemoryStore::new().unique("users", &["email"]);
        let shared = store.clone();

        ModelStore::<User>::insert(&store, UserFixtures::grace())
            .await
            .unwrap();
        let result = ModelStore::<User>::insert(&shared, UserFixtures::grace()).await;

        assert!(result.unwrap_err().is_constraint_violation());
    }

    #[tokio::test]
    async fn test_unique_allows_updating_own_row() {
        let store = InMemoryStore::new().unique("users", &["email"]);
        ModelStore::<User>::insert(&store, UserFixtures::grace())
            .await
            .unwrap();

        let updated = ModelStore::<User>::update(
            &store,
            &1,
            attributes(json!({"email": "grace@example.com", "active": false})),
        )
        .await
        .unwrap();
        assert!(updated);
    }

    #[tokio::test]
    async fn test_duplicate_text_key_is_rejected() {
        let store = InMemoryStore::new();
        let fields = ArticleFixtures::published(1);

        ModelStore::<Article>::insert(&store, fields.clone())
            .await
            .unwrap();
        let result = ModelStore::<Article>::insert(&store, fields).await;

        assert!(result.unwrap_err().is_constraint_violation());
    }
}
