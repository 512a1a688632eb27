// Integration tests for the SQL device repository, run against SQLite.

#![cfg(not(feature = "postgres"))]


use fixtures::*;
use leafcast_db::{DbError, DeviceRepository, Repository};

#[tokio::test]
async fn test_create_is_idempotent_on_user_and_key() {
    let (client, repository) = create_test_repository().await;
    let device = create_test_device(7, "phoneA");

    let created = repository.create_device(device.clone()).await.unwrap();
    assert_eq!(created.id, Some(1));
    assert_eq!(created.user_id, 7);
    assert_eq!(created.key, "phoneA");
    assert_eq!(created.subscription, device.subscription);
    assert!(created.created_at.is_some());

    let again = repository.create_device(device).await.unwrap();
    assert_eq!(again, created);
    assert_eq!(count_rows(&client).await, 1);
}

#[tokio::test]
async fn test_create_returns_existing_device_unchanged() {
    let (client, repository) = create_test_repository().await;
    let created = repository
        .create_device(create_test_device(7, "phoneA"))
        .await
        .unwrap();

    // Same natural key, different subscription: the stored device wins.
    let mut other = create_test_device(7, "phoneA");
    other.subscription = create_test_subscription("somewhere-else");
    let again = repository.create_device(other).await.unwrap();

    assert_eq!(again, created);
    assert_eq!(count_rows(&client).await, 1);
}

#[tokio::test]
async fn test_create_rejects_invalid_device() {
    let (client, repository) = create_test_repository().await;

    let mut device = create_test_device(7, "phoneA");
    device.subscription.endpoint = "not a url".to_string();
    let err = repository.create_device(device).await.unwrap_err();
    assert!(matches!(err, DbError::ValidationError(_)));

    let err = repository
        .create_device(create_test_device(7, ""))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ValidationError(_)));

    assert_eq!(count_rows(&client).await, 0);
}

#[tokio::test]
async fn test_get_by_id_returns_created_device() {
    let (_client, repository) = create_test_repository().await;
    let created = repository
        .create_device(create_test_device(7, "phoneA"))
        .await
        .unwrap();

    let found = repository
        .get_device_by_id(created.id.unwrap())
        .await
        .unwrap();
    assert_eq!(found, Some(created));

    assert_eq!(repository.get_device_by_id(42).await.unwrap(), None);
}

#[tokio::test]
async fn test_get_by_user_and_key_absent() {
    let (_client, repository) = create_test_repository().await;
    repository
        .create_device(create_test_device(7, "phoneA"))
        .await
        .unwrap();

    let found = repository
        .get_device_by_user_and_key(7, "phoneB")
        .await
        .unwrap();
    assert_eq!(found, None);

    let found = repository
        .get_device_by_user_and_key(8, "phoneA")
        .await
        .unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn test_list_skips_corrupted_subscriptions() {
    let (client, repository) = create_test_repository().await;
    seed_device(&client, 10, 7, "phoneA").await;
    seed_device(&client, 11, 7, "phoneB").await;
    seed_device(&client, 12, 7, "phoneC").await;
    seed_device(&client, 13, 8, "phoneA").await;
    corrupt_subscription(&client, 11, "{not json").await;

    let mut ids: Vec<i64> = repository
        .get_devices_by_user(7)
        .await
        .unwrap()
        .into_iter()
        .filter_map(|device| device.id)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![10, 12]);

    // Counting looks at rows, not at their validity
    assert_eq!(repository.count_devices_by_user(7).await.unwrap(), 3);
    assert_eq!(repository.count_devices_by_user(9).await.unwrap(), 0);
    assert!(repository.get_devices_by_user(9).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_point_read_of_corrupted_subscription_fails() {
    let (client, repository) = create_test_repository().await;
    seed_device(&client, 11, 7, "phoneB").await;
    corrupt_subscription(&client, 11, r#"{"endpoint":"https://push.example.com"}"#).await;

    let err = repository.get_device_by_id(11).await.unwrap_err();
    assert!(matches!(err, DbError::ValidationError(_)));

    let err = repository
        .get_device_by_user_and_key(7, "phoneB")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ValidationError(_)));
}

#[tokio::test]
async fn test_delete_missing_device_is_not_found() {
    let (_client, repository) = create_test_repository().await;

    let mut device = create_test_device(7, "phoneA");
    device.id = Some(99);
    let err = repository.delete_device(&device).await.unwrap_err();
    assert!(err.is_not_found());

    let unsaved = create_test_device(7, "phoneA");
    let err = repository.delete_device(&unsaved).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_removes_device() {
    let (_client, repository) = create_test_repository().await;
    let created = repository
        .create_device(create_test_device(7, "phoneA"))
        .await
        .unwrap();

    repository.delete_device(&created).await.unwrap();
    assert_eq!(
        repository.get_device_by_id(created.id.unwrap()).await.unwrap(),
        None
    );

    let err = repository.delete_device(&created).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_many_is_scoped_to_owner() {
    let (client, repository) = create_test_repository().await;
    seed_device(&client, 10, 7, "phoneA").await;
    seed_device(&client, 11, 7, "phoneB").await;
    seed_device(&client, 12, 7, "phoneC").await;
    seed_device(&client, 13, 8, "phoneA").await;

    let removed = repository
        .delete_devices(7, &[10, 11, 12, 13])
        .await
        .unwrap();
    assert_eq!(removed, 3);

    assert!(repository.get_device_by_id(13).await.unwrap().is_some());
    assert!(repository.get_devices_by_user(7).await.unwrap().is_empty());
    assert_eq!(count_rows(&client).await, 1);
}

#[tokio::test]
async fn test_delete_many_without_matches() {
    let (client, repository) = create_test_repository().await;
    seed_device(&client, 13, 8, "phoneA").await;

    assert_eq!(repository.delete_devices(7, &[]).await.unwrap(), 0);
    assert_eq!(repository.delete_devices(7, &[13, 14]).await.unwrap(), 0);
    assert_eq!(count_rows(&client).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_create_leaves_one_row() {
    let (client, repository) = create_test_repository().await;
    let device = create_test_device(7, "phoneC");

    let (first, second) = tokio::join!(
        repository.create_device(device.clone()),
        repository.create_device(device.clone()),
    );

    let first = first.unwrap();
    let second = second.unwrap();
    assert!(first.id.is_some());
    assert_eq!(first, second);
    assert_eq!(count_rows(&client).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_on_shared_file_database() {
    const ROUNDS: usize = 20;
    const CREATES_PER_KEY: usize = 4;

    let dir = tempfile::tempdir().unwrap();
    let (client, repository) = create_file_repository(&dir.path().join("devices.db"), 5).await;

    for round in 0..ROUNDS {
        let device = create_test_device(7, &format!("phone{}", round));

        let handles: Vec<_> = (0..CREATES_PER_KEY)
            .map(|_| {
                let repository = repository.clone();
                let device = device.clone();
                tokio::spawn(async move { repository.create_device(device).await })
            })
            .collect();

        let mut ids = Vec::with_capacity(CREATES_PER_KEY);
        for handle in handles {
            let created = handle
                .await
                .unwrap()
                .unwrap_or_else(|e| panic!("round {}: create failed: {}", round, e));
            ids.push(created.id.unwrap());
        }
        assert!(
            ids.iter().all(|id| *id == ids[0]),
            "round {}: ids differ: {:?}",
            round,
            ids
        );
    }

    assert_eq!(count_rows(&client).await, ROUNDS as i64);
    assert_eq!(
        repository.count_devices_by_user(7).await.unwrap(),
        ROUNDS as i64
    );
}

#[tokio::test]
async fn test_generic_repository_interface() {
    let (_client, repository) = create_test_repository().await;

    let created = Repository::create(&repository, create_test_device(7, "phoneA"))
        .await
        .unwrap();
    let id = created.id.unwrap();

    assert_eq!(Repository::read(&repository, id).await.unwrap(), Some(created));
    assert!(Repository::delete(&repository, id).await.unwrap());
    assert!(!Repository::delete(&repository, id).await.unwrap());
    assert_eq!(Repository::read(&repository, id).await.unwrap(), None);
}
