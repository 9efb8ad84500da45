//! Synchronous payable and assignor operations over SQLite

mod common;

use common::{Harness, START_MILLIS};
use payables_core::application::AssignorService;
use payables_core::domain::{NewAssignor, Page, PayableDraft, PayableFilter, PayablePatch};
use payables_core::ErrorKind;

#[tokio::test]
async fn test_create_read_update_remove() {
    let h = Harness::in_memory().await;
    h.register_assignor("A").await;
    h.register_assignor("B").await;
    let service = h.payable_service("api");

    let created = service
        .create(PayableDraft::new("A", "2024-07-01", 12_345))
        .await
        .unwrap();
    assert_eq!(created.created_at, START_MILLIS);
    assert_eq!(created.created_by, "api");
    assert_eq!(service.find_one(&created.id).await.unwrap(), Some(created.clone()));

    h.clock.advance(500);
    let updated = service
        .update(
            &created.id,
            PayablePatch {
                assignor_id: Some("B".to_string()),
                value_in_cents: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.assignor_id, "B");
    assert_eq!(updated.value_in_cents, 1);
    assert_eq!(updated.emission_date, "2024-07-01");
    assert_eq!(updated.updated_at, START_MILLIS + 500);
    assert_eq!(service.find_one(&created.id).await.unwrap(), Some(updated));

    service.remove(&created.id).await.unwrap();
    assert!(service.find_one(&created.id).await.unwrap().is_none());

    let err = service.remove(&created.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.public_message(), "payable not found");

    let err = service
        .update(&created.id, PayablePatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_and_reassign_require_existing_assignor() {
    let h = Harness::in_memory().await;
    h.register_assignor("A").await;
    let service = h.payable_service("api");

    let err = service
        .create(PayableDraft::new("ghost", "2024-07-01", 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.public_message(), "assignor does not exist");

    let p = service
        .create(PayableDraft::new("A", "2024-07-01", 1))
        .await
        .unwrap();
    let err = service
        .update(
            &p.id,
            PayablePatch {
                assignor_id: Some("ghost".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_find_all_pagination_over_sqlite() {
    let h = Harness::in_memory().await;
    h.register_assignor("A").await;
    h.register_assignor("B").await;
    let service = h.payable_service("api");

    for i in 0..7u64 {
        let assignor = if i < 5 { "A" } else { "B" };
        service
            .create(PayableDraft::new(assignor, "2024-07-01", i))
            .await
            .unwrap();
        h.clock.advance(1);
    }

    let filter = PayableFilter {
        assignor_id: Some("A".to_string()),
    };
    let page_two = service
        .find_all(filter.clone(), Page::new(2, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(
        page_two.iter().map(|p| p.value_in_cents).collect::<Vec<_>>(),
        vec![2, 3]
    );

    let page_three = service
        .find_all(filter, Page::new(3, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(page_three.len(), 1);

    let everything = service
        .find_all(PayableFilter::default(), Page::default())
        .await
        .unwrap();
    assert_eq!(everything.len(), 7);
}

#[tokio::test]
async fn test_assignor_registry_lifecycle() {
    let h = Harness::in_memory().await;
    let registry = AssignorService::new(h.assignors.clone(), h.ids.clone(), h.clock.clone());

    let assignor = registry
        .register(NewAssignor {
            document: "12345678900".to_string(),
            email: "billing@acme.test".to_string(),
            phone: "5511988887777".to_string(),
            name: "Acme".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(
        registry.find_one(&assignor.id).await.unwrap(),
        Some(assignor.clone())
    );

    let service = h.payable_service("api");
    service
        .create(PayableDraft::new(assignor.id.clone(), "2024-07-01", 1))
        .await
        .unwrap();

    registry.remove(&assignor.id).await.unwrap();
    assert!(registry.find_one(&assignor.id).await.unwrap().is_none());

    let err = h
        .pipeline
        .batch_create(vec![PayableDraft::new(assignor.id.clone(), "2024-07-02", 2)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = registry.remove(&assignor.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
