use tracing::info;

use crate::error::ApiError;
use crate::recycle::dto::{CreateBoxRequest, UpdateBoxRequest};
use crate::recycle::repo::{self, RecycleBox};
use crate::state::AppState;

pub async fn create_box(state: &AppState, req: CreateBoxRequest) -> Result<RecycleBox, ApiError> {
    if req.capacity <= 0 {
        return Err(ApiError::InvalidCapacity);
    }
    let created = repo::insert(&state.db, &req).await?;
    info!(box_id = %created.id, capacity = %created.capacity, "recycle box created");
    Ok(created)
}

pub async fn get_box(state: &AppState, id: i64) -> Result<RecycleBox, ApiError> {
    repo::get(&state.db, id).await
}

pub async fn update_box(
    state: &AppState,
    id: i64,
    req: UpdateBoxRequest,
) -> Result<RecycleBox, ApiError> {
    if req.capacity <= 0 {
        return Err(ApiError::InvalidCapacity);
    }
    if req.count < 0 || req.count > req.capacity {
        return Err(ApiError::InvalidUpdate);
    }
    repo::update(&state.db, id, &req).await
}

pub async fn add_bottle(state: &AppState, id: i64) -> Result<RecycleBox, ApiError> {
    repo::add_bottle(&state.db, id).await
}

pub async fn add_bottle_with_points(
    state: &AppState,
    box_id: i64,
    user_id: i64,
) -> Result<RecycleBox, ApiError> {
    let updated = repo::add_bottle_with_points(&state.db, box_id, user_id).await?;
    info!(box_id = %box_id, user_id = %user_id, "bottle deposited with reward");
    Ok(updated)
}

pub async fn flush_box(state: &AppState, id: i64) -> Result<RecycleBox, ApiError> {
    let flushed = repo::flush(&state.db, id).await?;
    info!(box_id = %id, "recycle box flushed");
    Ok(flushed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo as users_repo;

    fn box_request(capacity: i64) -> CreateBoxRequest {
        CreateBoxRequest {
            title: "Main street".into(),
            address: "1 Main St".into(),
            capacity,
        }
    }

    async fn seeded_user(state: &AppState) -> i64 {
        users_repo::insert(&state.db, "depositor@x.com", "irrelevant-hash")
            .await
            .expect("insert user")
    }

    #[tokio::test]
    async fn created_box_starts_empty() {
        let state = AppState::test().await;
        let created = create_box(&state, box_request(10)).await.expect("create");
        assert_eq!(created.count, 0);
        assert_eq!(created.capacity, 10);
    }

    #[tokio::test]
    async fn non_positive_capacity_is_rejected() {
        let state = AppState::test().await;
        for capacity in [0, -3] {
            let err = create_box(&state, box_request(capacity)).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidCapacity));
        }
    }

    #[tokio::test]
    async fn missing_box_is_not_found() {
        let state = AppState::test().await;
        assert!(matches!(
            get_box(&state, 999).await.unwrap_err(),
            ApiError::NotFound
        ));
        assert!(matches!(
            add_bottle(&state, 999).await.unwrap_err(),
            ApiError::NotFound
        ));
    }

    #[tokio::test]
    async fn update_overwrites_every_field() {
        let state = AppState::test().await;
        let created = create_box(&state, box_request(10)).await.expect("create");
        let updated = update_box(
            &state,
            created.id,
            UpdateBoxRequest {
                title: "Harbour".into(),
                address: "2 Quay Rd".into(),
                capacity: 5,
                count: 3,
            },
        )
        .await
        .expect("update");
        assert_eq!(updated.title, "Harbour");
        assert_eq!(updated.address, "2 Quay Rd");
        assert_eq!(updated.capacity, 5);
        assert_eq!(updated.count, 3);
    }

    #[tokio::test]
    async fn update_cannot_overfill_the_box() {
        let state = AppState::test().await;
        let created = create_box(&state, box_request(4)).await.expect("create");
        let err = update_box(
            &state,
            created.id,
            UpdateBoxRequest {
                title: created.title.clone(),
                address: created.address.clone(),
                capacity: 4,
                count: 5,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUpdate));
    }

    #[tokio::test]
    async fn deposits_stop_at_capacity() {
        let state = AppState::test().await;
        let created = create_box(&state, box_request(2)).await.expect("create");

        assert_eq!(add_bottle(&state, created.id).await.expect("first").count, 1);
        assert_eq!(add_bottle(&state, created.id).await.expect("second").count, 2);

        let err = add_bottle(&state, created.id).await.unwrap_err();
        assert!(matches!(err, ApiError::BoxFull));
        // The rejected deposit left the count alone.
        assert_eq!(get_box(&state, created.id).await.expect("get").count, 2);
    }

    #[tokio::test]
    async fn concurrent_deposits_at_capacity_minus_one_admit_exactly_one() {
        let state = AppState::test().await;
        let created = create_box(&state, box_request(1)).await.expect("create");

        let (first, second) = tokio::join!(
            add_bottle(&state, created.id),
            add_bottle(&state, created.id)
        );
        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let full = [first, second]
            .into_iter()
            .filter_map(|r| r.err())
            .filter(|e| matches!(e, ApiError::BoxFull))
            .count();
        assert_eq!(full, 1);
        assert_eq!(get_box(&state, created.id).await.expect("get").count, 1);
    }

    #[tokio::test]
    async fn rewarded_deposit_credits_exactly_one_hundred_points() {
        let state = AppState::test().await;
        let user_id = seeded_user(&state).await;
        let created = create_box(&state, box_request(3)).await.expect("create");

        let updated = add_bottle_with_points(&state, created.id, user_id)
            .await
            .expect("deposit");
        assert_eq!(updated.count, 1);

        let user = users_repo::find_by_id(&state.db, user_id)
            .await
            .expect("query")
            .expect("row");
        assert_eq!(user.points, 100);
    }

    #[tokio::test]
    async fn failed_rewarded_deposit_leaves_points_alone() {
        let state = AppState::test().await;
        let user_id = seeded_user(&state).await;
        let created = create_box(&state, box_request(1)).await.expect("create");
        add_bottle(&state, created.id).await.expect("fill");

        let err = add_bottle_with_points(&state, created.id, user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BoxFull));

        let missing_box = add_bottle_with_points(&state, 999, user_id)
            .await
            .unwrap_err();
        assert!(matches!(missing_box, ApiError::NotFound));

        let user = users_repo::find_by_id(&state.db, user_id)
            .await
            .expect("query")
            .expect("row");
        assert_eq!(user.points, 0);
    }

    #[tokio::test]
    async fn rewarded_deposit_for_unknown_user_rolls_back_the_count() {
        let state = AppState::test().await;
        let created = create_box(&state, box_request(3)).await.expect("create");

        let err = add_bottle_with_points(&state, created.id, 999)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(get_box(&state, created.id).await.expect("get").count, 0);
    }

    #[tokio::test]
    async fn flush_resets_the_count() {
        let state = AppState::test().await;
        let created = create_box(&state, box_request(3)).await.expect("create");
        add_bottle(&state, created.id).await.expect("one");
        add_bottle(&state, created.id).await.expect("two");

        let flushed = flush_box(&state, created.id).await.expect("flush");
        assert_eq!(flushed.count, 0);
        assert_eq!(flushed.capacity, 3);
    }
}
