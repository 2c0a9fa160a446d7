//! Property-based tests for the reconciliation engine.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use corkboard_shared::types::{AttachmentId, PostId};

use super::policy::PolicyCatalog;
use super::service::AttachmentService;
use super::testkit::{MockRepository, MockStore};
use super::types::{EditExistingRequest, ThumbnailAction};

/// Strategy for a post's current attachment id set.
fn arb_owned_ids() -> impl Strategy<Value = BTreeSet<i64>> {
    prop::collection::btree_set(1i64..50, 0..12)
}

/// Strategy for a survivor request, biased towards ids that may or may
/// not be owned by the post.
fn arb_survivors() -> impl Strategy<Value = BTreeSet<i64>> {
    prop::collection::btree_set(1i64..60, 0..12)
}

fn arb_thumbnail_action() -> impl Strategy<Value = ThumbnailAction> {
    prop_oneof![
        Just(ThumbnailAction::NoChange),
        Just(ThumbnailAction::Clear),
        (1i64..60).prop_map(|raw| ThumbnailAction::SetTo(AttachmentId::from_i64(raw))),
    ]
}

fn setup(owned: &BTreeSet<i64>) -> (Arc<MockRepository>, AttachmentService<MockRepository, MockStore>) {
    let repo = Arc::new(MockRepository::new());
    let post = PostId::from_i64(1);
    for &raw in owned {
        repo.seed_attachment(post, AttachmentId::from_i64(raw));
    }
    let service = AttachmentService::new(
        Arc::clone(&repo),
        Arc::new(MockStore::new()),
        PolicyCatalog::default(),
    );
    (repo, service)
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// After a successful reconcile the stored set is exactly the
    /// intersection of the owned set and the survivor request, and the
    /// deleted set is its complement.
    #[test]
    fn prop_stored_set_equals_survivor_intersection(
        owned in arb_owned_ids(),
        survivors in arb_survivors(),
    ) {
        let (repo, service) = setup(&owned);
        let post = PostId::from_i64(1);
        let request = EditExistingRequest {
            survivors: survivors.iter().copied().map(AttachmentId::from_i64).collect(),
            thumbnail: ThumbnailAction::NoChange,
        };

        let result = block_on(service.reconcile_existing(post, request)).unwrap();

        let expected_kept: BTreeSet<i64> =
            owned.intersection(&survivors).copied().collect();
        let kept: BTreeSet<i64> = repo
            .ids_for(post)
            .into_iter()
            .map(AttachmentId::into_inner)
            .collect();
        prop_assert_eq!(kept, expected_kept);

        let deleted: BTreeSet<i64> = result
            .deleted
            .into_iter()
            .map(AttachmentId::into_inner)
            .collect();
        let expected_deleted: BTreeSet<i64> =
            owned.difference(&survivors).copied().collect();
        prop_assert_eq!(deleted, expected_deleted);
    }

    /// Reconciling twice with the same request leaves the same end state
    /// and performs no work on the second pass.
    #[test]
    fn prop_reconcile_idempotent(
        owned in arb_owned_ids(),
        survivors in arb_survivors(),
        action in arb_thumbnail_action(),
    ) {
        let (repo, service) = setup(&owned);
        let post = PostId::from_i64(1);
        let request = EditExistingRequest {
            survivors: survivors.iter().copied().map(AttachmentId::from_i64).collect(),
            thumbnail: action,
        };

        let first = block_on(service.reconcile_existing(post, request.clone()));
        prop_assume!(first.is_ok());
        let state_after_first = repo.ids_for(post);
        let thumb_after_first = repo.thumbnail_for(post);

        // A SetTo target may have been deleted by the first pass; in that
        // case the second pass legitimately fails instead of repeating.
        let second = block_on(service.reconcile_existing(post, request));
        if let Ok(second) = second {
            prop_assert!(second.deleted.is_empty());
            prop_assert!(!second.thumbnail_changed);
            prop_assert_eq!(repo.ids_for(post), state_after_first);
            prop_assert_eq!(repo.thumbnail_for(post), thumb_after_first);
        }
    }

    /// A failed SetTo leaves the attachment set and thumbnail untouched.
    #[test]
    fn prop_failed_set_to_mutates_nothing(
        owned in arb_owned_ids(),
        survivors in arb_survivors(),
        target in 1i64..60,
    ) {
        prop_assume!(!owned.is_empty());
        prop_assume!(!owned.contains(&target));

        let (repo, service) = setup(&owned);
        let post = PostId::from_i64(1);
        let seed_thumb = *owned.iter().next().unwrap();
        repo.seed_thumbnail(post, AttachmentId::from_i64(seed_thumb));

        let request = EditExistingRequest {
            survivors: survivors.iter().copied().map(AttachmentId::from_i64).collect(),
            thumbnail: ThumbnailAction::SetTo(AttachmentId::from_i64(target)),
        };

        let result = block_on(service.reconcile_existing(post, request));
        prop_assert!(result.is_err());

        let kept: BTreeSet<i64> = repo
            .ids_for(post)
            .into_iter()
            .map(AttachmentId::into_inner)
            .collect();
        prop_assert_eq!(kept, owned);
        prop_assert_eq!(
            repo.thumbnail_for(post).unwrap().attachment_id,
            AttachmentId::from_i64(seed_thumb)
        );
    }

    /// An empty owned set makes every request a no-op success.
    #[test]
    fn prop_empty_post_always_noop(
        survivors in arb_survivors(),
        action in arb_thumbnail_action(),
    ) {
        let (repo, service) = setup(&BTreeSet::new());
        let post = PostId::from_i64(1);
        let request = EditExistingRequest {
            survivors: survivors.into_iter().map(AttachmentId::from_i64).collect(),
            thumbnail: action,
        };

        let result = block_on(service.reconcile_existing(post, request)).unwrap();
        prop_assert!(result.is_noop());
        prop_assert!(repo.ids_for(post).is_empty());
    }
}
