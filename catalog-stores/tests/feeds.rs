mod common;

use std::time::Duration;

use catalog_core::{FeedState, FeedSubscription};
use catalog_stores::{Admin, AdminChanges, NewAdmin, NewProduct, Product, SlugEntity, SlugFields};
use common::{harness, png};
use futures::StreamExt;

async fn next_state<R>(sub: &mut FeedSubscription<R>) -> FeedState<R>
where
    R: Clone + Send + Sync + 'static,
{
    tokio::time::timeout(Duration::from_secs(1), sub.changed())
        .await
        .expect("Timeout waiting for snapshot")
        .expect("Feed stopped")
}

/// Skip intermediate snapshots until `done` holds.
async fn wait_until<R, F>(sub: &mut FeedSubscription<R>, done: F) -> FeedState<R>
where
    R: Clone + Send + Sync + 'static,
    F: Fn(&FeedState<R>) -> bool,
{
    loop {
        let state = next_state(sub).await;
        if done(&state) {
            return state;
        }
    }
}

#[tokio::test]
async fn brand_feed_tracks_every_write() {
    let h = harness();
    let brands = h.catalog.brands();
    let mut sub = brands.watch().subscribe();

    assert!(sub.current().is_loading());
    assert_eq!(next_state(&mut sub).await, FeedState::Data(None));

    let acme = brands
        .create(SlugFields { name: "Acme".into(), slug: "acme".into() }, "https://img/a.png")
        .await
        .unwrap();
    let state = next_state(&mut sub).await;
    assert_eq!(state.data().unwrap(), std::slice::from_ref(&acme));

    brands
        .update(&acme.id, SlugFields { name: "Acme Co".into(), slug: "acme".into() }, "https://img/a.png")
        .await
        .unwrap();
    let state = next_state(&mut sub).await;
    assert_eq!(state.data().unwrap()[0].name, "Acme Co");

    brands.delete(&acme.id).await.unwrap();
    assert_eq!(next_state(&mut sub).await, FeedState::Data(None));
}

#[tokio::test]
async fn admin_rename_ends_with_only_the_new_key() {
    let h = harness();
    let admins = h.catalog.admins();
    admins
        .create(NewAdmin { name: "A".into(), email: "a@x.com".into() }, Some(png("a.png")))
        .await
        .unwrap();

    let mut sub = admins.watch().subscribe();
    next_state(&mut sub).await;

    admins
        .update(
            AdminChanges {
                id: "a@x.com".into(),
                name: "A".into(),
                email: "b@x.com".into(),
            },
            None,
        )
        .await
        .unwrap();

    let state = wait_until(&mut sub, |s: &FeedState<Admin>| {
        s.data().map(|admins| admins.len() == 1 && admins[0].id == "b@x.com").unwrap_or(false)
    })
    .await;
    assert_eq!(state.data().unwrap()[0].email, "b@x.com");
}

#[tokio::test]
async fn cancelled_feed_stops_and_others_keep_going() {
    let h = harness();
    let products = h.catalog.products();

    let mut kept = products.watch().subscribe();
    let mut dropped = products.watch().subscribe();
    next_state(&mut kept).await;
    next_state(&mut dropped).await;
    assert_eq!(h.store.watcher_count(), 2);

    dropped.cancel();
    for _ in 0..100 {
        if h.store.watcher_count() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(h.store.watcher_count(), 1);

    products
        .create(NewProduct { title: "Lamp".into(), description: None }, Some(png("f.png")), vec![])
        .await
        .unwrap();
    let state = next_state(&mut kept).await;
    assert_eq!(state.data().map(|p| p.len()), Some(1));
}

#[tokio::test]
async fn feed_as_stream_yields_snapshots() {
    let h = harness();
    let categories = h.catalog.categories();
    let mut states = categories.watch().subscribe().into_stream();

    assert!(states.next().await.unwrap().is_loading());

    let first = tokio::time::timeout(Duration::from_secs(1), states.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, FeedState::<SlugEntity>::Data(None));

    categories
        .create(SlugFields { name: "Shoes".into(), slug: "shoes".into() }, "https://img/s.png")
        .await
        .unwrap();
    let next = tokio::time::timeout(Duration::from_secs(1), states.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.data().unwrap()[0].slug, "shoes");
}

#[tokio::test]
async fn dropped_subscription_releases_the_store() {
    let h = harness();
    {
        let mut sub = h.catalog.products().watch().subscribe();
        let _: FeedState<Product> = next_state(&mut sub).await;
        assert_eq!(h.store.watcher_count(), 1);
    }
    for _ in 0..100 {
        if h.store.watcher_count() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("subscription still holds the change stream");
}
