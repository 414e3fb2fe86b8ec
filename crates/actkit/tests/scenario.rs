//! End-to-end grant, revoke, upload and download flows.

use std::sync::Arc;

use actkit::access::{AccessControlIndex, AccessError, AccessLogic};
use actkit::core::{Address, Identity, StreamCipher, SymmetricKey};
use actkit::store::{Manifest, MemoryStore, SqliteStore, Store};
use actkit::{Controller, ControllerConfig, ControllerError, LookupFallback};
use actkit_testkit::{grantees, public_keys, TestFixture};

fn controller_for<S: Store>(
    fixture: &TestFixture,
    identity: &Identity,
    store: Arc<S>,
) -> Controller<S> {
    Controller::new(identity.clone(), store, ControllerConfig::default())
        .with_clock(fixture.clock.clone())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[tokio::test]
async fn grant_then_download_and_pre_grant_denial() -> anyhow::Result<()> {
    init_tracing();
    let fixture = TestFixture::new();
    let publisher = fixture.publisher.clone();
    let p = publisher.public_key();
    let grantee = Identity::generate();
    let ctrl = controller_for(&fixture, &publisher, fixture.store.clone());
    let reader = controller_for(&fixture, &grantee, fixture.store.clone());

    // P uploads before anyone is granted.
    let t0 = fixture.now();
    let ref0 = Address::digest(b"draft");
    let up0 = ctrl.upload(&ref0, &p, None).await?;

    // P grants G on top of that history.
    let t1 = fixture.tick(10);
    let grant = ctrl
        .handle_grantees(None, Some(&up0.history), &p, &[grantee.public_key()], &[])
        .await?;
    assert_ne!(grant.aci, up0.aci);

    // P uploads again; the granted epoch is reused.
    let t2 = fixture.tick(10);
    let ref1 = Address::digest(b"final");
    let up1 = ctrl.upload(&ref1, &p, Some(&grant.history)).await?;
    assert_eq!(up1.aci, grant.aci);
    assert_eq!(up1.history, grant.history);

    // G reads the post-grant reference.
    assert_eq!(reader.download(&up1.encrypted_ref, &p, &up1.history, t2).await?, ref1);
    assert_eq!(reader.download(&up1.encrypted_ref, &p, &up1.history, t1).await?, ref1);

    // G has no entry in the epoch active before the grant.
    let err = reader
        .download(&up0.encrypted_ref, &p, &up1.history, t0)
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::Access(AccessError::GranteeNotFound)));
    assert!(err.is_access_denied());

    // P can still read both.
    assert_eq!(ctrl.download(&up0.encrypted_ref, &p, &up1.history, t0).await?, ref0);
    assert_eq!(ctrl.download(&up1.encrypted_ref, &p, &up1.history, t2).await?, ref1);
    Ok(())
}

#[tokio::test]
async fn revoke_rotates_and_excludes_removed_grantee() -> anyhow::Result<()> {
    init_tracing();
    let fixture = TestFixture::new();
    let publisher = fixture.publisher.clone();
    let p = publisher.public_key();
    let readers = grantees(2);
    let (g1, g2) = (&readers[0], &readers[1]);
    let ctrl = controller_for(&fixture, &publisher, fixture.store.clone());

    let grant = ctrl
        .handle_grantees(None, None, &p, &public_keys(&readers), &[])
        .await?;

    let t_before = fixture.tick(10);
    let before = Address::digest(b"before revoke");
    let up_before = ctrl.upload(&before, &p, Some(&grant.history)).await?;

    let t_revoke = fixture.tick(10);
    let revoke = ctrl
        .handle_grantees(
            Some(&grant.encrypted_grantee_ref),
            Some(&up_before.history),
            &p,
            &[],
            &[g1.public_key()],
        )
        .await?;
    assert_ne!(revoke.aci, grant.aci);
    assert_eq!(
        ctrl.get_grantees(&p, &revoke.encrypted_grantee_ref).await?,
        vec![g2.public_key()]
    );

    let t_after = fixture.tick(10);
    let after = Address::digest(b"after revoke");
    let up_after = ctrl.upload(&after, &p, Some(&revoke.history)).await?;
    assert_eq!(up_after.aci, revoke.aci);

    let r1 = controller_for(&fixture, g1, fixture.store.clone());
    let r2 = controller_for(&fixture, g2, fixture.store.clone());

    // G1 keeps what it was entitled to before the revoke...
    assert_eq!(r1.download(&up_before.encrypted_ref, &p, &revoke.history, t_before).await?, before);
    // ...but has no entry in the post-revoke epoch, for old or new references.
    for (encrypted, at) in [
        (&up_before.encrypted_ref, t_revoke),
        (&up_after.encrypted_ref, t_after),
    ] {
        let err = r1.download(encrypted, &p, &revoke.history, at).await.unwrap_err();
        assert!(err.is_access_denied(), "unexpected error: {err}");
    }

    // G2 was re-added during rotation, P always has an entry.
    assert_eq!(r2.download(&up_after.encrypted_ref, &p, &revoke.history, t_after).await?, after);
    assert_eq!(ctrl.download(&up_after.encrypted_ref, &p, &revoke.history, t_after).await?, after);
    Ok(())
}

#[tokio::test]
async fn revoked_grantee_cannot_derive_rotated_key() -> anyhow::Result<()> {
    let fixture = TestFixture::new();
    let publisher = fixture.publisher.clone();
    let p = publisher.public_key();
    let readers = grantees(2);
    let g1 = &readers[0];
    let ctrl = controller_for(&fixture, &publisher, fixture.store.clone());

    let grant = ctrl
        .handle_grantees(None, None, &p, &public_keys(&readers), &[])
        .await?;
    fixture.tick(10);
    let revoke = ctrl
        .handle_grantees(
            Some(&grant.encrypted_grantee_ref),
            Some(&grant.history),
            &p,
            &[],
            &[g1.public_key()],
        )
        .await?;
    fixture.tick(10);
    let after = Address::digest(b"after revoke");
    let up = ctrl.upload(&after, &p, Some(&revoke.history)).await?;
    assert_eq!(up.aci, revoke.aci);

    // G1 legitimately holds the pre-revoke access key.
    let old_aci = AccessControlIndex::open(fixture.store.clone(), &grant.aci).await?;
    let old_key = AccessLogic::new(g1.session()).access_key(&old_aci, &p).await?;

    // P and G2 keep their lookup paths across the rotation. XORing their old
    // and new entries with the old key must not yield the new key.
    let old = Manifest::open(fixture.store.clone(), &grant.aci).await?;
    let new = Manifest::open(fixture.store.clone(), &revoke.aci).await?;
    let mut shared_paths = 0;
    for (path, old_entry) in old.iter() {
        let Some(new_entry) = new.lookup(path) else {
            continue;
        };
        shared_paths += 1;
        let diff: Vec<u8> = old_entry
            .reference
            .iter()
            .zip(&new_entry.reference)
            .map(|(a, b)| a ^ b)
            .collect();
        for window in diff.windows(32) {
            let mut candidate = [0u8; 32];
            for (c, (d, k)) in candidate
                .iter_mut()
                .zip(window.iter().zip(old_key.as_bytes()))
            {
                *c = d ^ k;
            }
            let guess = StreamCipher::new(&SymmetricKey::from_bytes(candidate))
                .apply(up.encrypted_ref.as_bytes());
            assert_ne!(guess, after.as_bytes().to_vec(), "entry at {path} leaks the new key");
        }
    }
    assert_eq!(shared_paths, 2);
    Ok(())
}

#[tokio::test]
async fn adding_to_existing_list_keeps_epoch_key() -> anyhow::Result<()> {
    let fixture = TestFixture::new();
    let publisher = fixture.publisher.clone();
    let p = publisher.public_key();
    let readers = grantees(2);
    let ctrl = controller_for(&fixture, &publisher, fixture.store.clone());

    let first = ctrl
        .handle_grantees(None, None, &p, &[readers[0].public_key()], &[])
        .await?;
    let t_upload = fixture.tick(5);
    let reference = Address::digest(b"shared");
    let up = ctrl.upload(&reference, &p, Some(&first.history)).await?;

    // Adding G2 later wraps the existing key instead of rotating it, so G2
    // can read references made before it was added.
    let t_add = fixture.tick(5);
    let second = ctrl
        .handle_grantees(
            Some(&first.encrypted_grantee_ref),
            Some(&up.history),
            &p,
            &[readers[1].public_key()],
            &[],
        )
        .await?;
    assert_ne!(second.aci, first.aci);

    let r2 = controller_for(&fixture, &readers[1], fixture.store.clone());
    assert_eq!(r2.download(&up.encrypted_ref, &p, &second.history, t_add).await?, reference);

    // Before the addition G2 had no entry.
    let err = r2
        .download(&up.encrypted_ref, &p, &second.history, t_upload)
        .await
        .unwrap_err();
    assert!(err.is_access_denied());

    assert_eq!(
        ctrl.get_grantees(&p, &second.encrypted_grantee_ref).await?,
        public_keys(&readers)
    );
    Ok(())
}

#[tokio::test]
async fn strict_lookup_rejects_queries_before_history() -> anyhow::Result<()> {
    let fixture = TestFixture::new();
    let publisher = fixture.publisher.clone();
    let p = publisher.public_key();
    let config = ControllerConfig {
        lookup_fallback: LookupFallback::Strict,
        ..ControllerConfig::default()
    };
    let ctrl = Controller::new(publisher, fixture.store.clone(), config)
        .with_clock(fixture.clock.clone());

    let reference = Address::digest(b"strict");
    let up = ctrl.upload(&reference, &p, None).await?;
    let now = fixture.now();

    assert_eq!(ctrl.download(&up.encrypted_ref, &p, &up.history, now).await?, reference);
    let err = ctrl
        .download(&up.encrypted_ref, &p, &up.history, now - 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::Access(AccessError::EntryNotFound)));

    // The default configuration falls back to the earliest entry.
    let lenient = controller_for(&fixture, &fixture.publisher, fixture.store.clone());
    assert_eq!(lenient.download(&up.encrypted_ref, &p, &up.history, now - 1).await?, reference);
    Ok(())
}

#[tokio::test]
async fn missing_history_is_a_store_error() {
    let fixture = TestFixture::new();
    let p = fixture.publisher_key();
    let ctrl = controller_for(&fixture, &fixture.publisher, fixture.store.clone());

    let up = ctrl.upload(&Address::digest(b"x"), &p, None).await.unwrap();
    let bogus = Address::digest(b"no such history");
    let err = ctrl
        .download(&up.encrypted_ref, &p, &bogus, fixture.now())
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::Store(_)));
    assert!(!err.is_access_denied());
}

#[tokio::test]
async fn flows_work_over_sqlite() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(SqliteStore::open(dir.path().join("actkit.db"))?);
    let fixture = TestFixture::new();
    let p = fixture.publisher_key();
    let grantee = Identity::generate();
    let ctrl = controller_for(&fixture, &fixture.publisher, store.clone());

    let grant = ctrl
        .handle_grantees(None, None, &p, &[grantee.public_key()], &[])
        .await?;
    let now = fixture.tick(1);
    let reference = Address::digest(b"on disk");
    let up = ctrl.upload(&reference, &p, Some(&grant.history)).await?;

    // A fresh handle on the same database sees everything.
    let reopened = Arc::new(SqliteStore::open(dir.path().join("actkit.db"))?);
    let reader = controller_for(&fixture, &grantee, reopened);
    assert_eq!(reader.download(&up.encrypted_ref, &p, &up.history, now).await?, reference);
    Ok(())
}

#[tokio::test]
async fn instances_do_not_share_state() {
    let fixture = TestFixture::new();
    let p = fixture.publisher_key();
    let ctrl = controller_for(&fixture, &fixture.publisher, fixture.store.clone());
    let up = ctrl.upload(&Address::digest(b"isolated"), &p, None).await.unwrap();

    let elsewhere = controller_for(&fixture, &fixture.publisher, Arc::new(MemoryStore::new()));
    let err = elsewhere
        .download(&up.encrypted_ref, &p, &up.history, fixture.now())
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::Store(_)));
}
