//! Concurrency stress tests for the star uniqueness invariant.
//!
//! Many threads toggle the same (user, snippet) pair at once. Because
//! the check-and-flip is atomic, toggles serialize: the pair never
//! holds more than one star and the final state matches toggle parity.

use snipshare_core::{RequestContext, SnippetService};
use std::sync::Arc;
use std::thread;

fn seeded_service() -> (Arc<SnippetService>, snipshare_core::RecordId) {
    let service = Arc::new(SnippetService::new());
    service
        .sync_user("usr_1", "a@b.com", Some("Ada"), Some("Lovelace"))
        .unwrap();
    let ctx = RequestContext::authenticated("usr_1");
    let snippet_id = service
        .create_snippet(&ctx, "stress", "rust", "fn main() {}")
        .unwrap();
    (service, snippet_id)
}

#[test]
fn concurrent_toggles_one_user_even_total() {
    let (service, snippet_id) = seeded_service();
    let threads = 8;
    let toggles_per_thread = 25; // 200 toggles total, even

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let ctx = RequestContext::authenticated("usr_1");
                for _ in 0..toggles_per_thread {
                    service.toggle_star(&ctx, snippet_id).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Even toggle count returns to the original unstarred state, and at
    // no point could the pair have held two stars.
    let ctx = RequestContext::authenticated("usr_1");
    assert_eq!(service.star_count(snippet_id), 0);
    assert!(!service.is_starred(&ctx, snippet_id).unwrap());
}

#[test]
fn concurrent_toggles_many_users_parity() {
    let (service, snippet_id) = seeded_service();
    let users = 6;

    // Odd-numbered users toggle an odd number of times, even-numbered
    // users an even number.
    let handles: Vec<_> = (0..users)
        .map(|u| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let ctx = RequestContext::authenticated(format!("usr_{u}"));
                let count = if u % 2 == 1 { 31 } else { 30 };
                for _ in 0..count {
                    service.toggle_star(&ctx, snippet_id).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Users 1, 3, 5 end starred; 0, 2, 4 end unstarred.
    assert_eq!(service.star_count(snippet_id), 3);
    for u in 0..users {
        let ctx = RequestContext::authenticated(format!("usr_{u}"));
        assert_eq!(
            service.is_starred(&ctx, snippet_id).unwrap(),
            u % 2 == 1,
            "user {u}"
        );
    }
}

#[test]
fn concurrent_toggles_interleaved_with_reads() {
    let (service, snippet_id) = seeded_service();

    let writer = {
        let service = Arc::clone(&service);
        thread::spawn(move || {
            let ctx = RequestContext::authenticated("usr_1");
            for _ in 0..100 {
                service.toggle_star(&ctx, snippet_id).unwrap();
            }
        })
    };
    let reader = {
        let service = Arc::clone(&service);
        thread::spawn(move || {
            for _ in 0..100 {
                // The count can only ever be 0 or 1 for a single user.
                assert!(service.star_count(snippet_id) <= 1);
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(service.star_count(snippet_id), 0);
}
