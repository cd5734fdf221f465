use std::sync::Arc;

use litblogs_api as api;
use litblogs_client::{Comment, CommentThread, Row, ThreadConfig};
use litblogs_mock_server::{MockServer, MockService, Op};
use rand::SeedableRng;

const NUM_SEEDS: u64 = 30;

fn same_thread(local: &[Comment], remote: &[api::Comment]) {
    assert_eq!(local.len(), remote.len());
    for (l, r) in local.iter().zip(remote) {
        assert_eq!(l.id, r.id);
        assert_eq!(l.parent_id, r.parent_id);
        assert_eq!(l.author, r.author);
        assert_eq!(l.content, r.content);
        assert_eq!(l.like_count(), r.like_count);
        assert_eq!(l.reply_count(), r.reply_count);
        assert!(!l.has_more_replies());
        same_thread(l.replies(), &r.replies);
    }
}

fn count(comments: &[api::Comment]) -> usize {
    comments.iter().map(|c| 1 + count(&c.replies)).sum()
}

#[tokio::test]
async fn load_everything_walks_random_threads() {
    for seed in 0..NUM_SEEDS {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut server = MockServer::new().with_reply_page_size(1 + seed as usize % 4);
        let thread = tests::populate(&mut server, &mut rng);
        let expected = server.export_thread(thread.post).unwrap();
        let service = Arc::new(MockService::new(server.shared(), thread.users[0]));
        let config = ThreadConfig {
            page_size: 1 + seed as usize % 6,
            ..ThreadConfig::default()
        };
        let comments = CommentThread::open(service.clone(), thread.post, config);
        comments.load_everything().await.unwrap();

        let forest = comments.snapshot().unwrap();
        same_thread(forest.roots(), &expected);
        assert!(!forest.has_more());
        assert_eq!(forest.total(), expected.len() as u64);

        // every comment appears exactly once, no placeholder is left
        let mut shown = 0;
        let rows = comments
            .read(|f| {
                f.rows()
                    .into_iter()
                    .filter(|r| !matches!(r, Row::Comment { .. }))
                    .count()
            })
            .unwrap();
        assert_eq!(rows, 0, "seed {seed}");
        comments
            .read(|f| {
                fn walk(f: &litblogs_client::Forest, cs: &[Comment], shown: &mut usize) {
                    for c in cs {
                        *shown += 1;
                        assert!(f.view(c.id).is_some());
                        walk(f, c.replies(), shown);
                    }
                }
                walk(f, f.roots(), &mut shown)
            })
            .unwrap();
        assert_eq!(shown, count(&expected), "seed {seed}");
        assert_eq!(service.calls(Op::CreateComment), 0);
    }
}

#[tokio::test]
async fn likes_and_replies_reach_the_server() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let mut server = MockServer::new();
    let thread = tests::populate(&mut server, &mut rng);
    let server = server.shared();
    let service = Arc::new(MockService::new(server.clone(), thread.users[0]));
    let comments = CommentThread::open(service, thread.post, ThreadConfig::default());
    comments.load_everything().await.unwrap();

    let Some(first) = comments.read(|f| f.roots().first().map(|c| c.id)).unwrap() else {
        return;
    };
    let before = comments.read(|f| f.get(first).unwrap().likes()).unwrap();
    let after = comments.toggle_like(first).await.unwrap();
    assert_eq!(after, before.toggled());

    let reply = comments
        .submit_reply(litblogs_client::Target::Comment(first), "well said")
        .await
        .unwrap();
    let exported = server.lock().export_thread(thread.post).unwrap();
    let remote = exported.iter().find(|c| c.id == first).unwrap();
    assert_eq!(remote.like_count, after.like_count);
    assert_eq!(remote.replies.last().unwrap().id, reply.id);
}
