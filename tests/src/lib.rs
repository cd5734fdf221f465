use litblogs_api::{AuthToken, CommentId, NewComment, PostId};
use litblogs_mock_server::MockServer;
use rand::{seq::SliceRandom, Rng};

const NUM_USERS: usize = 5;
const NUM_TOP_LEVEL: usize = 15;
const MAX_REPLIES: usize = 8;
const MAX_DEPTH: usize = 5;
const COMMENT_WORD_COUNT: usize = 12;

pub struct Thread {
    pub post: PostId,

    /// Sessions of every user, the first one being the viewer
    pub users: Vec<AuthToken>,
}

fn gen_text(rng: &mut impl Rng) -> String {
    let words = rng.gen_range(1..=COMMENT_WORD_COUNT);
    lipsum::lipsum_words_with_rng(&mut *rng, words)
}

/// Fill `server` with a post carrying a random comment thread
pub fn populate(server: &mut MockServer, rng: &mut impl Rng) -> Thread {
    let users = (0..NUM_USERS)
        .map(|i| {
            let name = format!("user{i}");
            let display_name = match rng.gen_bool(0.5) {
                true => Some(lipsum::lipsum_words_with_rng(&mut *rng, 2)),
                false => None,
            };
            let id = server.admin_create_user(name, display_name);
            server.login(id).expect("logging in a just-created user")
        })
        .collect::<Vec<_>>();
    let post = server.create_post();

    // (comment, depth) pairs that can still receive replies
    let mut parents: Vec<(Option<CommentId>, usize)> = vec![(None, 0)];
    let num_top_level = rng.gen_range(0..=NUM_TOP_LEVEL);
    for _ in 0..num_top_level {
        let id = add_comment(server, rng, &users, post, None);
        parents.push((Some(id), 1));
    }
    let mut i = 1;
    while i < parents.len() {
        let (parent, depth) = parents[i];
        i += 1;
        if depth >= MAX_DEPTH {
            continue;
        }
        let num_replies = match rng.gen_bool(0.4) {
            true => rng.gen_range(1..=MAX_REPLIES / depth),
            false => 0,
        };
        for _ in 0..num_replies {
            let id = add_comment(server, rng, &users, post, parent);
            parents.push((Some(id), depth + 1));
        }
    }

    for (comment, _) in parents.iter().skip(1) {
        let Some(comment) = comment else { continue };
        for tok in users.iter() {
            if rng.gen_bool(0.3) {
                server
                    .toggle_like(*tok, *comment)
                    .expect("liking an existing comment");
            }
        }
    }

    Thread { post, users }
}

fn add_comment(
    server: &mut MockServer,
    rng: &mut impl Rng,
    users: &[AuthToken],
    post: PostId,
    parent: Option<CommentId>,
) -> CommentId {
    let author = *users.choose(rng).expect("there are users");
    let content = gen_text(rng);
    server
        .create_comment(
            author,
            NewComment {
                post_id: post,
                content,
                parent_id: parent,
            },
        )
        .expect("creating a comment on an existing post")
        .id
}
