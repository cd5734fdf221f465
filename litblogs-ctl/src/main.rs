use std::sync::Arc;

use anyhow::Context;
use litblogs_client::{
    api::{AuthToken, CommentId, PostId, Uuid},
    format_age, CommentThread, Forest, HttpService, Row, Target, ThreadConfig,
};

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long)]
    host: String,

    /// Number of top-level comments fetched per request
    #[structopt(long, default_value = "10", parse(try_from_str = parse_page_size))]
    page_size: usize,

    /// Deepest indentation level
    #[structopt(long, default_value = "3")]
    max_depth: usize,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the comment thread of a post
    Show {
        post: Uuid,

        /// Load every comment and reply instead of only the first page
        #[structopt(long)]
        all: bool,
    },

    /// Like or unlike a comment
    Like { post: Uuid, comment: Uuid },

    /// Comment on a post, or reply to one of its comments
    Reply {
        post: Uuid,

        #[structopt(long)]
        parent: Option<Uuid>,

        text: String,
    },
}

fn parse_page_size(s: &str) -> anyhow::Result<usize> {
    let size = s.parse::<usize>().context("parsing page size")?;
    anyhow::ensure!(size > 0, "page size must be at least 1");
    Ok(size)
}

fn user_token() -> anyhow::Result<AuthToken> {
    let tok =
        std::env::var("LITBLOGS_TOKEN").context("retrieving LITBLOGS_TOKEN environment variable")?;
    let tok = Uuid::try_parse(&tok).context("parsing LITBLOGS_TOKEN as an auth token")?;
    Ok(AuthToken(tok))
}

fn print_thread(forest: &Forest) {
    let now = chrono::Utc::now();
    for row in forest.rows() {
        match row {
            Row::Comment {
                comment,
                indent,
                view,
                ..
            } => {
                let pad = "  ".repeat(indent);
                let liked = match comment.viewer_has_liked() {
                    true => " (liked)",
                    false => "",
                };
                println!(
                    "{pad}[{}] {} ({}) {} likes{}, id {}",
                    comment.author.initials(),
                    comment.author.display(),
                    format_age(comment.created_at, now),
                    comment.like_count(),
                    liked,
                    comment.id.0,
                );
                if view.expanded {
                    for line in comment.content.lines() {
                        println!("{pad}  {line}");
                    }
                }
                if !view.replies_visible && comment.reply_count() > 0 {
                    println!("{pad}  ({} replies hidden)", comment.reply_count());
                }
            }
            Row::MoreReplies {
                indent, remaining, ..
            } => println!("{}  ... {remaining} more replies", "  ".repeat(indent)),
            Row::MoreComments { remaining, .. } => println!("... {remaining} more comments"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    let config = ThreadConfig {
        page_size: opt.page_size,
        max_depth: opt.max_depth,
        ..ThreadConfig::default()
    };
    let service = Arc::new(HttpService::new(opt.host, user_token()?));

    match opt.cmd {
        Command::Show { post, all } => {
            let thread = CommentThread::open(service, PostId(post), config);
            let loaded = match all {
                true => thread.load_everything().await,
                false => thread.load_top_level().await.map(|_| ()),
            };
            loaded.context("loading comments")?;
            thread.read(print_thread)?;
        }
        Command::Like { post, comment } => {
            let thread = CommentThread::open(service, PostId(post), config);
            thread
                .load_everything()
                .await
                .context("loading comments")?;
            let likes = thread
                .toggle_like(CommentId(comment))
                .await
                .context("toggling like")?;
            tracing::info!(?likes, "like toggled");
            println!(
                "{} likes, {}",
                likes.like_count,
                match likes.viewer_has_liked {
                    true => "liked",
                    false => "not liked",
                }
            );
        }
        Command::Reply { post, parent, text } => {
            let thread = CommentThread::open(service, PostId(post), config);
            let target = match parent {
                None => Target::Post,
                Some(parent) => {
                    thread
                        .load_everything()
                        .await
                        .context("loading comments")?;
                    Target::Comment(CommentId(parent))
                }
            };
            let created = thread
                .submit_reply(target, &text)
                .await
                .context("submitting comment")?;
            println!("{}", created.id.0);
        }
    }

    Ok(())
}
