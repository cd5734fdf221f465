use crate::{
    api::{CommentId, Time},
    Comment, Forest, ViewState,
};

/// One line of a rendered thread, top to bottom
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Row<'a> {
    Comment {
        comment: &'a Comment,
        depth: usize,
        /// Depth, capped at the configured maximum
        indent: usize,
        view: ViewState,
    },

    /// Placeholder for the replies of `parent` that were not fetched yet
    MoreReplies {
        parent: CommentId,
        indent: usize,
        remaining: u64,
        loading: bool,
    },

    MoreComments {
        remaining: u64,
        loading: bool,
    },
}

impl Forest {
    /// The visible part of the thread, in display order
    pub fn rows(&self) -> Vec<Row<'_>> {
        let mut res = Vec::new();
        for c in self.roots() {
            self.push_rows(&mut res, c, 0);
        }
        if self.has_more() {
            res.push(Row::MoreComments {
                remaining: self.total().saturating_sub(self.roots().len() as u64),
                loading: self.is_loading_page(),
            });
        }
        res
    }

    fn push_rows<'a>(&'a self, rows: &mut Vec<Row<'a>>, comment: &'a Comment, depth: usize) {
        let view = self
            .view(comment.id)
            .unwrap_or_else(|| ViewState::for_depth(depth, self.config()));
        let max_depth = self.config().max_depth;
        rows.push(Row::Comment {
            comment,
            depth,
            indent: std::cmp::min(depth, max_depth),
            view,
        });
        if !view.replies_visible {
            return;
        }
        for r in comment.replies() {
            self.push_rows(rows, r, depth + 1);
        }
        if comment.has_more_replies() {
            rows.push(Row::MoreReplies {
                parent: comment.id,
                indent: std::cmp::min(depth + 1, max_depth),
                remaining: comment.remaining_replies(),
                loading: view.loading_replies,
            });
        }
    }
}

/// Short human-readable age of a comment, as of `now`
pub fn format_age(created_at: Time, now: Time) -> String {
    let age = now - created_at;
    if age < chrono::Duration::minutes(1) {
        String::from("just now")
    } else if age < chrono::Duration::hours(1) {
        format!("{}m ago", age.num_minutes())
    } else if age < chrono::Duration::days(1) {
        format!("{}h ago", age.num_hours())
    } else if age < chrono::Duration::weeks(1) {
        format!("{}d ago", age.num_days())
    } else {
        created_at.format("%b %-d, %Y").to_string()
    }
}
