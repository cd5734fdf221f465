use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod auth;
pub use auth::AuthToken;

mod comment;
pub use comment::{Comment, CommentId, CommentPage, LikeAction, LikeToggled, NewComment, ReplyPage};

mod error;
pub use error::Error;

mod post;
pub use post::PostId;

mod service;
pub use service::CommentService;

mod user;
pub use user::{Author, UserId};

pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(String::from(s)));
    }
    Ok(())
}
