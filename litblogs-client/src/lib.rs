mod comment;
pub use comment::{Comment, LikeState};

mod config;
pub use config::ThreadConfig;

mod error;
pub use error::Error;

mod forest;
pub use forest::{Forest, PageInfo, Target};

mod http;
pub use http::HttpService;

mod render;
pub use render::{format_age, Row};

mod thread;
pub use thread::CommentThread;

mod view;
pub use view::ViewState;


pub mod api {
    pub use litblogs_api::*;
}
