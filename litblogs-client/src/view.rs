use crate::ThreadConfig;

/// Presentation state of one comment. The flags vary independently of each other.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ViewState {
    /// Body and actions are shown
    pub expanded: bool,

    /// Replies are shown
    pub replies_visible: bool,

    pub reply_form_visible: bool,
    pub like_in_flight: bool,
    pub loading_replies: bool,
}

impl ViewState {
    pub fn for_depth(depth: usize, config: &ThreadConfig) -> ViewState {
        ViewState {
            expanded: depth <= config.max_depth,
            replies_visible: depth < config.collapse_depth,
            reply_form_visible: false,
            like_in_flight: false,
            loading_replies: false,
        }
    }
}
