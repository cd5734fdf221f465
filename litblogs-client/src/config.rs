#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThreadConfig {
    /// Number of top-level comments fetched per page
    pub page_size: usize,

    /// Comments at this depth or deeper start with their replies hidden
    pub collapse_depth: usize,

    /// Deepest indentation level. Deeper comments are still shown, flattened at this level,
    /// and start collapsed.
    pub max_depth: usize,
}

impl Default for ThreadConfig {
    fn default() -> ThreadConfig {
        ThreadConfig {
            page_size: 10,
            collapse_depth: 2,
            max_depth: 3,
        }
    }
}
