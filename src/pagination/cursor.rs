use crate::pagination::{CollectionPage, Locator};

/// Previous/next availability derived from a single page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_target: Option<Locator>,
    pub next_target: Option<Locator>,
}

impl Cursor {
    /// `has_prev` holds iff the page starts past zero, `has_next` iff records
    /// remain after it. Targets are the server locators, kept only when the
    /// matching flag is set.
    pub fn from_page<T>(page: &CollectionPage<T>) -> Self {
        let has_prev = page.offset > 0;
        let has_next = page
            .offset
            .checked_add(page.items.len())
            .is_some_and(|end| end < page.count);
        Self {
            has_prev,
            has_next,
            prev_target: page.prev.clone().filter(|_| has_prev),
            next_target: page.next.clone().filter(|_| has_next),
        }
    }
}
