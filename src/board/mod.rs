//! In-memory reconciliation for the bookmark list.
//!
//! One authoritative ordered sequence per dashboard mount, kept consistent
//! under concurrently arriving change-feed events and local edits. Every
//! operation is total: duplicate or missing ids are normal, silent cases,
//! never errors. That makes duplicate delivery from the feed safe, and makes
//! a locally applied insert and its own feed echo converge.

use crate::models::Bookmark;

/// A row-level notification from the change feed, already scoped to the
/// current user by the subscription filter.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ChangeEvent {
    Insert(Bookmark),
    Update(Bookmark),
    Delete(String),
}

#[derive(Clone, Debug, Default)]
pub(crate) struct BookmarkBoard {
    items: Vec<Bookmark>,
    pending_delete: Option<String>,
}

impl BookmarkBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Bookmark] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Replace state wholesale from a pre-sorted snapshot (newest first).
    /// Empty is valid: no bookmarks yet.
    pub fn seed(&mut self, snapshot: Vec<Bookmark>) {
        self.items = snapshot;
    }

    /// Apply one feed event idempotently.
    ///
    /// Insert prepends (newest-first display order) unless the id is already
    /// present. Update replaces in place, preserving position. Delete removes
    /// by id. An Update arriving before its Insert is dropped; there is no
    /// sequence check, only per-event idempotence.
    pub fn apply(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::Insert(row) => {
                if !self.items.iter().any(|b| b.id == row.id) {
                    self.items.insert(0, row);
                }
            }
            ChangeEvent::Update(row) => {
                if let Some(existing) = self.items.iter_mut().find(|b| b.id == row.id) {
                    *existing = row;
                }
            }
            ChangeEvent::Delete(id) => {
                self.items.retain(|b| b.id != id);
            }
        }
    }

    /// Positional move for drag feedback. Local-only: the row schema has no
    /// ordering column, so the next seed restores snapshot order.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from == to || from >= self.items.len() || to >= self.items.len() {
            return;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
    }

    /// Index of a row by id, for translating drag targets into positions.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|b| b.id == id)
    }

    /// Record the user's intent to delete `id`. No remote effect. A second
    /// request while one is pending overwrites it (last request wins).
    pub fn request_delete(&mut self, id: String) {
        self.pending_delete = Some(id);
    }

    /// Drop the pending intent without side effects.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Consume the pending intent for the confirm path. The caller issues the
    /// remote delete with the returned id; the intent is gone either way, and
    /// the visible removal arrives later via the feed's Delete event.
    pub fn take_pending_delete(&mut self) -> Option<String> {
        self.pending_delete.take()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bm(id: &str, title: &str, url: &str) -> Bookmark {
        Bookmark {
            id: id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            user_id: "u1".to_string(),
            created_at: String::new(),
        }
    }

    fn seeded() -> BookmarkBoard {
        let mut board = BookmarkBoard::new();
        board.seed(vec![bm("1", "A", "http://a"), bm("2", "B", "http://b")]);
        board
    }

    fn ids(board: &BookmarkBoard) -> Vec<&str> {
        board.items().iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_seed_empty_is_valid() {
        let mut board = seeded();
        board.seed(vec![]);
        assert!(board.is_empty());
    }

    #[test]
    fn test_insert_prepends_newest_first() {
        let mut board = seeded();
        board.apply(ChangeEvent::Insert(bm("3", "C", "http://c")));
        assert_eq!(ids(&board), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut board = seeded();
        board.apply(ChangeEvent::Insert(bm("3", "C", "http://c")));
        let before = board.items().to_vec();
        board.apply(ChangeEvent::Insert(bm("3", "C duplicate", "http://c2")));
        assert_eq!(board.items(), &before[..]);
    }

    #[test]
    fn test_distinct_inserts_in_any_order_yield_distinct_rows() {
        // Length equals the number of distinct ids regardless of delivery order.
        let deliveries = [["x", "y", "z"], ["z", "x", "y"], ["y", "z", "x"]];
        for order in deliveries {
            let mut board = BookmarkBoard::new();
            for id in order {
                board.apply(ChangeEvent::Insert(bm(id, id, "http://x")));
                // Duplicate delivery of the same event.
                board.apply(ChangeEvent::Insert(bm(id, id, "http://x")));
            }
            assert_eq!(board.len(), 3);
        }
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut board = seeded();
        board.apply(ChangeEvent::Insert(bm("3", "C", "http://c")));
        board.apply(ChangeEvent::Update(bm("2", "B2", "http://b")));

        assert_eq!(ids(&board), vec!["3", "1", "2"]);
        assert_eq!(board.items()[2].title, "B2");
    }

    #[test]
    fn test_update_for_absent_id_is_a_no_op() {
        // Defends against update-after-delete races from the feed.
        let mut board = seeded();
        let before = board.items().to_vec();
        board.apply(ChangeEvent::Update(bm("missing", "X", "http://x")));
        assert_eq!(board.items(), &before[..]);
    }

    #[test]
    fn test_delete_removes_matching_row() {
        let mut board = seeded();
        board.apply(ChangeEvent::Insert(bm("3", "C", "http://c")));
        board.apply(ChangeEvent::Delete("1".to_string()));
        assert_eq!(ids(&board), vec!["3", "2"]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut board = seeded();
        board.apply(ChangeEvent::Delete("1".to_string()));
        let once = board.items().to_vec();
        board.apply(ChangeEvent::Delete("1".to_string()));
        assert_eq!(board.items(), &once[..]);
    }

    #[test]
    fn test_reorder_moves_rows_locally() {
        let mut board = seeded();
        board.apply(ChangeEvent::Insert(bm("3", "C", "http://c")));
        board.reorder(0, 2);
        assert_eq!(ids(&board), vec!["1", "2", "3"]);
        board.reorder(2, 0);
        assert_eq!(ids(&board), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_reorder_out_of_bounds_is_a_no_op() {
        let mut board = seeded();
        let before = board.items().to_vec();
        board.reorder(0, 5);
        board.reorder(7, 0);
        board.reorder(1, 1);
        assert_eq!(board.items(), &before[..]);
    }

    #[test]
    fn test_reseed_after_reorder_restores_snapshot_order() {
        let snapshot = vec![bm("1", "A", "http://a"), bm("2", "B", "http://b")];
        let mut board = BookmarkBoard::new();
        board.seed(snapshot.clone());
        board.reorder(0, 1);
        assert_eq!(ids(&board), vec!["2", "1"]);

        board.seed(snapshot);
        assert_eq!(ids(&board), vec!["1", "2"]);
    }

    #[test]
    fn test_delete_intent_cancel_leaves_collection_unchanged() {
        let mut board = seeded();
        let before = board.items().to_vec();

        board.request_delete("1".to_string());
        assert_eq!(board.pending_delete(), Some("1"));
        board.cancel_delete();
        assert_eq!(board.pending_delete(), None);
        assert_eq!(board.items(), &before[..]);
    }

    #[test]
    fn test_delete_intent_confirm_consumes_exactly_once() {
        let mut board = seeded();
        board.request_delete("1".to_string());

        assert_eq!(board.take_pending_delete().as_deref(), Some("1"));
        assert_eq!(board.pending_delete(), None);
        // A second confirm has nothing to act on.
        assert_eq!(board.take_pending_delete(), None);
        // The row itself is untouched until the feed delivers the Delete.
        assert_eq!(ids(&board), vec!["1", "2"]);
    }

    #[test]
    fn test_delete_intent_last_request_wins() {
        let mut board = seeded();
        board.request_delete("1".to_string());
        board.request_delete("2".to_string());
        assert_eq!(board.take_pending_delete().as_deref(), Some("2"));
    }

    #[test]
    fn test_position_of() {
        let board = seeded();
        assert_eq!(board.position_of("2"), Some(1));
        assert_eq!(board.position_of("nope"), None);
    }

    #[test]
    fn test_update_before_insert_is_dropped() {
        // Accepted limitation: no sequence check, so an early Update vanishes.
        let mut board = BookmarkBoard::new();
        board.apply(ChangeEvent::Update(bm("1", "early", "http://a")));
        assert!(board.is_empty());

        board.apply(ChangeEvent::Insert(bm("1", "A", "http://a")));
        assert_eq!(board.items()[0].title, "A");
    }
}
