//! Presence table: who is online under which name.

use crate::models::presence::{ConnectionId, PresenceEntry};

/// In-memory mapping from connection to display name, kept in first-bind order.
///
/// Not synchronized on its own; the session coordinator owns it behind its lock.
#[derive(Debug, Default)]
pub struct PresenceTable {
    entries: Vec<PresenceEntry>,
}

impl PresenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `connection_id`. A replaced entry keeps its roster position.
    pub fn bind(&mut self, connection_id: &ConnectionId, display_name: impl Into<String>) {
        let display_name = display_name.into();
        match self
            .entries
            .iter_mut()
            .find(|e| &e.connection_id == connection_id)
        {
            Some(entry) => entry.display_name = display_name,
            None => self.entries.push(PresenceEntry {
                connection_id: connection_id.clone(),
                display_name,
            }),
        }
    }

    /// Remove the entry for `connection_id`, returning its name. `None` if it never joined.
    pub fn unbind(&mut self, connection_id: &ConnectionId) -> Option<String> {
        let pos = self
            .entries
            .iter()
            .position(|e| &e.connection_id == connection_id)?;
        Some(self.entries.remove(pos).display_name)
    }

    /// Owned copy of the roster, in bind order.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.display_name.clone()).collect()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.entries.iter().any(|e| &e.connection_id == connection_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ConnectionId {
        ConnectionId::new(s)
    }

    #[test]
    fn snapshot_follows_bind_order() {
        let mut table = PresenceTable::new();
        table.bind(&id("c1"), "alice");
        table.bind(&id("c2"), "bob");
        table.bind(&id("c3"), "carol");
        assert_eq!(table.snapshot(), vec!["alice", "bob", "carol"]);

        table.unbind(&id("c2"));
        assert_eq!(table.snapshot(), vec!["alice", "carol"]);

        table.bind(&id("c2"), "bob");
        assert_eq!(table.snapshot(), vec!["alice", "carol", "bob"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn rebind_overwrites_in_place() {
        let mut table = PresenceTable::new();
        table.bind(&id("c1"), "alice");
        table.bind(&id("c2"), "bob");
        table.bind(&id("c1"), "alicia");
        assert_eq!(table.snapshot(), vec!["alicia", "bob"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn duplicate_names_are_allowed() {
        let mut table = PresenceTable::new();
        table.bind(&id("c1"), "sam");
        table.bind(&id("c2"), "sam");
        assert_eq!(table.snapshot(), vec!["sam", "sam"]);
        assert_eq!(table.unbind(&id("c1")).as_deref(), Some("sam"));
        assert_eq!(table.snapshot(), vec!["sam"]);
    }

    #[test]
    fn unbind_unknown_is_noop() {
        let mut table = PresenceTable::new();
        table.bind(&id("c1"), "alice");
        assert_eq!(table.unbind(&id("ghost")), None);
        assert_eq!(table.unbind(&id("c1")).as_deref(), Some("alice"));
        assert_eq!(table.unbind(&id("c1")), None);
        assert!(table.is_empty());
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut table = PresenceTable::new();
        table.bind(&id("c1"), "alice");
        let snap = table.snapshot();
        table.bind(&id("c2"), "bob");
        table.unbind(&id("c1"));
        assert_eq!(snap, vec!["alice"]);
        assert!(!table.contains(&id("c1")));
        assert!(table.contains(&id("c2")));
    }

    #[test]
    fn mixed_sequence_matches_model() {
        let mut table = PresenceTable::new();
        let mut model: Vec<(String, String)> = Vec::new();
        let ops: &[(&str, Option<&str>)] = &[
            ("a", Some("1")),
            ("b", Some("2")),
            ("a", None),
            ("c", Some("3")),
            ("b", Some("22")),
            ("x", None),
            ("a", Some("4")),
            ("c", None),
        ];
        for (conn, name) in ops {
            match name {
                Some(n) => {
                    table.bind(&id(conn), *n);
                    match model.iter_mut().find(|(c, _)| c == conn) {
                        Some(e) => e.1 = n.to_string(),
                        None => model.push((conn.to_string(), n.to_string())),
                    }
                }
                None => {
                    table.unbind(&id(conn));
                    model.retain(|(c, _)| c != conn);
                }
            }
            let expected: Vec<String> = model.iter().map(|(_, n)| n.clone()).collect();
            assert_eq!(table.snapshot(), expected);
        }
        assert_eq!(table.snapshot(), vec!["22", "4"]);
    }
}
