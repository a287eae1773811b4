use std::collections::HashMap;

use system::uuid::Uuid;
use system::{ConnectionId, Point, Presence, SessionSnapshot};

pub const PALETTE: [&str; 7] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEEAD", "#D4A5A5", "#9B59B6",
];

/// Palette slot for the n-th concurrent participant. Colors repeat once
/// the active count exceeds the palette.
pub fn assign_color(active_count: usize) -> String {
    PALETTE[active_count % PALETTE.len()].to_string()
}

/// Presence store. Owned by the relay loop; an entry exists exactly while
/// its connection is active.
pub struct ServerState {
    presences: HashMap<ConnectionId, Presence>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            presences: HashMap::new(),
        }
    }

    /// Mints an identity and inserts its presence entry. The color slot is
    /// taken from the active count *before* the insert, so the first
    /// connection gets `PALETTE[0]`.
    pub fn create_connection(&mut self) -> (ConnectionId, String) {
        let connection_id = Uuid::new_v4();
        let color = assign_color(self.presences.len());
        self.presences.insert(
            connection_id,
            Presence {
                color: color.clone(),
                cursor: None,
            },
        );
        (connection_id, color)
    }

    /// Idempotent: removing an already-removed connection returns `None`.
    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> Option<Presence> {
        self.presences.remove(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.presences.contains_key(connection_id)
    }

    pub fn color_of(&self, connection_id: &ConnectionId) -> Option<String> {
        self.presences.get(connection_id).map(|p| p.color.clone())
    }

    pub fn update_color(&mut self, connection_id: &ConnectionId, color: &str) -> bool {
        if let Some(presence) = self.presences.get_mut(connection_id) {
            presence.color = color.to_string();
            true
        } else {
            false
        }
    }

    pub fn update_cursor(&mut self, connection_id: &ConnectionId, position: Option<Point>) -> bool {
        if let Some(presence) = self.presences.get_mut(connection_id) {
            presence.cursor = position;
            true
        } else {
            false
        }
    }

    pub fn active_count(&self) -> usize {
        self.presences.len()
    }

    /// Owned list of broadcast targets, safe to iterate while entries are
    /// removed underneath.
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.presences.keys().copied().collect()
    }

    pub fn presences(&self) -> impl Iterator<Item = (&ConnectionId, &Presence)> {
        self.presences.iter()
    }

    /// Point-in-time copy of every entry except `connection_id`, for the
    /// join-time snapshot.
    pub fn snapshot_without(&self, connection_id: &ConnectionId) -> SessionSnapshot {
        SessionSnapshot {
            users: self
                .presences
                .iter()
                .filter(|(id, _)| *id != connection_id)
                .map(|(id, presence)| (*id, presence.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_cycles_palette_by_join_order() {
        for i in 0..PALETTE.len() * 2 {
            assert_eq!(assign_color(i), PALETTE[i % PALETTE.len()]);
        }
    }

    #[test]
    fn it_tracks_exactly_the_active_connections() {
        let mut state = ServerState::new();
        let (a, _) = state.create_connection();
        let (b, _) = state.create_connection();
        assert!(state.contains(&a));
        assert!(state.contains(&b));
        assert_eq!(state.active_count(), 2);

        state.remove_connection(&a);
        assert!(!state.contains(&a));
        assert!(state.contains(&b));
        assert_eq!(state.active_count(), 1);

        state.remove_connection(&b);
        assert_eq!(state.active_count(), 0);
    }

    #[test]
    fn it_assigns_colors_from_count_before_insert() {
        let mut state = ServerState::new();
        let (a, color_a) = state.create_connection();
        let (_b, color_b) = state.create_connection();
        assert_eq!(color_a, PALETTE[0]);
        assert_eq!(color_b, PALETTE[1]);

        // a slot freed up, so the next joiner lands on PALETTE[1] again
        state.remove_connection(&a);
        let (_c, color_c) = state.create_connection();
        assert_eq!(color_c, PALETTE[1]);
    }

    #[test]
    fn it_starts_with_absent_cursor() {
        let mut state = ServerState::new();
        let (a, color) = state.create_connection();
        let snapshot = state.snapshot_without(&Uuid::new_v4());
        assert_eq!(
            snapshot.users,
            vec![(
                a,
                Presence {
                    color,
                    cursor: None
                }
            )]
        );
    }

    #[test]
    fn it_removes_presence_idempotently() {
        let mut state = ServerState::new();
        let (a, _) = state.create_connection();
        assert!(state.remove_connection(&a).is_some());
        assert!(state.remove_connection(&a).is_none());
    }

    #[test]
    fn it_rejects_updates_for_unknown_connections() {
        let mut state = ServerState::new();
        let ghost = Uuid::new_v4();
        assert!(!state.update_color(&ghost, "#123456"));
        assert!(!state.update_cursor(&ghost, Some(Point { x: 1.0, y: 2.0 })));
        assert_eq!(state.active_count(), 0);
    }

    #[test]
    fn it_updates_cursor_to_and_from_absent() {
        let mut state = ServerState::new();
        let (a, _) = state.create_connection();

        assert!(state.update_cursor(&a, Some(Point { x: 10.0, y: 20.0 })));
        let snapshot = state.snapshot_without(&Uuid::new_v4());
        assert_eq!(snapshot.users[0].1.cursor, Some(Point { x: 10.0, y: 20.0 }));

        assert!(state.update_cursor(&a, None));
        let snapshot = state.snapshot_without(&Uuid::new_v4());
        assert_eq!(snapshot.users[0].1.cursor, None);
    }

    #[test]
    fn it_excludes_the_new_connection_from_its_snapshot() {
        let mut state = ServerState::new();
        let (a, _) = state.create_connection();
        let (b, _) = state.create_connection();

        let snapshot = state.snapshot_without(&b);
        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(snapshot.users[0].0, a);
    }

    #[test]
    fn it_keeps_snapshots_as_point_in_time_copies() {
        let mut state = ServerState::new();
        let (a, color_a) = state.create_connection();
        let (b, _) = state.create_connection();

        let snapshot = state.snapshot_without(&b);
        state.update_color(&a, "#000000");
        state.remove_connection(&a);

        // the copy taken earlier is unaffected by later mutation
        assert_eq!(snapshot.users[0].1.color, color_a);
    }
}
