//! In-game territory editor.
//!
//! Two corners picked at the player's feet define a rectangle; committing
//! allocates an id, inserts the territory, and saves the definition file.
//! A failed save rolls the insertion back so the in-memory set never
//! diverges from disk.

use glam::Vec2;

use turfwar_core::constants::{EDITOR_DELETE_RANGE, EDITOR_MIN_EXTENT};
use turfwar_core::enums::DefenseLevel;
use turfwar_core::events::WarEvent;
use turfwar_core::types::{FactionId, Rect, Territory, TerritoryId};
use turfwar_world::GameWorld;

use crate::territory::TerritoryStore;

/// Pending editor state: up to two picked corners.
#[derive(Debug, Default)]
pub struct TerritoryEditor {
    corner_a: Option<Vec2>,
    corner_b: Option<Vec2>,
}

impl TerritoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place_corner_a(&mut self, world: &dyn GameWorld) {
        let at = world.player_position().truncate();
        self.corner_a = Some(at);
        tracing::info!(x = at.x, y = at.y, "editor corner A placed");
    }

    pub fn place_corner_b(&mut self, world: &dyn GameWorld) {
        let at = world.player_position().truncate();
        self.corner_b = Some(at);
        tracing::info!(x = at.x, y = at.y, "editor corner B placed");
    }

    pub fn has_both_corners(&self) -> bool {
        self.corner_a.is_some() && self.corner_b.is_some()
    }

    /// Create the territory spanning the two corners and save.
    ///
    /// The pending corners are consumed only on success.
    pub fn commit(
        &mut self,
        store: &mut TerritoryStore,
        owner: Option<FactionId>,
        events: &mut Vec<WarEvent>,
    ) -> Result<TerritoryId, String> {
        let (Some(a), Some(b)) = (self.corner_a, self.corner_b) else {
            return Err("Editor commit needs both corners placed".to_string());
        };
        let rect = Rect::new(a, b);
        if rect.width() < EDITOR_MIN_EXTENT || rect.height() < EDITOR_MIN_EXTENT {
            return Err(format!(
                "Territory must span at least {EDITOR_MIN_EXTENT}x{EDITOR_MIN_EXTENT} m, got {:.1}x{:.1}",
                rect.width(),
                rect.height()
            ));
        }

        let id = store.next_editor_id();
        store.insert(Territory::new(id, rect, owner, DefenseLevel::Moderate));
        if let Err(e) = store.save() {
            store.remove(id);
            return Err(format!("Failed to save new territory: {e}"));
        }

        self.corner_a = None;
        self.corner_b = None;
        tracing::info!(%id, "territory committed");
        events.push(WarEvent::TerritoryCreated { territory: id });
        Ok(id)
    }

    /// Delete the territory centered nearest the player, if close enough.
    pub fn delete_nearest(
        &mut self,
        world: &dyn GameWorld,
        store: &mut TerritoryStore,
        events: &mut Vec<WarEvent>,
    ) -> Result<TerritoryId, String> {
        let player = world.player_position().truncate();
        let nearest = store
            .territories()
            .iter()
            .map(|t| (t.id, t.rect.center().distance(player)))
            .filter(|(_, d)| *d <= EDITOR_DELETE_RANGE)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let Some((id, _)) = nearest else {
            return Err(format!(
                "No territory centered within {EDITOR_DELETE_RANGE} m"
            ));
        };

        let removed = store
            .remove(id)
            .ok_or_else(|| format!("Territory {id} vanished mid-delete"))?;
        if let Err(e) = store.save() {
            store.insert(removed);
            return Err(format!("Failed to save after delete: {e}"));
        }

        tracing::info!(%id, "territory deleted");
        events.push(WarEvent::TerritoryDeleted { territory: id });
        Ok(id)
    }

    /// Drop any pending corners.
    pub fn cancel(&mut self) {
        self.corner_a = None;
        self.corner_b = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use glam::Vec3;
    use std::path::PathBuf;

    use turfwar_world::SimWorld;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("turfwar_editor_{name}.txt"))
    }

    fn setup(name: &str) -> (SimWorld, TerritoryStore, TerritoryEditor) {
        let world = SimWorld::flat(500.0, 10.0);
        let store = TerritoryStore::new(temp_file(name));
        (world, store, TerritoryEditor::new())
    }

    #[test]
    fn commit_creates_and_saves() {
        let (mut world, mut store, mut editor) = setup("commit");
        let mut events = Vec::new();

        world.set_player_position(Vec3::new(10.0, 10.0, 0.0));
        editor.place_corner_a(&world);
        world.set_player_position(Vec3::new(40.0, 30.0, 0.0));
        editor.place_corner_b(&world);

        let id = editor.commit(&mut store, None, &mut events).unwrap();
        assert_eq!(id, TerritoryId(1001), "allocation starts above the floor");
        let created = store.get(id).unwrap();
        assert_eq!(created.rect, Rect::from_bounds(10.0, 10.0, 40.0, 30.0));
        assert_eq!(created.owner, None);
        assert_eq!(created.defense, DefenseLevel::Moderate);
        assert!(!editor.has_both_corners(), "corners consumed on success");
        assert!(matches!(
            events.as_slice(),
            [WarEvent::TerritoryCreated { .. }]
        ));

        // The save landed: a fresh store sees the territory.
        let mut reloaded = TerritoryStore::new(temp_file("commit"));
        reloaded.reload_preserving_ownership().unwrap();
        assert!(reloaded.get(id).is_some());

        let _ = std::fs::remove_file(temp_file("commit"));
    }

    #[test]
    fn commit_requires_both_corners_and_extent() {
        let (mut world, mut store, mut editor) = setup("extent");
        let mut events = Vec::new();

        assert!(editor.commit(&mut store, None, &mut events).is_err());

        world.set_player_position(Vec3::ZERO);
        editor.place_corner_a(&world);
        world.set_player_position(Vec3::new(1.0, 50.0, 0.0));
        editor.place_corner_b(&world);
        assert!(
            editor.commit(&mut store, None, &mut events).is_err(),
            "1 m wide is under the minimum extent"
        );
        assert!(editor.has_both_corners(), "corners survive a failed commit");
        assert!(events.is_empty());

        let _ = std::fs::remove_file(temp_file("extent"));
    }

    #[test]
    fn failed_save_rolls_the_insertion_back() {
        let world = SimWorld::flat(500.0, 10.0);
        // A path under a missing directory cannot be written.
        let missing = std::env::temp_dir().join("turfwar_no_such_dir/defs.txt");
        let mut store = TerritoryStore::new(missing);
        let mut editor = TerritoryEditor::new();
        let mut events = Vec::new();

        let mut w = world;
        w.set_player_position(Vec3::ZERO);
        editor.place_corner_a(&w);
        w.set_player_position(Vec3::new(20.0, 20.0, 0.0));
        editor.place_corner_b(&w);

        assert!(editor.commit(&mut store, None, &mut events).is_err());
        assert!(store.territories().is_empty(), "insertion was rolled back");
        assert!(events.is_empty());
    }

    #[test]
    fn delete_nearest_respects_the_range() {
        let (mut world, mut store, mut editor) = setup("delete");
        let mut events = Vec::new();

        store.insert(Territory::new(
            TerritoryId(1),
            Rect::from_bounds(0.0, 0.0, 20.0, 20.0),
            None,
            DefenseLevel::Moderate,
        ));
        store.insert(Territory::new(
            TerritoryId(2),
            Rect::from_bounds(100.0, 100.0, 120.0, 120.0),
            None,
            DefenseLevel::Moderate,
        ));

        // Too far from everything.
        world.set_player_position(Vec3::new(400.0, 400.0, 0.0));
        assert!(editor.delete_nearest(&world, &mut store, &mut events).is_err());

        world.set_player_position(Vec3::new(15.0, 15.0, 0.0));
        let id = editor.delete_nearest(&world, &mut store, &mut events).unwrap();
        assert_eq!(id, TerritoryId(1));
        assert!(store.get(TerritoryId(1)).is_none());
        assert!(store.get(TerritoryId(2)).is_some());
        assert!(matches!(
            events.as_slice(),
            [WarEvent::TerritoryDeleted { territory: TerritoryId(1) }]
        ));

        let _ = std::fs::remove_file(temp_file("delete"));
    }

    #[test]
    fn cancel_clears_pending_corners() {
        let (world, _store, mut editor) = setup("cancel");
        editor.place_corner_a(&world);
        editor.place_corner_b(&world);
        editor.cancel();
        assert!(!editor.has_both_corners());
    }
}
