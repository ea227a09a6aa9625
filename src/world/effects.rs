//! Per-tile effects and the sparse effect map

use glam::IVec2;
use hecs::Entity;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::search::SearchFilter;

/// What occupies a single tile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileEffects {
    obstructions: SmallVec<[Entity; 2]>,
}

impl TileEffects {
    /// Effects of an empty tile
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Effects of a tile blocked by the given entities
    #[must_use]
    pub fn obstructed_by(obstructions: impl IntoIterator<Item = Entity>) -> Self {
        let mut effects = Self::new();
        for entity in obstructions {
            effects.add_obstruction(entity);
        }
        effects
    }

    /// Mark an entity as obstructing this tile
    pub fn add_obstruction(&mut self, entity: Entity) {
        if !self.obstructions.contains(&entity) {
            self.obstructions.push(entity);
        }
    }

    /// Stop `entity` obstructing this tile
    pub fn remove_obstruction(&mut self, entity: Entity) {
        self.obstructions.retain(|e| *e != entity);
    }

    /// Entities obstructing this tile
    #[must_use]
    pub fn obstructions(&self) -> &[Entity] {
        &self.obstructions
    }

    /// Whether anything may enter this tile
    #[must_use]
    pub fn is_traversable(&self) -> bool {
        self.obstructions.is_empty()
    }

    /// Whether `subject` may enter this tile, ignoring its own obstruction
    #[must_use]
    pub fn is_traversable_for(&self, subject: Entity) -> bool {
        self.obstructions.iter().all(|&e| e == subject)
    }

    /// Combine with another set of effects
    #[must_use]
    pub fn overlay(&self, overlay: &TileEffects) -> TileEffects {
        let mut merged = self.clone();
        for &entity in &overlay.obstructions {
            merged.add_obstruction(entity);
        }
        merged
    }

    /// Combine any number of effects
    #[must_use]
    pub fn merge<'a>(tiles: impl IntoIterator<Item = &'a TileEffects>) -> TileEffects {
        tiles
            .into_iter()
            .fold(TileEffects::new(), |acc, tile| acc.overlay(tile))
    }
}

/// Read access to tile effects, the surface routing rules query
pub trait TileQuery {
    /// Effects on a single tile
    fn tile_effects(&self, tile: IVec2) -> TileEffects;

    /// Effects on every tile selected by a filter
    fn tile_effects_in(&self, filter: &dyn SearchFilter) -> Vec<TileEffects>;
}

/// Sparse map of tile effects; absent tiles are empty
#[derive(Debug, Clone, Default)]
pub struct EffectMap {
    tiles: FxHashMap<IVec2, TileEffects>,
}

impl EffectMap {
    /// Create an empty effect map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all effects
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Number of tiles carrying effects
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Check if no tile carries effects
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Overlay effects onto one tile
    pub fn apply_overlay_effects(&mut self, tile: IVec2, effects: &TileEffects) {
        self.tiles
            .entry(tile)
            .and_modify(|existing| *existing = existing.overlay(effects))
            .or_insert_with(|| effects.clone());
    }

    /// Overlay effects onto every tile selected by a filter
    pub fn apply_overlay_effects_in(&mut self, filter: &dyn SearchFilter, effects: &TileEffects) {
        for tile in filter.search_bounds().iter() {
            if filter.should_include(tile) {
                self.apply_overlay_effects(tile, effects);
            }
        }
    }

    /// Mark a tile as obstructed by an entity
    pub fn obstruct(&mut self, tile: IVec2, entity: Entity) {
        self.tiles.entry(tile).or_default().add_obstruction(entity);
    }

    /// Remove every obstruction placed by an entity
    pub fn remove_obstructions(&mut self, entity: Entity) {
        for effects in self.tiles.values_mut() {
            effects.remove_obstruction(entity);
        }
        self.tiles.retain(|_, effects| *effects != TileEffects::default());
    }

    /// Overlay another map, shifted by `offset`
    pub fn overlay(&mut self, other: &EffectMap, offset: IVec2) {
        for (&tile, effects) in &other.tiles {
            self.apply_overlay_effects(tile + offset, effects);
        }
    }
}

impl TileQuery for EffectMap {
    fn tile_effects(&self, tile: IVec2) -> TileEffects {
        self.tiles.get(&tile).cloned().unwrap_or_default()
    }

    fn tile_effects_in(&self, filter: &dyn SearchFilter) -> Vec<TileEffects> {
        filter
            .search_bounds()
            .iter()
            .filter(|&tile| filter.should_include(tile))
            .map(|tile| self.tile_effects(tile))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::world::search::RadialSearchFilter;

    fn test_entities(count: usize) -> Vec<Entity> {
        let mut world = hecs::World::new();
        (0..count).map(|_| world.spawn(())).collect()
    }

    #[test]
    fn test_missing_tile_is_traversable() {
        let map = EffectMap::new();

        assert!(map.tile_effects(IVec2::new(4, -2)).is_traversable());
    }

    #[test]
    fn test_obstruction_ignores_subject() {
        let entities = test_entities(2);
        let effects = TileEffects::obstructed_by([entities[0]]);

        assert!(!effects.is_traversable());
        assert!(effects.is_traversable_for(entities[0]));
        assert!(!effects.is_traversable_for(entities[1]));
    }

    #[test]
    fn test_overlay_merges_obstructions() {
        let entities = test_entities(2);
        let a = TileEffects::obstructed_by([entities[0]]);
        let b = TileEffects::obstructed_by([entities[1], entities[0]]);

        let merged = TileEffects::merge([&a, &b]);
        assert_eq!(merged.obstructions().len(), 2);
    }

    #[test]
    fn test_filter_query() {
        let entities = test_entities(1);
        let mut map = EffectMap::new();
        map.obstruct(IVec2::new(1, 0), entities[0]);

        let near = map.tile_effects_in(&RadialSearchFilter::new(Vec2::ZERO, 1.0));
        assert_eq!(near.len(), 5);
        assert_eq!(near.iter().filter(|e| !e.is_traversable()).count(), 1);

        let far = map.tile_effects_in(&RadialSearchFilter::new(Vec2::new(-3.0, 0.0), 1.0));
        assert!(far.iter().all(TileEffects::is_traversable));
    }

    #[test]
    fn test_remove_obstructions() {
        let entities = test_entities(2);
        let mut map = EffectMap::new();
        map.obstruct(IVec2::new(0, 0), entities[0]);
        map.obstruct(IVec2::new(1, 0), entities[0]);
        map.obstruct(IVec2::new(1, 0), entities[1]);

        map.remove_obstructions(entities[0]);

        assert_eq!(map.len(), 1);
        assert!(map.tile_effects(IVec2::new(0, 0)).is_traversable());
        assert_eq!(map.tile_effects(IVec2::new(1, 0)).obstructions(), &[entities[1]]);
    }

    #[test]
    fn test_overlay_with_offset() {
        let entities = test_entities(1);
        let mut source = EffectMap::new();
        source.obstruct(IVec2::ZERO, entities[0]);

        let mut map = EffectMap::new();
        map.overlay(&source, IVec2::new(2, 3));

        assert!(!map.tile_effects(IVec2::new(2, 3)).is_traversable());
        assert!(map.tile_effects(IVec2::ZERO).is_traversable());
    }
}
