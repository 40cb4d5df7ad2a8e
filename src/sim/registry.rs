//! Entity registry
//!
//! A generational arena: entities live in stable slots, each layer keeps its
//! own insertion-ordered list of ids. Destroying an entity only marks it dead;
//! the slot is reclaimed by [`EntityRegistry::compact`] between frames, so a
//! destroy requested mid-iteration never disturbs the traversal.

use super::entity::{Entity, Layer, Signal};

/// Stable handle to a registry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    alive: bool,
    entity: Option<Entity>,
}

#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Ids per layer in insertion order, indexed by `Layer::index`
    layers: [Vec<EntityId>; 3],
    /// Dead but not yet reclaimed
    pending: Vec<EntityId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `entity`, appending it to its layer
    pub fn add(&mut self, entity: Entity) -> EntityId {
        let layer = entity.layer;
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.alive = true;
                slot.entity = Some(entity);
                EntityId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    alive: true,
                    entity: Some(entity),
                });
                EntityId {
                    index,
                    generation: 0,
                }
            }
        };
        self.layers[layer.index()].push(id);
        id
    }

    /// Mark an entity dead. It is skipped from now on and reclaimed at the
    /// next [`compact`](Self::compact). Returns false if it was already gone.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        match self.slot_mut(id) {
            Some(slot) if slot.alive => {
                slot.alive = false;
                self.pending.push(id);
                true
            }
            _ => false,
        }
    }

    /// Destroy every entity in `layer`
    pub fn destroy_layer(&mut self, layer: Layer) {
        let ids = self.layers[layer.index()].clone();
        for id in ids {
            self.destroy(id);
        }
    }

    /// Reclaim dead slots and drop their ids from the layer lists
    pub fn compact(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        for id in self.pending.drain(..) {
            let slot = &mut self.slots[id.index as usize];
            if slot.generation == id.generation && !slot.alive {
                if let Some(entity) = slot.entity.take() {
                    log::debug!("Removed {:?} at {:?}", entity.kind, entity.position);
                }
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
        let slots = &self.slots;
        for list in &mut self.layers {
            list.retain(|id| {
                let slot = &slots[id.index as usize];
                slot.generation == id.generation && slot.alive
            });
        }
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.slot(id).is_some_and(|slot| slot.alive)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slot(id)
            .filter(|slot| slot.alive)
            .and_then(|slot| slot.entity.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slot_mut(id)
            .filter(|slot| slot.alive)
            .and_then(|slot| slot.entity.as_mut())
    }

    /// Two distinct live entities at once
    pub fn get_pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut Entity, &mut Entity)> {
        if a.index == b.index || !self.is_alive(a) || !self.is_alive(b) {
            return None;
        }
        let (lo, hi) = if a.index < b.index { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(hi.index as usize);
        let lo_entity = head[lo.index as usize].entity.as_mut()?;
        let hi_entity = tail[0].entity.as_mut()?;
        if a.index < b.index {
            Some((lo_entity, hi_entity))
        } else {
            Some((hi_entity, lo_entity))
        }
    }

    /// Live entities, Background → Foreground → Player, insertion order within a layer
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        Layer::ALL.into_iter().flat_map(move |layer| self.iter_layer(layer))
    }

    /// Live entities in one layer
    pub fn iter_layer(&self, layer: Layer) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.layers[layer.index()]
            .iter()
            .filter_map(move |&id| self.get(id).map(|entity| (id, entity)))
    }

    /// Visit every live entity in layer order.
    ///
    /// `Signal::Destroy` kills the entity on the spot (it will not be visited
    /// again this frame). Ids that returned `Signal::GameOver` are collected
    /// and returned.
    pub fn update_each<F>(&mut self, mut visit: F) -> Vec<EntityId>
    where
        F: FnMut(EntityId, &mut Entity) -> Signal,
    {
        let mut game_over = Vec::new();
        for layer in Layer::ALL {
            let mut i = 0;
            while i < self.layers[layer.index()].len() {
                let id = self.layers[layer.index()][i];
                i += 1;

                let signal = match self.get_mut(id) {
                    Some(entity) => visit(id, entity),
                    None => continue,
                };
                match signal {
                    Signal::None => {}
                    Signal::Destroy => {
                        self.destroy(id);
                    }
                    Signal::GameOver => game_over.push(id),
                }
            }
        }
        game_over
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.alive).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live entities in `layer`
    pub fn layer_len(&self, layer: Layer) -> usize {
        self.iter_layer(layer).count()
    }

    fn slot(&self, id: EntityId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;
    use glam::Vec2;

    fn pipe(x: f32) -> Entity {
        Entity::pipe(Vec2::new(x, 0.0), None, 5.0)
    }

    #[test]
    fn test_layer_order() {
        let mut registry = EntityRegistry::new();
        let bird = registry.add(Entity::bird(Vec2::new(20.0, 100.0), None));
        let p1 = registry.add(pipe(1.0));
        let p2 = registry.add(pipe(2.0));

        let order: Vec<EntityId> = registry.iter().map(|(id, _)| id).collect();
        // Foreground before Player, insertion order within Foreground
        assert_eq!(order, vec![p1, p2, bird]);
    }

    #[test]
    fn test_destroy_hides_immediately() {
        let mut registry = EntityRegistry::new();
        let a = registry.add(pipe(1.0));
        let b = registry.add(pipe(2.0));

        assert!(registry.destroy(a));
        assert!(!registry.destroy(a));
        assert!(!registry.is_alive(a));
        assert!(registry.get(a).is_none());
        assert_eq!(registry.iter().count(), 1);
        assert_eq!(registry.len(), 1);

        registry.compact();
        assert!(registry.get(a).is_none());
        assert!(registry.get(b).is_some());
    }

    #[test]
    fn test_stale_id_does_not_alias_reused_slot() {
        let mut registry = EntityRegistry::new();
        let a = registry.add(pipe(1.0));
        registry.destroy(a);
        registry.compact();

        let b = registry.add(pipe(9.0));
        assert_ne!(a, b);
        assert!(registry.get(a).is_none());
        assert!(!registry.destroy(a));
        assert_eq!(registry.get(b).unwrap().position.x, 9.0);
    }

    #[test]
    fn test_destroy_during_update_is_safe() {
        let mut registry = EntityRegistry::new();
        let ids: Vec<EntityId> = (0..5).map(|i| registry.add(pipe(i as f32))).collect();

        let mut visited = Vec::new();
        let over = registry.update_each(|id, entity| {
            visited.push(id);
            if entity.position.x as i32 % 2 == 0 {
                Signal::Destroy
            } else {
                Signal::None
            }
        });
        assert!(over.is_empty());
        assert_eq!(visited, ids);
        assert_eq!(registry.len(), 2);

        // Destroyed entities are never visited again, even before compaction
        let mut second = Vec::new();
        let _ = registry.update_each(|id, _| {
            second.push(id);
            Signal::None
        });
        assert_eq!(second, vec![ids[1], ids[3]]);
    }

    #[test]
    fn test_update_collects_game_over() {
        let mut registry = EntityRegistry::new();
        let bird = registry.add(Entity::bird(Vec2::ZERO, None));
        let over = registry.update_each(|_, entity| match entity.kind {
            EntityKind::Bird(_) => Signal::GameOver,
            _ => Signal::None,
        });
        assert_eq!(over, vec![bird]);
        assert!(registry.is_alive(bird));
    }

    #[test]
    fn test_destroy_layer() {
        let mut registry = EntityRegistry::new();
        registry.add(pipe(1.0));
        registry.add(pipe(2.0));
        let bird = registry.add(Entity::bird(Vec2::ZERO, None));

        registry.destroy_layer(Layer::Foreground);
        registry.compact();
        assert_eq!(registry.layer_len(Layer::Foreground), 0);
        assert_eq!(registry.len(), 1);
        assert!(registry.is_alive(bird));
    }

    #[test]
    fn test_get_pair_mut() {
        let mut registry = EntityRegistry::new();
        let a = registry.add(pipe(1.0));
        let b = registry.add(pipe(2.0));

        let (ea, eb) = registry.get_pair_mut(b, a).unwrap();
        assert_eq!(ea.position.x, 2.0);
        assert_eq!(eb.position.x, 1.0);
        ea.position.x = 20.0;
        assert_eq!(registry.get(b).unwrap().position.x, 20.0);

        assert!(registry.get_pair_mut(a, a).is_none());
        registry.destroy(a);
        assert!(registry.get_pair_mut(a, b).is_none());
    }
}
