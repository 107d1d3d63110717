//! EggPool — handle arena of reusable egg visuals
//!
//! Eggs are acquired when a roll starts and released when it ends. Handles
//! carry a generation so a released handle can never touch a reused slot.

use std::fmt;

use serde::{Deserialize, Serialize};

use ec_stage::{EggSprite, HenColor, WorldPos};

use crate::{RollError, RollResult};

/// Handle to a pooled egg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EggHandle {
    index: u32,
    generation: u32,
}

impl EggHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for EggHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "egg#{}v{}", self.index, self.generation)
    }
}

/// Render state of one egg
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Egg {
    pub position: WorldPos,
    pub visible: bool,
    pub sprite: EggSprite,
    pub color: Option<HenColor>,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    egg: Egg,
    generation: u32,
    in_use: bool,
}

/// Arena of eggs indexed by [`EggHandle`]
#[derive(Debug, Clone, Default)]
pub struct EggPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl EggPool {
    /// Create a pool with `capacity` idle eggs
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = vec![Slot::default(); capacity];
        // Pop from the back hands out slot 0 first
        let free = (0..capacity as u32).rev().collect();
        Self { slots, free }
    }

    /// Take an idle egg, growing the pool if none is free
    pub fn acquire(&mut self, color: HenColor) -> EggHandle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                log::debug!("Egg pool exhausted, growing to {}", self.slots.len() + 1);
                self.slots.push(Slot::default());
                self.slots.len() as u32 - 1
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.in_use = true;
        slot.egg = Egg {
            position: WorldPos::default(),
            visible: true,
            sprite: EggSprite::Egg,
            color: Some(color),
        };

        EggHandle {
            index,
            generation: slot.generation,
        }
    }

    /// Return an egg to the pool
    pub fn release(&mut self, handle: EggHandle) -> RollResult<()> {
        let slot = self
            .slot_mut(handle)
            .ok_or(RollError::StaleHandle(handle))?;
        slot.in_use = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.egg.visible = false;
        self.free.push(handle.index);
        Ok(())
    }

    /// Get a live egg
    pub fn get(&self, handle: EggHandle) -> Option<&Egg> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.in_use && s.generation == handle.generation)
            .map(|s| &s.egg)
    }

    /// Get a live egg mutably
    pub fn get_mut(&mut self, handle: EggHandle) -> Option<&mut Egg> {
        self.slot_mut(handle).map(|s| &mut s.egg)
    }

    fn slot_mut(&mut self, handle: EggHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.in_use && s.generation == handle.generation)
    }

    pub fn is_live(&self, handle: EggHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Total slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Eggs currently acquired
    pub fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Live eggs, for rendering
    pub fn live(&self) -> impl Iterator<Item = (EggHandle, &Egg)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.in_use).map(|(i, s)| {
            (
                EggHandle {
                    index: i as u32,
                    generation: s.generation,
                },
                &s.egg,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release_reuses_slot() {
        let mut pool = EggPool::with_capacity(2);
        assert_eq!(pool.in_use(), 0);

        let a = pool.acquire(HenColor::Red);
        assert_eq!(a.index(), 0);
        assert_eq!(pool.in_use(), 1);
        assert!(pool.get(a).is_some_and(|e| e.visible && e.color == Some(HenColor::Red)));

        pool.release(a).unwrap();
        assert_eq!(pool.in_use(), 0);
        assert!(!pool.is_live(a));

        let b = pool.acquire(HenColor::Blue);
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut pool = EggPool::with_capacity(1);
        let a = pool.acquire(HenColor::Green);
        pool.release(a).unwrap();

        let err = pool.release(a).unwrap_err();
        assert!(matches!(err, RollError::StaleHandle(h) if h == a));
        assert!(pool.get_mut(a).is_none());
    }

    #[test]
    fn test_pool_grows_when_exhausted() {
        let mut pool = EggPool::with_capacity(1);
        let a = pool.acquire(HenColor::Red);
        let b = pool.acquire(HenColor::Red);
        assert_ne!(a.index(), b.index());
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.live().count(), 2);
    }

    #[test]
    fn test_reacquire_resets_visual() {
        let mut pool = EggPool::with_capacity(1);
        let a = pool.acquire(HenColor::Red);
        if let Some(egg) = pool.get_mut(a) {
            egg.sprite = EggSprite::Yolk;
            egg.position = WorldPos::new(3.0, 4.0);
        }
        pool.release(a).unwrap();

        let b = pool.acquire(HenColor::Purple);
        let egg = pool.get(b).unwrap();
        assert_eq!(egg.sprite, EggSprite::Egg);
        assert_eq!(egg.position, WorldPos::default());
    }
}
