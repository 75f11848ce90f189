//! Thread-safe registry handle. Every call takes the same lock, so adds from
//! several threads are serialized and a snapshot never sees half a tick.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    body::BodyId,
    error::CoreResult,
    registry::{Registry, RenderItem},
};

#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    pub fn add_sun(&self) -> CoreResult<BodyId> {
        self.inner.lock().add_sun()
    }

    pub fn add_planet(&self) -> CoreResult<BodyId> {
        self.inner.lock().add_planet()
    }

    pub fn add_moon(&self) -> CoreResult<BodyId> {
        self.inner.lock().add_moon()
    }

    pub fn update_all(&self, dt: f32) {
        self.inner.lock().update_all(dt);
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Render list of the last completed tick.
    pub fn snapshot(&self) -> Vec<RenderItem> {
        self.inner.lock().render_list().collect()
    }

    /// Run `f` with exclusive access for anything not covered above.
    pub fn with<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{body::BodyKind, config::SolarConfig, error::CoreError};
    use std::thread;

    fn shared() -> SharedRegistry {
        SharedRegistry::new(Registry::new(SolarConfig::default().with_seed(77)))
    }

    #[test]
    fn concurrent_suns_yield_exactly_one() {
        let reg = shared();
        let accepted = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let reg = reg.clone();
                    s.spawn(move || reg.add_sun().is_ok())
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });
        assert_eq!(accepted, 1);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn concurrent_planets_respect_cap() {
        let reg = shared();
        reg.add_sun().unwrap();

        let results: Vec<CoreResult<BodyId>> = thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    let reg = reg.clone();
                    s.spawn(move || reg.add_planet())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let ok = results.iter().filter(|r| r.is_ok()).count();
        let capped = results
            .iter()
            .filter(|r| matches!(r, Err(CoreError::CapacityExceeded { .. })))
            .count();
        assert_eq!(ok, 5);
        assert_eq!(capped, 11);
        assert_eq!(reg.with(|r| r.planet_count()), 5);
    }

    #[test]
    fn snapshot_matches_registry_after_update() {
        let reg = shared();
        reg.add_sun().unwrap();
        reg.add_planet().unwrap();
        reg.add_moon().unwrap();
        reg.update_all(1.0 / 60.0);

        let snap = reg.snapshot();
        assert_eq!(snap.len(), 3);
        reg.with(|r| {
            assert_eq!(r.ticks(), 1);
            for item in &snap {
                assert_eq!(item.world, r.get(item.id).unwrap().world_matrix());
            }
            assert_eq!(r.get(snap[2].id).unwrap().kind(), BodyKind::Moon);
        });

        reg.clear();
        assert!(reg.is_empty());
        assert!(reg.snapshot().is_empty());
    }
}
