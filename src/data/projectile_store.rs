use crate::types::{FactionId, Projectile, ProjectileId, Vec2};

/// Active projectiles in firing order. Ids are never reused within a run.
pub struct ProjectileStore {
    projectiles: Vec<Projectile>,
    next_id: u64,
}

impl ProjectileStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            projectiles: Vec::with_capacity(capacity),
            next_id: 0,
        }
    }

    pub fn spawn(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        firing_faction: FactionId,
        firing_color: u32,
    ) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;
        self.projectiles.push(Projectile {
            id,
            position,
            velocity,
            firing_faction,
            firing_color,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn as_slice(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Projectile> {
        self.projectiles.iter_mut()
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    /// Drop every projectile whose id is in `ids`, keeping firing order.
    pub fn remove_all(&mut self, ids: &[ProjectileId]) {
        if ids.is_empty() {
            return;
        }
        self.projectiles.retain(|p| !ids.contains(&p.id));
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
    }
}

impl std::ops::Index<usize> for ProjectileStore {
    type Output = Projectile;

    fn index(&self, index: usize) -> &Self::Output {
        &self.projectiles[index]
    }
}
