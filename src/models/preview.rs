//! Preview resource accounting.
//!
//! The surrounding product materializes a preview blob (object URL, temp
//! file, ...) per uploaded document. This core does not own those resources
//! but must tell the caller exactly when to free them: on document removal,
//! on beneficiary truncation, on cascade deletions and on reset. The
//! registry tracks live handles so tests can assert nothing leaks.

use std::collections::HashSet;

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle(Uuid);

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: HashSet<Uuid>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        PreviewRegistry::default()
    }

    pub fn allocate(&mut self) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.live.insert(id);
        PreviewHandle(id)
    }

    /// Release a handle. Releasing twice is a no-op; the caller's blob is
    /// already gone.
    pub fn release(&mut self, handle: &PreviewHandle) {
        self.live.remove(&handle.0);
    }

    /// Number of previews the caller still holds.
    pub fn live(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_release_balance() {
        let mut registry = PreviewRegistry::new();
        let a = registry.allocate();
        let b = registry.allocate();
        assert_eq!(registry.live(), 2);

        registry.release(&a);
        assert_eq!(registry.live(), 1);
        registry.release(&a); // idempotent
        assert_eq!(registry.live(), 1);

        registry.release(&b);
        assert_eq!(registry.live(), 0);
    }
}
