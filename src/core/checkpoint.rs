use crate::core::dataset::Dataset;
use crate::core::error::EngineError;
use std::sync::Arc;

/// Single-slot snapshot store backing one-step undo.
///
/// Storing overwrites; restoring does not consume the slot.
#[derive(Debug, Default, Clone)]
pub struct Checkpoint {
    slot: Option<Arc<Dataset>>,
}

impl Checkpoint {
    pub fn store(&mut self, dataset: Arc<Dataset>) {
        self.slot = Some(dataset);
    }

    pub fn undo(&self) -> Result<Arc<Dataset>, EngineError> {
        self.slot.clone().ok_or(EngineError::NoCheckpoint)
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn is_set(&self) -> bool {
        self.slot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_without_snapshot_fails() {
        let cp = Checkpoint::default();
        assert!(matches!(cp.undo(), Err(EngineError::NoCheckpoint)));
    }

    #[test]
    fn test_store_overwrites_and_undo_is_repeatable() {
        let mut cp = Checkpoint::default();
        let first = Arc::new(Dataset::new(vec!["a".into()], vec![]));
        let second = Arc::new(Dataset::new(vec!["b".into()], vec![]));
        cp.store(first);
        cp.store(second.clone());
        assert_eq!(cp.undo().unwrap(), second);
        assert_eq!(cp.undo().unwrap(), second);
        cp.clear();
        assert!(!cp.is_set());
    }
}
