use serde::{Deserialize, Serialize};

/// Generation counter for async load results (ignore stale completions).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IoGeneration {
    pub load: u64,
}

impl IoGeneration {
    pub fn next_load(&mut self) -> u64 {
        self.load = self.load.wrapping_add(1);
        self.load
    }

    /// True when `id` belongs to the most recent load request.
    pub fn is_current_load(&self, id: u64) -> bool {
        id == self.load
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_load_supersedes_previous() {
        let mut generation = IoGeneration::default();
        let first = generation.next_load();
        let second = generation.next_load();
        assert!(!generation.is_current_load(first));
        assert!(generation.is_current_load(second));
    }

    #[test]
    fn counter_wraps() {
        let mut generation = IoGeneration { load: u64::MAX };
        assert_eq!(generation.next_load(), 0);
        assert!(generation.is_current_load(0));
    }
}
