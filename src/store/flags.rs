//! Busy flags.

use serde::Serialize;

/// One flag per operation category so unrelated actions stay enabled while
/// another is in flight.
///
/// The flags are independent. Callers are expected to set one category at a
/// time, but nothing here enforces mutual exclusion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusyFlags {
    pub loading: bool,
    pub generating: bool,
    pub saving: bool,
    pub exporting: bool,
}

impl BusyFlags {
    /// Whether any operation is in flight.
    pub fn any(&self) -> bool {
        self.loading || self.generating || self.saving || self.exporting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert!(!BusyFlags::default().any());
    }

    #[test]
    fn flags_may_overlap() {
        let flags = BusyFlags {
            loading: true,
            generating: true,
            ..Default::default()
        };
        assert!(flags.any());
        assert!(flags.loading && flags.generating);
    }
}
