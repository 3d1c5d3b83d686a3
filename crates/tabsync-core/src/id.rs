//! Identity types for workspace snapshots
//!
//! Identifiers are assigned by the live system. They are stable for the
//! lifetime of the resource they name and unique within one snapshot, but a
//! resource recreated from a remote snapshot always receives a fresh one.

use std::fmt;

/// Item identity - assigned by the live system, unique within a snapshot
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ItemId(pub u64);

impl ItemId {
    #[inline]
    pub fn new(id: u64) -> Self {
        ItemId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group identity
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GroupId(pub u64);

impl GroupId {
    #[inline]
    pub fn new(id: u64) -> Self {
        GroupId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group({})", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Window (workspace region) identity
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct WindowId(pub u64);

impl WindowId {
    #[inline]
    pub fn new(id: u64) -> Self {
        WindowId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl fmt::Debug for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Window({})", self.0)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display_plain_number() {
        assert_eq!(ItemId::new(2047620621).to_string(), "2047620621");
        assert_eq!(GroupId::new(892857732).to_string(), "892857732");
        assert_eq!(format!("{:?}", WindowId::new(100)), "Window(100)");
    }

    #[test]
    fn test_ids_order_numerically() {
        let mut ids = vec![ItemId::new(3), ItemId::new(1), ItemId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![ItemId::new(1), ItemId::new(2), ItemId::new(3)]);
    }
}
