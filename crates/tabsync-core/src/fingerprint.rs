//! Change fingerprint - deterministic content hash of a snapshot
//!
//! Callers compare the fingerprint of the current capture with the one
//! recorded after the last successful push to detect local changes without
//! running the differ. The capture timestamp is excluded.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::{BookmarkNode, Group, Item, Snapshot};

/// SHA-256 over the canonical byte encoding of a snapshot
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    pub fn of(snapshot: &Snapshot) -> Self {
        let mut hasher = Sha256::new();

        hasher.update((snapshot.groups.len() as u64).to_le_bytes());
        for group in &snapshot.groups {
            encode_group(&mut hasher, group);
        }

        hasher.update((snapshot.items.len() as u64).to_le_bytes());
        for item in &snapshot.items {
            encode_item(&mut hasher, item);
        }

        hasher.update((snapshot.bookmarks.len() as u64).to_le_bytes());
        for node in &snapshot.bookmarks {
            encode_bookmark(&mut hasher, node);
        }

        Fingerprint(hasher.finalize().into())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 8 bytes are plenty to tell captures apart in logs
        write!(f, "Fingerprint({})", hex::encode(&self.0[..8]))
    }
}

/// Length-prefixed so adjacent strings cannot alias
fn encode_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn encode_item(hasher: &mut Sha256, item: &Item) {
    hasher.update(item.id.to_bytes());
    encode_str(hasher, &item.location);
    match item.group {
        Some(group) => {
            hasher.update([1u8]);
            hasher.update(group.to_bytes());
        }
        None => hasher.update([0u8]),
    }
}

fn encode_group(hasher: &mut Sha256, group: &Group) {
    hasher.update(group.id.to_bytes());
    encode_str(hasher, &group.title);
    hasher.update([group.color.to_byte()]);
    hasher.update(group.window.to_bytes());
    hasher.update((group.items.len() as u64).to_le_bytes());
    for item in &group.items {
        encode_item(hasher, item);
    }
}

fn encode_bookmark(hasher: &mut Sha256, node: &BookmarkNode) {
    encode_str(hasher, &node.id);
    encode_str(hasher, &node.title);
    match &node.url {
        Some(url) => {
            hasher.update([1u8]);
            encode_str(hasher, url);
        }
        None => hasher.update([0u8]),
    }
    hasher.update((node.children.len() as u64).to_le_bytes());
    for child in &node.children {
        encode_bookmark(hasher, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GroupColor, GroupId, ItemId, Timestamp, WindowId};

    fn sample(at: u64) -> Snapshot {
        Snapshot::new(Timestamp::from_millis(at))
            .with_item(ItemId::new(1), "https://google.com")
            .with_group(
                Group::new(GroupId::new(5), "news", GroupColor::Red, WindowId::new(1))
                    .with_item(ItemId::new(2), "https://lwn.net"),
            )
            .with_bookmarks(vec![BookmarkNode::bookmark("1", "rust", "https://rust-lang.org")])
    }

    #[test]
    fn test_fingerprint_ignores_timestamp() {
        assert_eq!(Fingerprint::of(&sample(1)), Fingerprint::of(&sample(99)));
    }

    #[test]
    fn test_fingerprint_sees_location_change() {
        let mut changed = sample(1);
        changed.items[0].location = "https://yahoo.com".into();
        assert_ne!(Fingerprint::of(&sample(1)), Fingerprint::of(&changed));
    }

    #[test]
    fn test_fingerprint_sees_bookmark_change() {
        let changed = sample(1).with_bookmarks(Vec::new());
        assert_ne!(Fingerprint::of(&sample(1)), Fingerprint::of(&changed));
    }

    #[test]
    fn test_fingerprint_no_string_aliasing() {
        let a = Snapshot::default().with_group(Group::new(GroupId::new(1), "ab", GroupColor::Grey, WindowId::new(1)));
        let b = Snapshot::default().with_group(Group::new(GroupId::new(1), "a", GroupColor::Grey, WindowId::new(1)));
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_fingerprint_hex_display() {
        let hex = Fingerprint::of(&Snapshot::default()).to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_hex_matches_bytes() {
        let fp = Fingerprint([0xab; 32]);
        assert_eq!(fp.to_string(), "ab".repeat(32));
        assert_eq!(format!("{:?}", fp), format!("Fingerprint({})", "ab".repeat(8)));
        assert_eq!(hex::decode(fp.to_string()).unwrap(), fp.as_bytes().to_vec());
    }
}
