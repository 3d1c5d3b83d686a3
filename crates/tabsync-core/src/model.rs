//! Snapshot model - loose items, groups and the bookmark tree
//!
//! A snapshot is a full capture of one workspace replica:
//! - Loose items (no owning group)
//! - Groups, each owning an ordered list of items
//! - An opaque bookmark tree, carried along but never diffed
//!
//! Item and group identity is the identifier alone. Content equality of a
//! group (title, color, membership) is decided by the differ, not by `Eq`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::{GroupId, ItemId, SyncError, SyncResult, Timestamp, WindowId};

/// Leaf resource (an open tab)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Item {
    pub id: ItemId,
    /// Address of the resource
    pub location: String,
    /// Owning group, `None` for loose items
    pub group: Option<GroupId>,
}

impl Item {
    pub fn loose(id: ItemId, location: impl Into<String>) -> Self {
        Item {
            id,
            location: location.into(),
            group: None,
        }
    }

    pub fn grouped(id: ItemId, location: impl Into<String>, group: GroupId) -> Self {
        Item {
            id,
            location: location.into(),
            group: Some(group),
        }
    }
}

/// Group color tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum GroupColor {
    #[default]
    Grey = 0x00,
    Blue = 0x01,
    Red = 0x02,
    Yellow = 0x03,
    Green = 0x04,
    Pink = 0x05,
    Purple = 0x06,
    Cyan = 0x07,
    Orange = 0x08,
}

impl GroupColor {
    pub const ALL: [GroupColor; 9] = [
        GroupColor::Grey,
        GroupColor::Blue,
        GroupColor::Red,
        GroupColor::Yellow,
        GroupColor::Green,
        GroupColor::Pink,
        GroupColor::Purple,
        GroupColor::Cyan,
        GroupColor::Orange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GroupColor::Grey => "grey",
            GroupColor::Blue => "blue",
            GroupColor::Red => "red",
            GroupColor::Yellow => "yellow",
            GroupColor::Green => "green",
            GroupColor::Pink => "pink",
            GroupColor::Purple => "purple",
            GroupColor::Cyan => "cyan",
            GroupColor::Orange => "orange",
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupColor {
    type Err = SyncError;

    fn from_str(s: &str) -> SyncResult<Self> {
        GroupColor::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| SyncError::invalid(format!("unknown group color {:?}", s)))
    }
}

/// Named, colored container of items
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    pub color: GroupColor,
    /// Member items, in display order
    pub items: Vec<Item>,
    pub window: WindowId,
}

impl Group {
    pub fn new(id: GroupId, title: impl Into<String>, color: GroupColor, window: WindowId) -> Self {
        Group {
            id,
            title: title.into(),
            color,
            items: Vec::new(),
            window,
        }
    }

    /// Append a member item owned by this group
    pub fn with_item(mut self, id: ItemId, location: impl Into<String>) -> Self {
        self.items.push(Item::grouped(id, location, self.id));
        self
    }

    /// Label equality: title and color
    pub fn same_label(&self, other: &Group) -> bool {
        self.title == other.title && self.color == other.color
    }
}

/// Node of the opaque bookmark tree
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BookmarkNode {
    pub id: String,
    pub title: String,
    /// Set for bookmarks, unset for folders
    pub url: Option<String>,
    pub children: Vec<BookmarkNode>,
}

impl BookmarkNode {
    pub fn folder(id: impl Into<String>, title: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        BookmarkNode {
            id: id.into(),
            title: title.into(),
            url: None,
            children,
        }
    }

    pub fn bookmark(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        BookmarkNode {
            id: id.into(),
            title: title.into(),
            url: Some(url.into()),
            children: Vec::new(),
        }
    }

    /// Number of url-bearing nodes in this subtree
    pub fn bookmark_count(&self) -> usize {
        let own = usize::from(self.url.is_some());
        own + self.children.iter().map(|c| c.bookmark_count()).sum::<usize>()
    }
}

/// Full capture of a workspace replica
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Snapshot {
    /// Loose items
    pub items: Vec<Item>,
    pub groups: Vec<Group>,
    /// Opaque secondary tree
    pub bookmarks: Vec<BookmarkNode>,
    pub captured_at: Timestamp,
}

impl Snapshot {
    pub fn new(captured_at: Timestamp) -> Self {
        Snapshot {
            captured_at,
            ..Snapshot::default()
        }
    }

    pub fn with_item(mut self, id: ItemId, location: impl Into<String>) -> Self {
        self.items.push(Item::loose(id, location));
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_bookmarks(mut self, bookmarks: Vec<BookmarkNode>) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    /// Iterate over loose and grouped items alike
    pub fn all_items(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.items.iter()))
    }

    /// Check the ownership invariant: loose items carry no group reference,
    /// grouped items reference their owning group, and no identifier is used
    /// twice.
    pub fn validate(&self) -> SyncResult<()> {
        let mut item_ids = HashSet::new();
        let mut group_ids = HashSet::new();

        for item in &self.items {
            if let Some(group) = item.group {
                return Err(SyncError::invalid(format!(
                    "loose item {} references group {}",
                    item.id, group
                )));
            }
            if !item_ids.insert(item.id) {
                return Err(SyncError::invalid(format!("duplicate item id {}", item.id)));
            }
        }

        for group in &self.groups {
            if !group_ids.insert(group.id) {
                return Err(SyncError::invalid(format!("duplicate group id {}", group.id)));
            }
            for item in &group.items {
                if item.group != Some(group.id) {
                    return Err(SyncError::invalid(format!(
                        "item {} listed in group {} but references {:?}",
                        item.id, group.id, item.group
                    )));
                }
                if !item_ids.insert(item.id) {
                    return Err(SyncError::invalid(format!("duplicate item id {}", item.id)));
                }
            }
        }

        Ok(())
    }

    /// Identifier-free canonical form.
    ///
    /// Two replicas holding the same resources arranged the same way have the
    /// same shape even when the live system assigned them different IDs.
    pub fn shape(&self) -> SnapshotShape {
        let mut loose: Vec<String> = self.items.iter().map(|i| i.location.clone()).collect();
        loose.sort();

        let mut groups: Vec<GroupShape> = self
            .groups
            .iter()
            .map(|g| {
                let mut locations: Vec<String> = g.items.iter().map(|i| i.location.clone()).collect();
                locations.sort();
                GroupShape {
                    title: g.title.clone(),
                    color: g.color,
                    locations,
                }
            })
            .collect();
        groups.sort();

        SnapshotShape { loose, groups }
    }
}

/// Canonical form of a snapshot, see [`Snapshot::shape`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotShape {
    pub loose: Vec<String>,
    pub groups: Vec<GroupShape>,
}

/// Canonical form of one group
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupShape {
    pub title: String,
    pub color: GroupColor,
    pub locations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let work = Group::new(GroupId::new(7), "work", GroupColor::Blue, WindowId::new(1))
            .with_item(ItemId::new(10), "https://docs.rs")
            .with_item(ItemId::new(11), "https://crates.io");
        Snapshot::new(Timestamp::from_millis(1000))
            .with_item(ItemId::new(1), "https://google.com")
            .with_group(work)
    }

    #[test]
    fn test_valid_snapshot_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_loose_item_with_group_rejected() {
        let mut snap = sample();
        snap.items[0].group = Some(GroupId::new(7));
        assert!(matches!(snap.validate(), Err(SyncError::InvalidArgument(_))));
    }

    #[test]
    fn test_item_in_two_places_rejected() {
        let snap = sample().with_item(ItemId::new(10), "https://docs.rs");
        assert!(matches!(snap.validate(), Err(SyncError::InvalidArgument(_))));
    }

    #[test]
    fn test_item_referencing_foreign_group_rejected() {
        let mut snap = sample();
        snap.groups[0].items[1].group = Some(GroupId::new(99));
        assert!(snap.validate().is_err());
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let dup = Group::new(GroupId::new(7), "again", GroupColor::Red, WindowId::new(1));
        assert!(sample().with_group(dup).validate().is_err());
    }

    #[test]
    fn test_color_parse_roundtrip() {
        for color in GroupColor::ALL {
            assert_eq!(color.as_str().parse::<GroupColor>().unwrap(), color);
        }
        assert!("magenta".parse::<GroupColor>().is_err());
    }

    #[test]
    fn test_shape_ignores_ids_and_order() {
        let a = sample();
        let regrouped = Group::new(GroupId::new(500), "work", GroupColor::Blue, WindowId::new(2))
            .with_item(ItemId::new(501), "https://crates.io")
            .with_item(ItemId::new(502), "https://docs.rs");
        let b = Snapshot::new(Timestamp::from_millis(2000))
            .with_group(regrouped)
            .with_item(ItemId::new(600), "https://google.com");
        assert_eq!(a.shape(), b.shape());
    }

    #[test]
    fn test_shape_sees_label_change() {
        let a = sample();
        let mut b = sample();
        b.groups[0].color = GroupColor::Red;
        assert_ne!(a.shape(), b.shape());
    }

    #[test]
    fn test_same_label_ignores_membership_and_window() {
        let work = &sample().groups[0];
        let moved = Group::new(GroupId::new(8), "work", GroupColor::Blue, WindowId::new(2));
        assert!(work.same_label(&moved));

        let renamed = Group::new(GroupId::new(7), "play", GroupColor::Blue, WindowId::new(1));
        let recolored = Group::new(GroupId::new(7), "work", GroupColor::Cyan, WindowId::new(1));
        assert!(!work.same_label(&renamed));
        assert!(!work.same_label(&recolored));
    }

    #[test]
    fn test_bookmark_count_skips_folders() {
        let tree = BookmarkNode::folder(
            "0",
            "",
            vec![BookmarkNode::folder(
                "1",
                "Bookmarks Bar",
                vec![
                    BookmarkNode::bookmark("2", "rust", "https://rust-lang.org"),
                    BookmarkNode::folder(
                        "3",
                        "reading",
                        vec![BookmarkNode::bookmark("4", "tokio", "https://tokio.rs")],
                    ),
                ],
            )],
        );
        assert_eq!(tree.bookmark_count(), 2);
    }

    #[test]
    fn test_all_items_covers_groups() {
        let ids: Vec<ItemId> = sample().all_items().map(|i| i.id).collect();
        assert_eq!(ids, vec![ItemId::new(1), ItemId::new(10), ItemId::new(11)]);
    }
}
