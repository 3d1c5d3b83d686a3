//! Snapshot generator - seeded random workspaces and edits
//!
//! Produces snapshots that always pass `Snapshot::validate`, plus edited
//! copies that keep the identifiers of whatever they retain. Generated
//! identifiers stay below `BrowserConfig::default().id_base`, so they never
//! collide with identifiers a simulated browser hands out.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tabsync_core::{BookmarkNode, Group, GroupColor, GroupId, Item, ItemId, Snapshot, Timestamp, WindowId};

const HOSTS: [&str; 8] = [
    "docs.rs", "crates.io", "lwn.net", "github.com", "rust-lang.org", "news.ycombinator.com",
    "wikipedia.org", "example.com",
];

const TITLES: [&str; 6] = ["work", "news", "reading", "music", "travel", "research"];

/// Generator configuration
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Loose items per snapshot (upper bound, inclusive)
    pub max_loose: usize,
    /// Groups per snapshot (upper bound, inclusive)
    pub max_groups: usize,
    /// Members per group (at least one)
    pub max_members: usize,
    /// Bookmarks in the secondary tree
    pub bookmarks: usize,
    /// Probability that an element is touched by `mutate`
    pub edit_prob: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            max_loose: 8,
            max_groups: 4,
            max_members: 5,
            bookmarks: 3,
            edit_prob: 0.3,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    pub fn small() -> Self {
        GeneratorConfig {
            max_loose: 3,
            max_groups: 2,
            max_members: 2,
            bookmarks: 1,
            edit_prob: 0.5,
            seed: 42,
        }
    }

    /// Large workspaces for benchmarks
    pub fn large() -> Self {
        GeneratorConfig {
            max_loose: 400,
            max_groups: 60,
            max_members: 20,
            bookmarks: 50,
            edit_prob: 0.1,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

pub struct SnapshotGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    next_id: u64,
}

impl SnapshotGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        SnapshotGenerator {
            config,
            rng,
            next_id: 0,
        }
    }

    /// A fresh random workspace
    pub fn generate(&mut self, captured_at: Timestamp) -> Snapshot {
        let mut snapshot = Snapshot::new(captured_at);

        let loose = self.rng.gen_range(0..=self.config.max_loose);
        for _ in 0..loose {
            let item = self.loose_item();
            snapshot.items.push(item);
        }

        let groups = self.rng.gen_range(0..=self.config.max_groups);
        for _ in 0..groups {
            let group = self.group();
            snapshot.groups.push(group);
        }

        let bookmarks = (0..self.config.bookmarks)
            .map(|i| {
                let location = self.location();
                BookmarkNode::bookmark(format!("b{}", i), format!("bookmark {}", i), location)
            })
            .collect();
        snapshot.with_bookmarks(vec![BookmarkNode::folder("root", "Bookmarks", bookmarks)])
    }

    /// An edited copy of `base`. Retained items and groups keep their
    /// identifiers; added ones get fresh identifiers. Groups never end up
    /// empty.
    pub fn mutate(&mut self, base: &Snapshot, captured_at: Timestamp) -> Snapshot {
        let mut next = Snapshot::new(captured_at).with_bookmarks(base.bookmarks.clone());
        let p = self.config.edit_prob;

        for item in &base.items {
            if !self.rng.gen_bool(p) {
                next.items.push(item.clone());
            }
        }
        if self.rng.gen_bool(p) {
            let item = self.loose_item();
            next.items.push(item);
        }

        for group in &base.groups {
            if self.rng.gen_bool(p / 2.0) {
                continue;
            }
            let mut edited = group.clone();
            if self.rng.gen_bool(p) {
                edited.title = format!("{} v{}", group.title, self.rng.gen_range(2..10));
            }
            if self.rng.gen_bool(p) {
                edited.color = self.color();
            }
            if edited.items.len() > 1 && self.rng.gen_bool(p) {
                let at = self.rng.gen_range(0..edited.items.len());
                edited.items.remove(at);
            }
            if self.rng.gen_bool(p) {
                let id = self.fresh_id();
                let location = self.location();
                edited.items.push(Item::grouped(ItemId::new(id), location, edited.id));
            }
            next.groups.push(edited);
        }
        if self.rng.gen_bool(p) {
            let group = self.group();
            next.groups.push(group);
        }

        next
    }

    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn location(&mut self) -> String {
        let host = HOSTS[self.rng.gen_range(0..HOSTS.len())];
        format!("https://{}/{}", host, self.rng.gen_range(0..1000))
    }

    fn color(&mut self) -> GroupColor {
        GroupColor::ALL[self.rng.gen_range(0..GroupColor::ALL.len())]
    }

    fn loose_item(&mut self) -> Item {
        let id = self.fresh_id();
        let location = self.location();
        Item::loose(ItemId::new(id), location)
    }

    fn group(&mut self) -> Group {
        let id = GroupId::new(self.fresh_id());
        let title = TITLES[self.rng.gen_range(0..TITLES.len())];
        let color = self.color();
        let mut group = Group::new(id, title, color, WindowId::new(1));

        let members = self.rng.gen_range(1..=self.config.max_members.max(1));
        for _ in 0..members {
            let item_id = ItemId::new(self.fresh_id());
            let location = self.location();
            group = group.with_item(item_id, location);
        }
        group
    }
}
