use crate::core::BodyHandle;
use std::collections::BTreeMap;

/// Groups bodies connected through contacts or constraints.
///
/// Union-find over body handles; islands are reported in handle order so the
/// result does not depend on the order links were added.
#[derive(Debug, Default)]
pub struct IslandBuilder {
    /// Parent of each body in the union-find forest
    parent: BTreeMap<BodyHandle, BodyHandle>,

    /// Upper bound on each root's tree height
    rank: BTreeMap<BodyHandle, u32>,
}

impl IslandBuilder {
    /// Creates a new empty island builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a body as its own island
    pub fn add_body(&mut self, body: BodyHandle) {
        self.parent.entry(body).or_insert(body);
        self.rank.entry(body).or_insert(0);
    }

    /// Returns true if the body was added
    pub fn contains(&self, body: BodyHandle) -> bool {
        self.parent.contains_key(&body)
    }

    /// Finds the root of a body's island, compressing the path on the way
    pub fn find(&mut self, body: BodyHandle) -> Option<BodyHandle> {
        let mut root = *self.parent.get(&body)?;
        while let Some(&next) = self.parent.get(&root) {
            if next == root {
                break;
            }
            root = next;
        }

        let mut current = body;
        while current != root {
            let next = self.parent.get(&current).copied().unwrap_or(root);
            self.parent.insert(current, root);
            current = next;
        }

        Some(root)
    }

    /// Joins the islands of two bodies; ignored unless both were added
    pub fn add_connection(&mut self, a: BodyHandle, b: BodyHandle) {
        let (Some(root_a), Some(root_b)) = (self.find(a), self.find(b)) else {
            return;
        };
        if root_a == root_b {
            return;
        }

        let rank_a = self.rank.get(&root_a).copied().unwrap_or(0);
        let rank_b = self.rank.get(&root_b).copied().unwrap_or(0);
        if rank_a < rank_b {
            self.parent.insert(root_a, root_b);
        } else {
            self.parent.insert(root_b, root_a);
            if rank_a == rank_b {
                self.rank.insert(root_a, rank_a + 1);
            }
        }
    }

    /// Builds the islands, each sorted by handle and ordered by its first member
    pub fn build(mut self) -> Vec<Vec<BodyHandle>> {
        let bodies: Vec<BodyHandle> = self.parent.keys().copied().collect();
        let mut by_root: BTreeMap<BodyHandle, Vec<BodyHandle>> = BTreeMap::new();

        for body in bodies {
            if let Some(root) = self.find(body) {
                by_root.entry(root).or_default().push(body);
            }
        }

        let mut islands: Vec<Vec<BodyHandle>> = by_root.into_values().collect();
        islands.sort_by_key(|island| island.first().copied());
        islands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Storage;

    fn handles(n: usize) -> Vec<BodyHandle> {
        let mut storage: Storage<(), BodyHandle> = Storage::new();
        (0..n).map(|_| storage.add(())).collect()
    }

    #[test]
    fn connected_bodies_share_an_island() {
        let h = handles(5);
        let mut builder = IslandBuilder::new();
        for &body in &h {
            builder.add_body(body);
        }
        builder.add_connection(h[0], h[3]);
        builder.add_connection(h[3], h[1]);

        let islands = builder.build();
        assert_eq!(islands.len(), 3);
        assert_eq!(islands[0], vec![h[0], h[1], h[3]]);
        assert_eq!(islands[1], vec![h[2]]);
        assert_eq!(islands[2], vec![h[4]]);
    }

    #[test]
    fn links_to_unknown_bodies_are_ignored() {
        let h = handles(3);
        let mut builder = IslandBuilder::new();
        builder.add_body(h[0]);
        builder.add_body(h[1]);
        builder.add_connection(h[0], h[2]);

        assert_eq!(builder.build().len(), 2);
    }
}
