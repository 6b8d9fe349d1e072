//! Direct support relations between the items of one arrangement

use std::collections::{BTreeSet, VecDeque};

use crate::error::StaticsError;
use crate::geometry::{BoundingBox, ContactGeometry, GeometryError};
use crate::model::{Arrangement, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Open,
    Done,
}

/// Below-set and on-top-set of every item
#[derive(Debug, Clone, PartialEq)]
pub struct SupportGraph {
    below: Vec<BTreeSet<ItemId>>,
    on_top: Vec<BTreeSet<ItemId>>,
    on_floor: Vec<bool>,
}

impl SupportGraph {
    /// Derive the graph from pairwise resting-height tests
    ///
    /// `boxes` holds the bounding box of every item in placement order.
    pub fn build(
        arrangement: &Arrangement,
        boxes: &[BoundingBox],
        geometry: &dyn ContactGeometry,
    ) -> Result<Self, GeometryError> {
        let n = arrangement.len();
        let mut graph = Self {
            below: vec![BTreeSet::new(); n],
            on_top: vec![BTreeSet::new(); n],
            on_floor: arrangement.items().iter().map(|item| item.rests_on_floor()).collect(),
        };

        for i in 0..n {
            let this = arrangement.item(ItemId(i));
            let this_top = this.max_y(&boxes[i]);

            for j in (i + 1)..n {
                let other = arrangement.item(ItemId(j));
                let other_top = other.max_y(&boxes[j]);

                let min_y_other = geometry.min_resting_y(
                    &other.shape,
                    other.position.x,
                    other.position.z,
                    &this.shape,
                    this.position.x,
                    this.position.z,
                    this.position.y,
                    this_top,
                )?;

                // footprints don't overlap
                if min_y_other == 0 {
                    continue;
                }

                if min_y_other == other.position.y {
                    graph.link(ItemId(j), ItemId(i));
                    continue;
                }

                let min_y_this = geometry.min_resting_y(
                    &this.shape,
                    this.position.x,
                    this.position.z,
                    &other.shape,
                    other.position.x,
                    other.position.z,
                    other.position.y,
                    other_top,
                )?;

                if min_y_this == this.position.y {
                    graph.link(ItemId(i), ItemId(j));
                }
            }
        }

        log::trace!(
            "Support graph: {} items, {} support edges",
            n,
            graph.below.iter().map(BTreeSet::len).sum::<usize>()
        );

        Ok(graph)
    }

    fn link(&mut self, upper: ItemId, lower: ItemId) {
        self.below[upper.index()].insert(lower);
        self.on_top[lower.index()].insert(upper);
    }

    pub fn len(&self) -> usize {
        self.below.len()
    }

    pub fn is_empty(&self) -> bool {
        self.below.is_empty()
    }

    /// Items directly supporting `id`
    pub fn items_below(&self, id: ItemId) -> &BTreeSet<ItemId> {
        &self.below[id.index()]
    }

    /// Items resting directly on `id`
    pub fn items_on_top(&self, id: ItemId) -> &BTreeSet<ItemId> {
        &self.on_top[id.index()]
    }

    /// Standing on the floor with nothing underneath
    pub fn is_bottom(&self, id: ItemId) -> bool {
        self.below[id.index()].is_empty() && self.on_floor[id.index()]
    }

    /// Every item resting on `root`, directly or transitively, followed by
    /// `root` itself. Each item appears after everything resting on it.
    pub fn upward_closure_order(&self, root: ItemId) -> Result<Vec<ItemId>, StaticsError> {
        let mut visits = vec![Visit::New; self.len()];
        let mut order = Vec::new();
        let mut stack = vec![(root, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                visits[id.index()] = Visit::Done;
                order.push(id);
                continue;
            }

            match visits[id.index()] {
                Visit::Done => continue,
                Visit::Open => return Err(StaticsError::InternalConsistency { item: id }),
                Visit::New => {}
            }

            visits[id.index()] = Visit::Open;
            stack.push((id, true));

            for &top in self.on_top[id.index()].iter().rev() {
                match visits[top.index()] {
                    Visit::New => stack.push((top, false)),
                    Visit::Open => return Err(StaticsError::InternalConsistency { item: top }),
                    Visit::Done => {}
                }
            }
        }

        Ok(order)
    }

    /// All items, each one after everything resting on it
    pub fn topological_order(&self) -> Result<Vec<ItemId>, StaticsError> {
        let n = self.len();
        let mut pending: Vec<usize> = self.on_top.iter().map(BTreeSet::len).collect();
        let mut ready: VecDeque<ItemId> = (0..n).filter(|&i| pending[i] == 0).map(ItemId).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(id) = ready.pop_front() {
            order.push(id);
            for &lower in &self.below[id.index()] {
                pending[lower.index()] -= 1;
                if pending[lower.index()] == 0 {
                    ready.push_back(lower);
                }
            }
        }

        if order.len() < n {
            let stuck = (0..n).find(|&i| pending[i] > 0).unwrap_or(0);
            return Err(StaticsError::InternalConsistency { item: ItemId(stuck) });
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CuboidGeometry, Position, Shape};
    use crate::model::PlacedItem;
    use crate::types::*;

    fn boxed(label: &str, x: i32, y: i32, z: i32, size: (i32, i32, i32), sequence: usize) -> PlacedItem {
        PlacedItem::new(
            label,
            Shape::cuboid(size.0, size.1, size.2),
            Position::new(x, y, z),
            Weight::new::<kilogram>(10.0),
            sequence,
        )
    }

    fn graph_of(items: Vec<PlacedItem>) -> (Arrangement, SupportGraph) {
        let geometry = CuboidGeometry::new();
        let arrangement = Arrangement::new(items).unwrap();
        let boxes: Vec<_> = arrangement
            .items()
            .iter()
            .map(|item| geometry.bounding_box(&item.shape).unwrap())
            .collect();
        let graph = SupportGraph::build(&arrangement, &boxes, &geometry).unwrap();
        (arrangement, graph)
    }

    #[test]
    fn test_stack_relations() {
        // a bridge lying across two floor boxes, a small box on the bridge
        let (_, graph) = graph_of(vec![
            boxed("left", 0, 0, 0, (50, 40, 50), 0),
            boxed("right", 100, 0, 0, (50, 40, 50), 1),
            boxed("bridge", 0, 40, 0, (150, 10, 50), 2),
            boxed("top", 60, 50, 10, (20, 20, 20), 3),
        ]);

        assert!(graph.is_bottom(ItemId(0)));
        assert!(graph.is_bottom(ItemId(1)));
        assert_eq!(
            graph.items_below(ItemId(2)).iter().copied().collect::<Vec<_>>(),
            vec![ItemId(0), ItemId(1)]
        );
        assert_eq!(
            graph.items_on_top(ItemId(2)).iter().copied().collect::<Vec<_>>(),
            vec![ItemId(3)]
        );
        assert!(graph.items_on_top(ItemId(3)).is_empty());
    }

    #[test]
    fn test_floating_item_is_not_bottom() {
        let (_, graph) = graph_of(vec![
            boxed("floor", 0, 0, 0, (50, 40, 50), 0),
            boxed("floating", 0, 60, 0, (50, 40, 50), 1),
        ]);

        assert!(graph.items_below(ItemId(1)).is_empty());
        assert!(!graph.is_bottom(ItemId(1)));
    }

    #[test]
    fn test_closure_order_dependencies_first() {
        let (_, graph) = graph_of(vec![
            boxed("base", 0, 0, 0, (100, 10, 100), 0),
            boxed("mid", 0, 10, 0, (100, 10, 100), 1),
            boxed("high", 0, 20, 0, (100, 10, 100), 2),
        ]);

        assert_eq!(
            graph.upward_closure_order(ItemId(0)).unwrap(),
            vec![ItemId(2), ItemId(1), ItemId(0)]
        );
        assert_eq!(graph.upward_closure_order(ItemId(2)).unwrap(), vec![ItemId(2)]);
    }

    #[test]
    fn test_topological_order() {
        let (_, graph) = graph_of(vec![
            boxed("left", 0, 0, 0, (50, 40, 50), 0),
            boxed("right", 100, 0, 0, (50, 40, 50), 1),
            boxed("bridge", 0, 40, 0, (150, 10, 50), 2),
        ]);

        let order = graph.topological_order().unwrap();
        let position = |id: ItemId| order.iter().position(|&o| o == id).unwrap();

        assert_eq!(order.len(), 3);
        assert!(position(ItemId(2)) < position(ItemId(0)));
        assert!(position(ItemId(2)) < position(ItemId(1)));
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut graph = SupportGraph {
            below: vec![BTreeSet::new(); 2],
            on_top: vec![BTreeSet::new(); 2],
            on_floor: vec![false; 2],
        };
        graph.link(ItemId(0), ItemId(1));
        graph.link(ItemId(1), ItemId(0));

        assert!(matches!(
            graph.upward_closure_order(ItemId(0)),
            Err(StaticsError::InternalConsistency { .. })
        ));
        assert!(graph.topological_order().is_err());
    }
}
