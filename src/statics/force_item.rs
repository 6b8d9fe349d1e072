use std::collections::BTreeMap;

use crate::error::StaticsError;
use crate::model::ItemId;
use crate::statics::calculation::{self, CalculationContext};
use crate::statics::force::{ContactPoint, ForceMap, PointForce};

/// Force-bearing twin of a placed item
///
/// Every sequence-indexed map covers the sequences from the item's own
/// placement up to the horizon in effect when the item was built.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceItem {
    id: ItemId,
    gravitation: PointForce,
    reaction_points: Vec<ContactPoint>,
    action_forces: BTreeMap<usize, ForceMap>,
    resultants: BTreeMap<usize, PointForce>,
    reaction_forces: BTreeMap<usize, ForceMap>,
    stability: BTreeMap<usize, bool>,
}

impl ForceItem {
    pub(crate) fn new(id: ItemId, gravitation: PointForce, reaction_points: Vec<ContactPoint>) -> Self {
        Self {
            id,
            gravitation,
            reaction_points,
            action_forces: BTreeMap::new(),
            resultants: BTreeMap::new(),
            reaction_forces: BTreeMap::new(),
            stability: BTreeMap::new(),
        }
    }

    pub(crate) fn record(
        &mut self,
        sequence: usize,
        action_forces: ForceMap,
        resultant: PointForce,
        reaction_forces: Option<ForceMap>,
        stable: bool,
    ) {
        self.action_forces.insert(sequence, action_forces);
        self.resultants.insert(sequence, resultant);
        if let Some(reactions) = reaction_forces {
            self.reaction_forces.insert(sequence, reactions);
        }
        self.stability.insert(sequence, stable);
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn gravitation(&self) -> &PointForce {
        &self.gravitation
    }

    pub fn reaction_points(&self) -> &[ContactPoint] {
        &self.reaction_points
    }

    /// Forces received from items on top, grouped by contributor
    pub fn action_forces(&self, sequence: usize) -> Option<&ForceMap> {
        self.action_forces.get(&sequence)
    }

    pub fn resultant(&self, sequence: usize) -> Option<&PointForce> {
        self.resultants.get(&sequence)
    }

    /// Accepted load distribution, grouped by supporting item; absent when
    /// the item is unstable at `sequence`
    pub fn reaction_forces(&self, sequence: usize) -> Option<&ForceMap> {
        self.reaction_forces.get(&sequence)
    }

    /// `None` before placement or beyond the computed horizon
    pub fn stability(&self, sequence: usize) -> Option<bool> {
        self.stability.get(&sequence).copied()
    }

    /// One entry per sequence `0..sequence_count`
    pub fn stability_vector(&self, sequence_count: usize) -> Vec<Option<bool>> {
        (0..sequence_count).map(|s| self.stability(s)).collect()
    }

    /// Sequences with a computed stability flag
    pub fn sequences(&self) -> impl Iterator<Item = usize> + '_ {
        self.stability.keys().copied()
    }
}

/// Memoized force items of one assessment run
#[derive(Debug, Clone)]
pub struct ForceItemStore {
    items: Vec<Option<ForceItem>>,
    max_sequence: usize,
}

impl ForceItemStore {
    pub fn new(item_count: usize) -> Self {
        Self {
            items: (0..item_count).map(|_| None).collect(),
            max_sequence: item_count,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Exclusive upper bound of the sequences computed for new items
    pub fn max_sequence(&self) -> usize {
        self.max_sequence
    }

    pub fn set_max_sequence(&mut self, max_sequence: usize) {
        self.max_sequence = max_sequence.min(self.items.len());
    }

    pub fn contains(&self, id: ItemId) -> bool {
        matches!(self.items.get(id.index()), Some(Some(_)))
    }

    pub fn force_item(&self, id: ItemId) -> Option<&ForceItem> {
        self.items.get(id.index()).and_then(Option::as_ref)
    }

    /// A force item another calculation depends on; it must be built already
    pub fn dependency(&self, id: ItemId) -> Result<&ForceItem, StaticsError> {
        self.force_item(id)
            .ok_or(StaticsError::InternalConsistency { item: id })
    }

    /// Build `id` and everything resting on it, dependencies first
    pub fn get_or_create(
        &mut self,
        ctx: &CalculationContext<'_>,
        id: ItemId,
    ) -> Result<&ForceItem, StaticsError> {
        if !self.contains(id) {
            for next in ctx.graph.upward_closure_order(id)? {
                self.create(ctx, next)?;
            }
        }
        self.dependency(id)
    }

    /// Build every item in one pass over the topological order
    pub fn build_all(&mut self, ctx: &CalculationContext<'_>) -> Result<(), StaticsError> {
        for id in ctx.graph.topological_order()? {
            self.create(ctx, id)?;
        }
        Ok(())
    }

    fn create(&mut self, ctx: &CalculationContext<'_>, id: ItemId) -> Result<(), StaticsError> {
        if self.contains(id) {
            return Ok(());
        }
        let item = calculation::create_force_item(ctx, self, id)?;
        self.items[id.index()] = Some(item);
        Ok(())
    }
}
