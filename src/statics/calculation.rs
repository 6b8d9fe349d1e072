//! Per-item force pipeline
//!
//! For every sequence an item is present in:
//!
//! 1. gravitation at the floor projection of the center of mass
//! 2. action forces handed down by the items resting on it
//! 3. the resultant of both
//! 4. distribution of the resultant over the contact points below
//!
//! An item is stable at a sequence when a non-negative distribution exists.

use std::iter;

use nalgebra as na;

use crate::config::StaticsConfig;
use crate::error::StaticsError;
use crate::geometry::{BoundingBox, ContactGeometry, GeometryError};
use crate::model::{Arrangement, ItemId, PlacedItem};
use crate::statics::force::{self, ContactPoint, ForceMap, PointForce};
use crate::statics::force_item::{ForceItem, ForceItemStore};
use crate::statics::linear_system::{LinearEquationSystem, LinearSystemError, Solubility};
use crate::statics::support_graph::SupportGraph;
use crate::types::*;

/// Read-only inputs shared by all calculations of one arrangement
#[derive(Clone, Copy)]
pub struct CalculationContext<'a> {
    pub arrangement: &'a Arrangement,
    pub boxes: &'a [BoundingBox],
    pub graph: &'a SupportGraph,
    pub geometry: &'a dyn ContactGeometry,
    pub config: &'a StaticsConfig,
}

pub fn gravitation(item: &PlacedItem, bbox: &BoundingBox, config: &StaticsConfig) -> PointForce {
    let center_of_mass = item.absolute_center_of_mass(bbox);
    PointForce::from_weight(
        item.weight,
        floor_projection(&center_of_mass),
        config.gravity,
        config.force_decimals,
    )
}

/// Loads the items resting on `id` transmit to it at `sequence`
///
/// Items placed after `sequence` don't contribute. An item on top without an
/// accepted distribution at `sequence` contributes nothing either.
pub fn action_forces(
    ctx: &CalculationContext<'_>,
    store: &ForceItemStore,
    id: ItemId,
    sequence: usize,
) -> Result<ForceMap, StaticsError> {
    let mut forces = ForceMap::new();

    for &top in ctx.graph.items_on_top(id) {
        if top.index() > sequence {
            continue;
        }

        let above = store.dependency(top)?;
        if let Some(share) = above.reaction_forces(sequence).and_then(|reactions| reactions.get(&id)) {
            forces.insert(top, share.clone());
        }
    }

    Ok(forces)
}

pub fn resultant(gravitation: &PointForce, action_forces: &ForceMap, decimals: u32) -> PointForce {
    let forces = iter::once(gravitation).chain(action_forces.values().flatten());
    // never empty: gravitation is always part of it
    force::compose(forces, decimals).unwrap_or(*gravitation)
}

/// Contact polygon corners towards every supporting item
pub fn reaction_points(ctx: &CalculationContext<'_>, id: ItemId) -> Result<Vec<ContactPoint>, GeometryError> {
    let upper = ctx.arrangement.item(id);
    let mut points = Vec::new();

    for &support in ctx.graph.items_below(id) {
        let lower = ctx.arrangement.item(support);
        let corners = ctx
            .geometry
            .contact_points(&upper.shape, upper.position, &lower.shape, lower.position)?;
        points.extend(corners.into_iter().map(|point| ContactPoint::new(point, support)));
    }

    Ok(points)
}

/// Moment balance around every contact point, on x and z
///
/// Row pair `i` reads `Σj (pi - pj) fj = (pi - r) R` where `r` and `R` are the
/// resultant point and magnitude.
pub fn build_system(
    points: &[ContactPoint],
    resultant: &PointForce,
    config: &StaticsConfig,
) -> Result<LinearEquationSystem, LinearSystemError> {
    let k = points.len();

    let lhs = na::DMatrix::from_fn(2 * k, k, |row, column| {
        let (pi, pj) = (&points[row / 2].point, &points[column].point);
        if row % 2 == 0 { pi.x - pj.x } else { pi.y - pj.y }
    });

    let rhs = na::DVector::from_fn(2 * k, |row, _| {
        let p = &points[row / 2].point;
        let arm = if row % 2 == 0 {
            p.x - resultant.point.x
        } else {
            p.y - resultant.point.y
        };
        round_to(arm * resultant.magnitude, config.force_decimals)
    });

    LinearEquationSystem::new(lhs, rhs, config.solver_tolerances())
}

/// Distribute the resultant over the contact points
///
/// Returns `None` when no non-negative distribution exists.
pub fn reaction_forces(
    points: &[ContactPoint],
    resultant: &PointForce,
    config: &StaticsConfig,
) -> Result<Option<ForceMap>, StaticsError> {
    if points.is_empty() {
        return Ok(None);
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| {
        resultant
            .distance_to(&a.point)
            .total_cmp(&resultant.distance_to(&b.point))
    });

    let mut system = build_system(&sorted, resultant, config)?;

    match system.solve() {
        Solubility::UniqueSolution => {
            let Some(solution) = system.solution() else {
                return Ok(None);
            };
            if !carries_load(solution.as_slice(), resultant, config) {
                return Ok(None);
            }
            Ok(Some(group(sorted.iter().zip(solution.iter().copied()))))
        }
        Solubility::InfiniteSolutions => {
            if config.equal_share_when_centered {
                if let Some(forces) = equal_share(&sorted, resultant, config) {
                    return Ok(Some(forces));
                }
            }
            search_triples(&sorted, &system, resultant, config)
        }
        Solubility::NoSolution => Ok(None),
    }
}

/// Non-negative magnitudes that add up to the resultant
fn carries_load(solution: &[f64], resultant: &PointForce, config: &StaticsConfig) -> bool {
    if solution.iter().any(|&magnitude| magnitude < 0.0) {
        return false;
    }
    let total: f64 = solution.iter().sum();
    if (total - resultant.magnitude).abs() > config.conservation_tolerance {
        log::debug!("Rejected distribution of {} N against {} N", total, resultant.magnitude);
        return false;
    }
    true
}

/// Quadrant of a point around the resultant
fn quadrant(point: &na::Point2<f64>, center: &na::Point2<f64>) -> u8 {
    let mut quadrant = 0;
    if point.x >= center.x {
        quadrant += 2;
    }
    if point.y >= center.y {
        quadrant += 1;
    }
    quadrant
}

/// Split the load equally when the resultant sits on the centroid of the
/// contact points; every moment row then balances exactly
fn equal_share(points: &[ContactPoint], resultant: &PointForce, config: &StaticsConfig) -> Option<ForceMap> {
    let k = points.len() as f64;
    let centroid = points
        .iter()
        .fold(na::Vector2::zeros(), |acc, p| acc + p.point.coords)
        / k;

    let tolerance = 0.5 * 10f64.powi(-(config.force_decimals as i32));
    if (centroid - resultant.point.coords).amax() > tolerance {
        return None;
    }

    let factor = config.elimination_rounding_factor;
    let share = (resultant.magnitude / k * factor).round() / factor;
    Some(group(points.iter().zip(iter::repeat(share))))
}

/// Try triples of contact points from three distinct quadrants until one
/// carries the load on its own
fn search_triples(
    points: &[ContactPoint],
    system: &LinearEquationSystem,
    resultant: &PointForce,
    config: &StaticsConfig,
) -> Result<Option<ForceMap>, StaticsError> {
    // every triple would be underdetermined
    if system.rank_coefficients() < 3 {
        return Ok(None);
    }

    let quadrants: Vec<u8> = points
        .iter()
        .map(|p| quadrant(&p.point, &resultant.point))
        .collect();

    let mut candidates = 0;
    for i in 2..points.len() {
        for c1 in 0..i {
            if quadrants[c1] == quadrants[i] {
                continue;
            }
            for c2 in (c1 + 1)..i {
                if quadrants[c2] == quadrants[i] || quadrants[c2] == quadrants[c1] {
                    continue;
                }

                if candidates == config.max_triple_candidates {
                    log::debug!("Triple search stopped after {} candidates", candidates);
                    return Ok(None);
                }
                candidates += 1;

                let columns = [c1, c2, i];
                let mut subsystem = system.subsystem(&columns)?;
                if subsystem.solve() != Solubility::UniqueSolution {
                    continue;
                }
                let Some(solution) = subsystem.solution() else {
                    continue;
                };
                if !carries_load(solution.as_slice(), resultant, config) {
                    continue;
                }

                log::debug!("Triple {:?} accepted after {} candidates", columns, candidates);
                let chosen = columns.iter().map(|&c| &points[c]);
                return Ok(Some(group(chosen.zip(solution.iter().copied()))));
            }
        }
    }

    Ok(None)
}

fn group<'a>(forces: impl IntoIterator<Item = (&'a ContactPoint, f64)>) -> ForceMap {
    let mut grouped = ForceMap::new();
    for (contact, magnitude) in forces {
        grouped
            .entry(contact.support)
            .or_default()
            .push(PointForce::new(contact.point, magnitude));
    }
    grouped
}

/// Compute the force item of `id` for every sequence up to the store's horizon
///
/// Everything resting on `id` must be in the store already. Bottom items skip
/// the distribution and count as stable.
pub fn create_force_item(
    ctx: &CalculationContext<'_>,
    store: &ForceItemStore,
    id: ItemId,
) -> Result<ForceItem, StaticsError> {
    let item = ctx.arrangement.item(id);
    let gravitation = gravitation(item, &ctx.boxes[id.index()], ctx.config);
    let bottom = ctx.graph.is_bottom(id);

    let points = if bottom { Vec::new() } else { reaction_points(ctx, id)? };
    let mut force_item = ForceItem::new(id, gravitation, points);

    for sequence in id.index()..store.max_sequence() {
        let actions = action_forces(ctx, store, id, sequence)?;
        let resultant = resultant(&gravitation, &actions, ctx.config.force_decimals);

        if bottom {
            force_item.record(sequence, actions, resultant, None, true);
            continue;
        }

        let placed: Vec<ContactPoint> = force_item
            .reaction_points()
            .iter()
            .filter(|p| p.support.index() <= sequence)
            .copied()
            .collect();

        let reactions = reaction_forces(&placed, &resultant, ctx.config)?;
        let stable = reactions.is_some();
        force_item.record(sequence, actions, resultant, reactions, stable);
    }

    log::debug!(
        "Item {} ({:?}, {}): stability {:?}",
        item.label,
        id,
        DisplayForce(gravitation.as_load_force()),
        force_item.stability_vector(store.max_sequence())
    );

    Ok(force_item)
}
