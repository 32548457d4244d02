// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Broad-phase queries over a small moving scene with `understory_quadtree`.
//!
//! This example shows how to:
//! - tag items with type masks and filter queries by them,
//! - move items every frame and let the tree re-file only those that left their leaf,
//! - grow the world when an item wanders out of it.
//!
//! Run:
//! - `RUST_LOG=understory_quadtree=debug cargo run -p understory_demos --example quadtree_basics`

use kurbo::{Circle, Point, Rect, Size, Vec2};
use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_quadtree::{Item, Quadtree, QuadtreeConfig, QuadtreeError, TypeMask};

const SHIP: TypeMask = TypeMask::from_bits_retain(1 << 0);
const ROCK: TypeMask = TypeMask::from_bits_retain(1 << 1);
const HOSTILE: TypeMask = TypeMask::from_bits_retain(1 << 2);

fn main() -> Result<(), QuadtreeError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = QuadtreeConfig::new()
        .with_max_depth(6)
        .with_max_items_per_node(4);
    let mut tree = Quadtree::with_config(Rect::new(0.0, 0.0, 512.0, 512.0), config)?;

    // A ring of rocks, some of them hostile, and one ship in the middle.
    let mut rocks = Vec::new();
    for i in 0..24_u32 {
        let angle = f64::from(i) * std::f64::consts::TAU / 24.0;
        let at = Point::new(256.0, 256.0) + Vec2::from_angle(angle) * 180.0;
        let mask = if i % 3 == 0 { ROCK | HOSTILE } else { ROCK };
        let rock = Item::centered(100 + i, at, Size::new(12.0, 12.0), mask);
        tree.add_item(rock)?;
        rocks.push(rock);
    }
    let mut ship = Item::centered(1, Point::new(256.0, 256.0), Size::new(8.0, 8.0), SHIP);
    tree.add_item(ship)?;
    info!(%tree, nodes = tree.node_count(), "scene built");

    // Fly the ship toward the ring and report what its sensor circle sees.
    let velocity = Vec2::new(24.0, 5.0);
    for frame in 0..12 {
        ship = ship.moved_to(ship.location + velocity);
        match tree.move_item(ship) {
            Ok(()) => {}
            Err(QuadtreeError::OutOfBounds { .. }) => {
                tree.grow();
                info!(world = ?tree.world(), "grew the world to keep the ship inside");
                tree.move_item(ship)?;
            }
            Err(err) => return Err(err),
        }

        let sensor = Circle::new(ship.location, 40.0);
        let rocks_near = tree.query(&sensor, ROCK);
        let hostile_near = tree.query(&sensor, ROCK | HOSTILE);
        info!(
            frame,
            x = ship.location.x,
            y = ship.location.y,
            rocks = rocks_near.len(),
            hostile = hostile_near.len(),
            "sensor sweep"
        );
    }

    // Clear a corridor: remove every rock overlapping a horizontal band.
    let corridor = Rect::new(0.0, 240.0, tree.world().x1, 280.0);
    let in_corridor = tree.query(&corridor, ROCK);
    let mut cleared = 0;
    for rock in rocks.iter().filter(|r| in_corridor.contains(&r.id)) {
        if tree.remove_item(&rock.id) {
            cleared += 1;
        }
    }
    info!(cleared, remaining = tree.len(), "corridor cleared");

    let root = tree.root();
    if let Some(children) = root.children() {
        for child in children {
            info!(
                region = ?child.region(),
                items = child.subtree_item_count(),
                "top-level quadrant"
            );
        }
    }
    Ok(())
}
