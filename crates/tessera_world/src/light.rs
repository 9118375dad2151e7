//! # Light Engine
//!
//! Recomputes light around one changed cell.
//!
//! Light is a small cellular automaton: a transparent cell's level is the
//! brightest of its six neighbours minus one. Rather than re-running that
//! rule over the whole window, a reflow works in three stages:
//!
//! 1. **Flood fill** - radius-bounded BFS from the change finds the cells
//!    whose light might differ. Each is marked visited and recorded in the
//!    working queue.
//! 2. **Reset** - every recorded cell goes back to dark.
//! 3. **Relaxation** - the working queue is replayed until a full pass raises
//!    no cell. Levels only go up and are capped by the sources, so this
//!    terminates.
//!
//! Cells on the outermost layer of the window are never touched; a
//! neighbouring window can still reflow light across them.
//!
//! ## Queue Sizing
//!
//! The frontier queue is sized for `9 × (2r + 3)³` nodes where `r` is the
//! configured maximum radius. Overflow is a panic.

use serde::{Deserialize, Serialize};
use tessera_core::RingQueue;

use crate::cell::MAX_LIGHT;
use crate::coord::CellPos;
use crate::error::{WorldError, WorldResult};
use crate::events::WorldObserver;
use crate::query::QueryContext;

/// Light value marking a cell as visited during the flood fill.
pub const LIGHT_VISITED: u8 = 255;

/// Light emitted by an opaque cell of the given type.
///
/// Lamps (41), torches (35) and light blocks (40). Everything else opaque
/// is dark.
#[inline]
#[must_use]
pub const fn emission(ty: u16) -> u8 {
    match ty {
        41 => 8,
        35 => 12,
        40 => 15,
        _ => 0,
    }
}

/// Light engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Largest propagation radius a reflow will start with, at most
    /// [`MAX_LIGHT`].
    pub max_radius: u8,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self { max_radius: MAX_LIGHT }
    }
}

impl LightConfig {
    /// Checks that the radius does not exceed the light range.
    ///
    /// # Errors
    ///
    /// Returns error if `max_radius > MAX_LIGHT`.
    pub fn validate(&self) -> WorldResult<()> {
        if self.max_radius > MAX_LIGHT {
            return Err(WorldError::InvalidConfig(format!(
                "light max_radius {} exceeds {MAX_LIGHT}",
                self.max_radius
            )));
        }
        Ok(())
    }

    /// Queue slots needed for the configured radius.
    #[must_use]
    pub fn queue_capacity(&self) -> usize {
        let edge = 2 * usize::from(self.max_radius) + 3;
        9 * edge * edge * edge
    }
}

/// One queued cell: window-relative position and a light level or radius.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightNode {
    /// Relative x.
    pub x: i16,
    /// Relative y.
    pub y: i16,
    /// Relative z.
    pub z: i16,
    /// Level or remaining radius.
    pub level: u8,
}

impl LightNode {
    fn new(pos: CellPos, level: u8) -> Self {
        Self {
            x: pos.x as i16,
            y: pos.y as i16,
            z: pos.z as i16,
            level,
        }
    }

    fn pos(self) -> CellPos {
        CellPos::new(i32::from(self.x), i32::from(self.y), i32::from(self.z))
    }
}

/// Summary of one reflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReflowStats {
    /// Cells collected by the flood fill.
    pub visited: usize,
    /// Relaxation passes, including the final one that changed nothing.
    pub passes: u32,
}

/// Owns the two queues a reflow works with.
#[derive(Debug)]
pub struct LightEngine {
    config: LightConfig,
    frontier: RingQueue<LightNode>,
    working: RingQueue<LightNode>,
}

impl LightEngine {
    /// Creates an engine with queues sized for `config`.
    ///
    /// A radius above [`MAX_LIGHT`] is clamped; light never travels further.
    #[must_use]
    pub fn new(config: LightConfig) -> Self {
        let config = LightConfig {
            max_radius: config.max_radius.min(MAX_LIGHT),
        };
        let capacity = config.queue_capacity();
        Self {
            config,
            frontier: RingQueue::new(capacity),
            working: RingQueue::new(capacity),
        }
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &LightConfig {
        &self.config
    }

    /// Recomputes light around `pos` (window-relative).
    ///
    /// The caller writes the new cell first, then reflows.
    ///
    /// # Panics
    ///
    /// Panics if the window is not loaded or a queue overflows.
    pub fn reflow<O: WorldObserver>(&mut self, ctx: &mut QueryContext<'_, O>, pos: CellPos) -> ReflowStats {
        self.frontier.clear();
        self.working.clear();

        let Some(cur) = ctx.cell_at(pos).copied() else {
            return ReflowStats::default();
        };

        let radius = self.config.max_radius;
        let mut level = max_neighbour_light(ctx, pos);
        if ctx.store().cell_transparent(&cur) {
            level = level.saturating_sub(1);
            tracing::trace!(?pos, light = cur.light, neighbours = level, "transparent cell changed");

            if cur.light < level {
                self.frontier.enqueue(LightNode::new(pos, level.min(radius)));
            } else if cur.light > level {
                // Brighter than the neighbours imply: push our own light out
                self.frontier.enqueue(LightNode::new(pos, cur.light.min(radius)));
            } else {
                // Already settled, only touch the chunk
                ctx.cell_at_mut(pos);
                return ReflowStats::default();
            }
        } else {
            let emitted = emission(cur.ty);
            if let Some(cell) = ctx.cell_at_mut(pos) {
                cell.light = emitted;
            }
            level = level.max(emitted);
            self.enqueue_neighbours(pos, level.min(radius));
        }

        let visited = self.flood_fill(ctx);
        self.reset_visited(ctx);
        let passes = self.relax(ctx);

        tracing::debug!(?pos, visited, passes, "light reflowed");
        ReflowStats { visited, passes }
    }

    fn enqueue_neighbours(&mut self, pos: CellPos, radius: u8) {
        for n in pos.neighbours() {
            self.frontier.enqueue(LightNode::new(n, radius));
        }
    }

    /// Radius-bounded BFS over transparent cells. Returns the visited count.
    fn flood_fill<O: WorldObserver>(&mut self, ctx: &mut QueryContext<'_, O>) -> usize {
        let extent = ctx.cell_extent();
        let mut visited = 0;

        while let Some(node) = self.frontier.dequeue() {
            let pos = node.pos();
            if on_margin(pos, extent) {
                continue;
            }

            let Some(light) = ctx.cell_at(pos).map(|c| c.light) else {
                continue;
            };
            if light == LIGHT_VISITED || !ctx.transparent_at(pos) {
                continue;
            }

            if let Some(cell) = ctx.cell_at_mut(pos) {
                cell.light = LIGHT_VISITED;
            }
            self.working.enqueue(LightNode::new(pos, 1));
            visited += 1;

            if node.level > 0 {
                self.enqueue_neighbours(pos, node.level - 1);
            }
        }
        visited
    }

    /// Darkens every visited cell and freezes the working set for replay.
    fn reset_visited<O: WorldObserver>(&mut self, ctx: &mut QueryContext<'_, O>) {
        self.working.freeze();
        while let Some(node) = self.working.dequeue() {
            if let Some(cell) = ctx.cell_at_mut(node.pos()) {
                cell.light = 0;
            }
        }
    }

    /// Replays the working set until nothing brightens. Returns the pass count.
    fn relax<O: WorldObserver>(&mut self, ctx: &mut QueryContext<'_, O>) -> u32 {
        let mut passes = 0;
        loop {
            passes += 1;
            let mut raised = 0usize;

            self.working.thaw();
            while let Some(node) = self.working.dequeue() {
                let pos = node.pos();
                let Some(current) = ctx.cell_at(pos).map(|c| c.light) else {
                    continue;
                };

                let target = max_neighbour_light(ctx, pos).saturating_sub(1);
                if current < target {
                    if let Some(cell) = ctx.cell_at_mut(pos) {
                        cell.light = target;
                    }
                    raised += 1;
                }
            }

            tracing::trace!(pass = passes, raised, "relight pass");
            if raised == 0 {
                return passes;
            }
        }
    }
}

impl Default for LightEngine {
    fn default() -> Self {
        Self::new(LightConfig::default())
    }
}

/// Brightest light among the six neighbours that exist in the window.
fn max_neighbour_light<O: WorldObserver>(ctx: &QueryContext<'_, O>, pos: CellPos) -> u8 {
    pos.neighbours()
        .into_iter()
        .filter_map(|n| ctx.cell_at(n).map(|c| c.light))
        .max()
        .unwrap_or(0)
}

/// Returns true for the outermost cell layer of a window (and beyond).
fn on_margin(pos: CellPos, extent: [i32; 3]) -> bool {
    let [wx, wy, wz] = extent;
    pos.x <= 0 || pos.y <= 0 || pos.z <= 0 || pos.x >= wx - 1 || pos.y >= wy - 1 || pos.z >= wz - 1
}
