//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree built with the surface area heuristic. Every leaf holds
//! exactly one primitive, so `N` primitives produce `2N - 1` nodes. Nodes
//! live in one flat arena with the root at index 0 and children referenced by
//! index. Leaves refer to primitives by their index in the caller's slice,
//! which is passed again to every query.

use std::sync::Arc;
use std::time::Instant;

use tern_math::{Aabb, Interval, Ray, Vec3};

/// Anything the BVH can be built over.
pub trait Primitive: Send + Sync {
    /// Per-primitive hit payload returned by closest-hit queries.
    type Hit;

    fn bound(&self) -> Aabb;

    /// Closest intersection with `0 < t < ray.t_max`, returned with its `t`.
    fn intersect(&self, ray: &Ray) -> Option<(f32, Self::Hit)>;

    fn intersect_any(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }
}

impl<P: Primitive> Primitive for Arc<P> {
    type Hit = P::Hit;

    fn bound(&self) -> Aabb {
        (**self).bound()
    }

    fn intersect(&self, ray: &Ray) -> Option<(f32, Self::Hit)> {
        (**self).intersect(ray)
    }

    fn intersect_any(&self, ray: &Ray) -> bool {
        (**self).intersect_any(ray)
    }
}

/// Closest hit found by [`Bvh::intersect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhHit<H> {
    /// Index of the primitive in the slice the BVH was built over
    pub primitive: usize,
    pub t: f32,
    pub hit: H,
}

/// Node payload: two children or one primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvhNodeKind {
    Internal { children: [u32; 2] },
    Leaf { primitive: u32 },
}

/// One node of the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    /// Bound of the whole subtree
    pub bound: Aabb,
    pub kind: BvhNodeKind,
    /// Distance from the root
    pub depth: u32,
    /// Parent node index, `None` for the root
    pub parent: Option<u32>,
    /// Which child slot (0 or 1) of the parent this node occupies
    pub local_index: u8,
}

impl BvhNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, BvhNodeKind::Leaf { .. })
    }
}

/// Immutable SAH bounding volume hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    /// Leaf node index for each primitive
    leaf_of: Vec<u32>,
    max_depth: u32,
}

/// Pending subtree during construction.
struct BuildTask {
    begin: usize,
    end: usize,
    parent: Option<u32>,
    local_index: u8,
    depth: u32,
}

/// Buffers reused by every SAH split evaluation.
struct SahScratch {
    axis_order: [Vec<u32>; 3],
    right_area: Vec<f32>,
}

struct SahSplit {
    axis: usize,
    /// Number of primitives going to the left child
    index: usize,
    bound: Aabb,
}

impl Bvh {
    /// Build over a primitive slice. The slice must be non-empty.
    pub fn build<P: Primitive>(primitives: &[P]) -> Self {
        let bounds: Vec<Aabb> = primitives.iter().map(|p| p.bound()).collect();
        Self::from_bounds(&bounds)
    }

    /// Build from precomputed primitive bounds.
    pub fn from_bounds(bounds: &[Aabb]) -> Self {
        debug_assert!(!bounds.is_empty(), "BVH construction needs at least one primitive");
        let n = bounds.len();
        if n == 0 {
            return Self::default();
        }

        let start = Instant::now();
        let centroids: Vec<Vec3> = bounds.iter().map(|b| b.centroid()).collect();
        let mut order: Vec<u32> = (0..n as u32).collect();
        let mut nodes: Vec<BvhNode> = Vec::with_capacity(2 * n - 1);
        let mut leaf_of = vec![0u32; n];
        let mut max_depth = 0;
        let mut scratch = SahScratch {
            axis_order: [
                Vec::with_capacity(n),
                Vec::with_capacity(n),
                Vec::with_capacity(n),
            ],
            right_area: vec![0.0; n],
        };

        let mut stack = vec![BuildTask {
            begin: 0,
            end: n,
            parent: None,
            local_index: 0,
            depth: 0,
        }];

        while let Some(task) = stack.pop() {
            let index = nodes.len() as u32;
            if let Some(parent) = task.parent {
                if let BvhNodeKind::Internal { children } = &mut nodes[parent as usize].kind {
                    children[task.local_index as usize] = index;
                }
            }
            max_depth = max_depth.max(task.depth);

            let range = &mut order[task.begin..task.end];
            if range.len() == 1 {
                let primitive = range[0];
                leaf_of[primitive as usize] = index;
                nodes.push(BvhNode {
                    bound: bounds[primitive as usize],
                    kind: BvhNodeKind::Leaf { primitive },
                    depth: task.depth,
                    parent: task.parent,
                    local_index: task.local_index,
                });
                continue;
            }

            let split = find_sah_split(range, bounds, &centroids, &mut scratch);
            range.copy_from_slice(&scratch.axis_order[split.axis]);

            nodes.push(BvhNode {
                bound: split.bound,
                kind: BvhNodeKind::Internal {
                    children: [u32::MAX; 2],
                },
                depth: task.depth,
                parent: task.parent,
                local_index: task.local_index,
            });

            // Right is pushed first so the left subtree is laid out next
            let mid = task.begin + split.index;
            stack.push(BuildTask {
                begin: mid,
                end: task.end,
                parent: Some(index),
                local_index: 1,
                depth: task.depth + 1,
            });
            stack.push(BuildTask {
                begin: task.begin,
                end: mid,
                parent: Some(index),
                local_index: 0,
                depth: task.depth + 1,
            });
        }

        debug_assert_eq!(nodes.len(), 2 * n - 1);
        log::debug!(
            "BVH: {} primitives, {} nodes, max depth {}, built in {:?}",
            n,
            nodes.len(),
            max_depth,
            start.elapsed()
        );

        Self {
            nodes,
            leaf_of,
            max_depth,
        }
    }

    /// Closest hit with `t < ray.t_max`. Narrows `ray.t_max` to the hit distance.
    pub fn intersect<P: Primitive>(&self, primitives: &[P], ray: &mut Ray) -> Option<BvhHit<P::Hit>> {
        let root = self.nodes.first()?;
        root.bound.intersect(ray, Interval::new(0.0, ray.t_max))?;

        let mut closest = None;
        self.intersect_node(0, primitives, ray, &mut closest);
        closest
    }

    fn intersect_node<P: Primitive>(
        &self,
        index: u32,
        primitives: &[P],
        ray: &mut Ray,
        closest: &mut Option<BvhHit<P::Hit>>,
    ) {
        match self.nodes[index as usize].kind {
            BvhNodeKind::Leaf { primitive } => {
                if let Some((t, hit)) = primitives[primitive as usize].intersect(ray) {
                    if t < ray.t_max {
                        ray.t_max = t;
                        *closest = Some(BvhHit {
                            primitive: primitive as usize,
                            t,
                            hit,
                        });
                    }
                }
            }
            BvhNodeKind::Internal { children: [left, right] } => {
                let left_t = self.entry_distance(left, ray);
                let right_t = self.entry_distance(right, ray);

                match (left_t, right_t) {
                    (Some(lt), Some(rt)) => {
                        let (near, far, far_t) = if lt <= rt {
                            (left, right, rt)
                        } else {
                            (right, left, lt)
                        };
                        self.intersect_node(near, primitives, ray, closest);
                        // The near subtree may have narrowed t_max past the far box
                        if far_t < ray.t_max {
                            self.intersect_node(far, primitives, ray, closest);
                        }
                    }
                    (Some(_), None) => self.intersect_node(left, primitives, ray, closest),
                    (None, Some(_)) => self.intersect_node(right, primitives, ray, closest),
                    (None, None) => {}
                }
            }
        }
    }

    #[inline]
    fn entry_distance(&self, index: u32, ray: &Ray) -> Option<f32> {
        self.nodes[index as usize]
            .bound
            .intersect(ray, Interval::new(0.0, ray.t_max))
    }

    /// Whether anything is hit with `t < ray.t_max`. Stops at the first hit.
    pub fn intersect_any<P: Primitive>(&self, primitives: &[P], ray: &Ray) -> bool {
        !self.nodes.is_empty() && self.intersect_any_node(0, primitives, ray)
    }

    fn intersect_any_node<P: Primitive>(&self, index: u32, primitives: &[P], ray: &Ray) -> bool {
        let node = &self.nodes[index as usize];
        if !node.bound.hit(ray, Interval::new(0.0, ray.t_max)) {
            return false;
        }

        match node.kind {
            BvhNodeKind::Leaf { primitive } => primitives[primitive as usize].intersect_any(ray),
            BvhNodeKind::Internal { children: [left, right] } => {
                self.intersect_any_node(left, primitives, ray)
                    || self.intersect_any_node(right, primitives, ray)
            }
        }
    }

    /// All nodes, root first.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn node(&self, index: u32) -> &BvhNode {
        &self.nodes[index as usize]
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.nodes.first()
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of primitives (and leaves).
    pub fn leaf_count(&self) -> usize {
        self.leaf_of.len()
    }

    /// Depth of the deepest leaf.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Leaf node that holds `primitive`.
    pub fn leaf_of(&self, primitive: usize) -> u32 {
        self.leaf_of[primitive]
    }

    /// Walks parent back-references from `index` up to and including the root.
    pub fn ancestors(&self, index: u32) -> impl Iterator<Item = u32> + '_ {
        std::iter::successors(self.nodes[index as usize].parent, move |&i| {
            self.nodes[i as usize].parent
        })
    }
}

/// Evaluates every split position on all three axes and returns the cheapest.
///
/// Leaves `scratch.axis_order[axis]` holding `range` sorted by centroid on
/// each axis.
fn find_sah_split(
    range: &[u32],
    bounds: &[Aabb],
    centroids: &[Vec3],
    scratch: &mut SahScratch,
) -> SahSplit {
    let size = range.len();
    let mut best_cost = f32::INFINITY;
    let mut best = SahSplit {
        axis: 0,
        index: 1,
        bound: Aabb::EMPTY,
    };

    for axis in 0..3 {
        let sorted = &mut scratch.axis_order[axis];
        sorted.clear();
        sorted.extend_from_slice(range);
        sorted.sort_by(|&a, &b| centroids[a as usize][axis].total_cmp(&centroids[b as usize][axis]));

        // right_area[i] = area of the merged bounds of sorted[i..]
        let mut right = Aabb::EMPTY;
        for i in (1..size).rev() {
            right.merge(&bounds[sorted[i] as usize]);
            scratch.right_area[i] = right.surface_area();
        }

        let mut left = Aabb::EMPTY;
        for i in 1..size {
            left.merge(&bounds[sorted[i - 1] as usize]);
            let cost =
                left.surface_area() * i as f32 + scratch.right_area[i] * (size - i) as f32;
            if cost < best_cost {
                best_cost = cost;
                best.axis = axis;
                best.index = i;
            }
        }

        if axis == 0 {
            left.merge(&bounds[sorted[size - 1] as usize]);
            best.bound = left;
        }
    }

    best
}
