//! Ground support tracking: which solid voxels still connect to an anchor,
//! and which fall when blocks are removed.
#![forbid(unsafe_code)]

use std::collections::VecDeque;

use hashbrown::HashSet;
use spades_map::{IVec3, MapDims, VoxelGrid};

/// Which voxels count as permanently supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grounding {
    /// Solid voxels on this z layer are anchors.
    pub anchor_layer: i32,
}

impl Grounding {
    /// The bottom layer of the map.
    pub fn bottom(dims: MapDims) -> Self {
        Self {
            anchor_layer: dims.depth - 1,
        }
    }
}

/// Per-voxel link toward the parent on a path to an anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Link {
    #[default]
    Invalid = 0,
    Root,
    NegX,
    PosX,
    NegY,
    PosY,
    NegZ,
    PosZ,
}

impl Link {
    // Same order as `IVec3::FACES`.
    const TOWARD: [Link; 6] = [
        Link::NegX,
        Link::PosX,
        Link::NegY,
        Link::PosY,
        Link::NegZ,
        Link::PosZ,
    ];

    fn offset(self) -> Option<IVec3> {
        match self {
            Link::Invalid | Link::Root => None,
            Link::NegX => Some(IVec3::FACES[0]),
            Link::PosX => Some(IVec3::FACES[1]),
            Link::NegY => Some(IVec3::FACES[2]),
            Link::PosY => Some(IVec3::FACES[3]),
            Link::NegZ => Some(IVec3::FACES[4]),
            Link::PosZ => Some(IVec3::FACES[5]),
        }
    }
}

/// Spanning forest over solid voxels rooted at the anchor layer. Neighbors
/// do not wrap across the map edge.
pub struct SupportTracker {
    dims: MapDims,
    grounding: Grounding,
    links: Vec<Link>,
}

impl SupportTracker {
    pub fn new(grid: &VoxelGrid, grounding: Grounding) -> Self {
        let mut tracker = Self {
            dims: grid.dims(),
            grounding,
            links: vec![Link::Invalid; grid.dims().voxels()],
        };
        tracker.rebuild(grid);
        tracker
    }

    pub fn grounding(&self) -> Grounding {
        self.grounding
    }

    pub fn dims(&self) -> MapDims {
        self.dims
    }

    #[inline]
    fn index(&self, p: IVec3) -> usize {
        (p.y as usize * self.dims.width as usize + p.x as usize) * self.dims.depth as usize
            + p.z as usize
    }

    #[inline]
    fn in_bounds(&self, p: IVec3) -> bool {
        self.dims.contains(p.x, p.y, p.z)
    }

    pub fn link(&self, p: IVec3) -> Link {
        if self.in_bounds(p) {
            self.links[self.index(p)]
        } else {
            Link::Invalid
        }
    }

    /// Next voxel toward the anchor, if `p` is linked to a neighbor.
    pub fn parent(&self, p: IVec3) -> Option<IVec3> {
        self.link(p).offset().map(|o| p + o)
    }

    pub fn is_supported(&self, p: IVec3) -> bool {
        self.link(p) != Link::Invalid
    }

    pub fn supported_count(&self) -> usize {
        self.links.iter().filter(|l| **l != Link::Invalid).count()
    }

    fn set_link(&mut self, p: IVec3, link: Link) {
        let i = self.index(p);
        self.links[i] = link;
    }

    fn solid(grid: &VoxelGrid, p: IVec3) -> bool {
        grid.in_bounds(p.x, p.y, p.z) && grid.is_solid(p.x, p.y, p.z)
    }

    /// Recomputes every link from scratch. Needed after the grid is replaced
    /// or edited behind the tracker's back.
    pub fn rebuild(&mut self, grid: &VoxelGrid) {
        self.dims = grid.dims();
        self.links.clear();
        self.links.resize(self.dims.voxels(), Link::Invalid);
        let z = self.grounding.anchor_layer;
        let mut queue = VecDeque::new();
        if (0..self.dims.depth).contains(&z) {
            for y in 0..self.dims.height {
                for x in 0..self.dims.width {
                    let p = IVec3::new(x, y, z);
                    if grid.is_solid(x, y, z) {
                        self.set_link(p, Link::Root);
                        queue.push_back(p);
                    }
                }
            }
        }
        self.relink_from(grid, queue);
        log::debug!(
            target: "events",
            "support rebuild anchor_layer={} supported={}",
            z,
            self.supported_count()
        );
    }

    /// Breadth-first growth of the forest from already-linked voxels.
    fn relink_from(&mut self, grid: &VoxelGrid, mut queue: VecDeque<IVec3>) {
        while let Some(p) = queue.pop_front() {
            for (i, off) in IVec3::FACES.iter().enumerate() {
                let n = p + *off;
                if !Self::solid(grid, n) || self.link(n) != Link::Invalid {
                    continue;
                }
                // n's parent is p, which lies at -off from n.
                self.set_link(n, Link::TOWARD[i ^ 1]);
                queue.push_back(n);
            }
        }
    }

    /// Links `p` to an anchor or to any linked neighbor. Returns false if
    /// nothing around it is supported.
    fn attach(&mut self, grid: &VoxelGrid, p: IVec3) -> bool {
        if p.z == self.grounding.anchor_layer {
            self.set_link(p, Link::Root);
            return true;
        }
        for (i, off) in IVec3::FACES.iter().enumerate() {
            let n = p + *off;
            if Self::solid(grid, n) && self.is_supported(n) {
                self.set_link(p, Link::TOWARD[i]);
                return true;
            }
        }
        false
    }

    /// Places a solid voxel and links it. Unsupported neighbors that now
    /// reach an anchor through it are relinked.
    pub fn add_block(&mut self, grid: &mut VoxelGrid, p: IVec3, color: u32) {
        if !self.in_bounds(p) {
            return;
        }
        grid.set(p.x, p.y, p.z, true, color);
        if self.is_supported(p) {
            return;
        }
        if self.attach(grid, p) {
            self.relink_from(grid, VecDeque::from([p]));
        }
    }

    /// Clears the given voxels and returns every remaining solid voxel that
    /// lost its path to an anchor. Those voxels are left in the grid.
    pub fn remove_blocks(&mut self, grid: &mut VoxelGrid, cells: &[IVec3]) -> Vec<IVec3> {
        let mut removed = Vec::with_capacity(cells.len());
        for &p in cells {
            if !Self::solid(grid, p) {
                continue;
            }
            grid.set(p.x, p.y, p.z, false, 0);
            self.set_link(p, Link::Invalid);
            removed.push(p);
        }

        // Unlink everything that hung off a removed voxel.
        let mut orphaned = Vec::new();
        let mut stack = removed.clone();
        while let Some(p) = stack.pop() {
            for off in IVec3::FACES {
                let n = p + off;
                if !Self::solid(grid, n) || self.parent(n) != Some(p) {
                    continue;
                }
                self.set_link(n, Link::Invalid);
                orphaned.push(n);
                stack.push(n);
            }
        }

        // Reattach orphans that still touch supported terrain, then grow.
        let mut seeds = VecDeque::new();
        for &p in &orphaned {
            if !self.is_supported(p) && self.attach(grid, p) {
                seeds.push_back(p);
            }
        }
        self.relink_from(grid, seeds);

        let floating: Vec<IVec3> = orphaned
            .into_iter()
            .filter(|&p| !self.is_supported(p) && Self::solid(grid, p))
            .collect();
        log::debug!(
            target: "events",
            "support remove requested={} removed={} floating={}",
            cells.len(),
            removed.len(),
            floating.len()
        );
        floating
    }
}

/// Splits `cells` into 6-connected components. Components and their cells
/// come out in first-seen input order.
pub fn clusterize_blocks(cells: &[IVec3]) -> Vec<Vec<IVec3>> {
    let all: HashSet<IVec3> = cells.iter().copied().collect();
    let mut seen: HashSet<IVec3> = HashSet::with_capacity(all.len());
    let mut clusters = Vec::new();
    for &start in cells {
        if !seen.insert(start) {
            continue;
        }
        let mut cluster = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(p) = queue.pop_front() {
            for off in IVec3::FACES {
                let n = p + off;
                if all.contains(&n) && seen.insert(n) {
                    cluster.push(n);
                    queue.push_back(n);
                }
            }
        }
        clusters.push(cluster);
    }
    clusters
}
