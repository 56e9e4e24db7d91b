//! Binary encode/decode for stored plans.
//!
//! All integers are little-endian. Nodes are written in pre-order, each
//! followed by its child count, so a reader rebuilds the tree without
//! re-deriving a single cut. No compression, no alignment padding.

use std::io::{self, Read, Write};

use smallvec::SmallVec;
use trapeze_core::{Domain, Interval, Slopes, StencilError};

use crate::plan::{Extent, NodeKind, Plan, TileNode};
use crate::{FORMAT_VERSION, MAGIC};

/// Largest rank a stored plan may declare.
pub const MAX_RANK: u32 = 64;

/// Deepest node nesting a stored plan may contain.
pub const MAX_DEPTH: usize = 1024;

const TAG_LEAF: u8 = 0;
const TAG_TIME: u8 = 1;
const TAG_SPACE: u8 = 2;

fn corrupt(detail: impl Into<String>) -> StencilError {
    StencilError::PlanCorrupt {
        detail: detail.into(),
    }
}

fn read_exact(r: &mut dyn Read, buf: &mut [u8]) -> Result<(), StencilError> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => corrupt("unexpected end of data"),
        _ => StencilError::Io(e),
    })
}

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), StencilError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), StencilError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), StencilError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i64.
pub fn write_i64_le(w: &mut dyn Write, v: i64) -> Result<(), StencilError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, StencilError> {
    let mut buf = [0u8; 1];
    read_exact(r, &mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, StencilError> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, StencilError> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian i64.
pub fn read_i64_le(r: &mut dyn Read) -> Result<i64, StencilError> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

// ── Plan encode ─────────────────────────────────────────────────

/// Encode a whole plan: header, then the node list.
pub fn encode_plan(w: &mut dyn Write, plan: &Plan) -> Result<(), StencilError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;

    let domain = plan.domain();
    write_u32_le(w, domain.rank() as u32)?;
    for iv in domain.intervals() {
        write_i64_le(w, iv.lo())?;
        write_i64_le(w, iv.hi())?;
    }
    write_u64_le(w, plan.timesteps())?;
    for &s in plan.slopes().as_slice() {
        write_u64_le(w, s)?;
    }

    write_u64_le(w, plan.node_count() as u64)?;
    encode_node(w, plan.root())
}

fn encode_node(w: &mut dyn Write, node: &TileNode) -> Result<(), StencilError> {
    match node.kind {
        NodeKind::Leaf => write_u8(w, TAG_LEAF)?,
        NodeKind::TimeSplit => write_u8(w, TAG_TIME)?,
        NodeKind::SpaceSplit { dim } => {
            write_u8(w, TAG_SPACE)?;
            write_u32_le(w, dim as u32)?;
        }
    }
    write_u8(w, node.wave)?;
    write_i64_le(w, node.t0)?;
    write_i64_le(w, node.t1)?;
    for e in &node.extents {
        write_i64_le(w, e.lo)?;
        write_i64_le(w, e.hi)?;
        write_i64_le(w, e.dlo)?;
        write_i64_le(w, e.dhi)?;
        write_u8(w, u8::from(e.circular))?;
    }
    let count = u8::try_from(node.children.len())
        .map_err(|_| corrupt(format!("node has {} children", node.children.len())))?;
    write_u8(w, count)?;
    for child in &node.children {
        encode_node(w, child)?;
    }
    Ok(())
}

// ── Plan decode ─────────────────────────────────────────────────

/// Decode and validate a whole plan.
///
/// Fails with `PlanCorrupt` on malformed bytes, trailing bytes after the
/// last node, or a tree that does not tile its domain exactly once (see
/// [`Plan::validate_tiling`]).
pub fn decode_plan(r: &mut dyn Read) -> Result<Plan, StencilError> {
    let mut magic = [0u8; 4];
    read_exact(r, &mut magic)?;
    if magic != MAGIC {
        return Err(corrupt(format!("bad magic {magic:02x?}")));
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(corrupt(format!(
            "unsupported format version {version} (expected {FORMAT_VERSION})"
        )));
    }

    let rank = read_u32_le(r)?;
    if rank == 0 || rank > MAX_RANK {
        return Err(corrupt(format!("rank {rank} out of range [1, {MAX_RANK}]")));
    }
    let rank = rank as usize;
    let mut intervals: SmallVec<[Interval; 4]> = SmallVec::with_capacity(rank);
    for dim in 0..rank {
        let lo = read_i64_le(r)?;
        let hi = read_i64_le(r)?;
        let iv = Interval::new(lo, hi)
            .map_err(|_| corrupt(format!("dimension {dim} has empty bounds [{lo}, {hi})")))?;
        intervals.push(iv);
    }
    let domain = Domain::new(intervals).map_err(|e| corrupt(e.to_string()))?;

    let timesteps = read_u64_le(r)?;
    if timesteps == 0 || timesteps >= i64::MAX as u64 {
        return Err(corrupt(format!("timestep count {timesteps} out of range")));
    }
    let mut slopes = Vec::with_capacity(rank);
    for _ in 0..rank {
        slopes.push(read_u64_le(r)?);
    }

    let declared = read_u64_le(r)?;
    let mut decoded = 0u64;
    let root = decode_node(r, rank, declared, &mut decoded, 0)?;
    if decoded != declared {
        return Err(corrupt(format!(
            "header declares {declared} nodes, found {decoded}"
        )));
    }
    let mut trailing = [0u8; 1];
    match r.read(&mut trailing) {
        Ok(0) => {}
        Ok(_) => return Err(corrupt("trailing data after last node")),
        Err(e) => return Err(StencilError::Io(e)),
    }

    let plan = Plan::from_parts(domain, timesteps, Slopes::from_vec(slopes), root);
    plan.validate_tiling()?;
    Ok(plan)
}

fn decode_node(
    r: &mut dyn Read,
    rank: usize,
    declared: u64,
    decoded: &mut u64,
    depth: usize,
) -> Result<TileNode, StencilError> {
    if depth >= MAX_DEPTH {
        return Err(corrupt(format!("node nesting exceeds {MAX_DEPTH}")));
    }
    *decoded += 1;
    if *decoded > declared {
        return Err(corrupt(format!(
            "more nodes than the {declared} declared"
        )));
    }

    let kind = match read_u8(r)? {
        TAG_LEAF => NodeKind::Leaf,
        TAG_TIME => NodeKind::TimeSplit,
        TAG_SPACE => {
            let dim = read_u32_le(r)? as usize;
            if dim >= rank {
                return Err(corrupt(format!(
                    "space cut on dimension {dim} of a rank-{rank} plan"
                )));
            }
            NodeKind::SpaceSplit { dim }
        }
        tag => return Err(corrupt(format!("unknown node tag {tag}"))),
    };
    let wave = read_u8(r)?;
    let t0 = read_i64_le(r)?;
    let t1 = read_i64_le(r)?;
    if t0 >= t1 {
        return Err(corrupt(format!("node spans empty time range [{t0}, {t1})")));
    }

    let mut extents = Vec::with_capacity(rank);
    for _ in 0..rank {
        let lo = read_i64_le(r)?;
        let hi = read_i64_le(r)?;
        let dlo = read_i64_le(r)?;
        let dhi = read_i64_le(r)?;
        let circular = match read_u8(r)? {
            0 => false,
            1 => true,
            flag => return Err(corrupt(format!("invalid circular flag {flag}"))),
        };
        extents.push(Extent {
            lo,
            hi,
            dlo,
            dhi,
            circular,
        });
    }

    let count = read_u8(r)?;
    match (kind, count) {
        (NodeKind::Leaf, 0) => {}
        (NodeKind::Leaf, n) => return Err(corrupt(format!("leaf declares {n} children"))),
        (_, 0) => return Err(corrupt("split node has no children")),
        (NodeKind::TimeSplit, n) if n > 2 => {
            return Err(corrupt(format!("time split declares {n} children")))
        }
        (NodeKind::SpaceSplit { .. }, n) if n > 3 => {
            return Err(corrupt(format!("space split declares {n} children")))
        }
        _ => {}
    }

    let mut children = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let child = decode_node(r, rank, declared, decoded, depth + 1)?;
        if child.t0 < t0 || child.t1 > t1 {
            return Err(corrupt(format!(
                "child spans [{}, {}) outside parent [{t0}, {t1})",
                child.t0, child.t1
            )));
        }
        children.push(child);
    }

    Ok(TileNode {
        kind,
        wave,
        t0,
        t1,
        extents,
        children,
    })
}
