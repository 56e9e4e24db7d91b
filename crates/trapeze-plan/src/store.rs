//! [`PlanStore`]: persist plans and load them back.
//!
//! A loaded plan is structurally equal to the stored one, so running it
//! gives exactly the results of running the plan it was stored from.

use std::io::{Read, Write};

use tracing::debug;
use trapeze_core::StencilError;

use crate::codec::{decode_plan, encode_plan};
use crate::plan::Plan;

/// Reads and writes the binary plan format.
///
/// Generic over `Read`/`Write` so tests can use byte slices and
/// production code can use buffered files.
///
/// # Examples
///
/// ```
/// use trapeze_core::{Domain, Slopes};
/// use trapeze_plan::{PlanGenerator, PlanStore};
///
/// let domain = Domain::from_sizes(&[128]).unwrap();
/// let plan = PlanGenerator::default()
///     .generate(&domain, &Slopes::from_vec(vec![1]), true, 40)
///     .unwrap();
///
/// let mut buf = Vec::new();
/// PlanStore::store(&plan, &mut buf).unwrap();
/// let loaded = PlanStore::load(buf.as_slice()).unwrap();
/// assert_eq!(loaded, plan);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PlanStore;

impl PlanStore {
    /// Write `plan` to `sink`.
    pub fn store<W: Write>(plan: &Plan, mut sink: W) -> Result<(), StencilError> {
        encode_plan(&mut sink, plan)?;
        sink.flush()?;
        debug!(nodes = plan.node_count(), timesteps = plan.timesteps(), "stored plan");
        Ok(())
    }

    /// Read a plan from `source`, consuming it to the end.
    pub fn load<R: Read>(mut source: R) -> Result<Plan, StencilError> {
        let plan = decode_plan(&mut source)?;
        debug!(nodes = plan.node_count(), timesteps = plan.timesteps(), "loaded plan");
        Ok(plan)
    }

    /// Encode `plan` into a fresh buffer.
    pub fn to_bytes(plan: &Plan) -> Result<Vec<u8>, StencilError> {
        let mut buf = Vec::new();
        Self::store(plan, &mut buf)?;
        Ok(buf)
    }

    /// Decode a plan from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Plan, StencilError> {
        Self::load(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeneratorConfig, PlanGenerator};
    use trapeze_core::{Domain, Slopes};

    fn sample() -> Plan {
        let gen = PlanGenerator::new(GeneratorConfig {
            leaf_volume: 32,
            ..Default::default()
        })
        .unwrap();
        let domain = Domain::from_bounds(&[(1, 23), (0, 9)]).unwrap();
        gen.generate(&domain, &Slopes::from_vec(vec![2, 1]), false, 13)
            .unwrap()
    }

    #[test]
    fn store_then_load_is_identity() {
        let plan = sample();
        let bytes = PlanStore::to_bytes(&plan).unwrap();
        assert_eq!(&bytes[..4], b"TRPZ");
        let loaded = PlanStore::from_bytes(&bytes).unwrap();
        assert_eq!(loaded, plan);
        assert_eq!(PlanStore::to_bytes(&loaded).unwrap(), bytes);
    }

    #[test]
    fn every_truncation_is_corrupt() {
        let bytes = PlanStore::to_bytes(&sample()).unwrap();
        for len in [0, 3, 5, 9, bytes.len() / 2, bytes.len() - 1] {
            match PlanStore::from_bytes(&bytes[..len]) {
                Err(StencilError::PlanCorrupt { .. }) => {}
                other => panic!("expected PlanCorrupt for {len} bytes, got {other:?}"),
            }
        }
    }

    #[test]
    fn trailing_data_is_corrupt() {
        let mut bytes = PlanStore::to_bytes(&sample()).unwrap();
        bytes.push(0);
        assert!(matches!(
            PlanStore::from_bytes(&bytes),
            Err(StencilError::PlanCorrupt { .. })
        ));
    }

    #[test]
    fn failing_sink_is_io_error() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::StorageFull, "full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        assert!(matches!(
            PlanStore::store(&sample(), Full),
            Err(StencilError::Io(_))
        ));
    }
}
