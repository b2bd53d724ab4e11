//! Structural results
//!
//! Wrappers that reshape the report data and hand it to an inner result,
//! built through the registry from the wrapper's own fields:
//!
//! - [`fixed`]: projects the table onto a fixed list of columns
//! - [`partitioned`]: splits the table by a key column, one inner result
//!   per group

pub mod fixed;
pub mod partitioned;

pub use fixed::{build_fixed, FixedColumnsConfig, FixedColumnsSink, FIXED_TYPE};
pub use partitioned::{
    build_partitioned, PartitionedConfig, PartitionedSink, PARTITION_GROUP_VARIABLE,
    PARTITIONED_TYPE,
};

use crate::domain::{HarborError, Result};

// The inner result receives the wrapper's fields, so a wrapper as inner
// type would rebuild itself forever.
fn ensure_leaf_inner(wrapper: &str, inner: &str) -> Result<()> {
    if inner == FIXED_TYPE || inner == PARTITIONED_TYPE {
        return Err(HarborError::Configuration(format!(
            "'{wrapper}' result cannot use '{inner}' as its inner_result_type"
        )));
    }
    Ok(())
}
