//! Thread-group sizing for the vote, scan and compact dispatches.
//!
//! Every scan level is rounded up to a power of two, and no level ever
//! dispatches fewer than one workgroup.

use crate::core::error::Error;
use crate::core::types::Result;

/// Instances per vote/scan/compact workgroup. Must match `GROUP_SIZE` in grass_cull.wgsl.
pub const SCAN_GROUP_SIZE: u32 = 128;

/// Group sums covered by one group-of-groups workgroup. Must match `BLOCK_SIZE`.
pub const GROUP_SCAN_BLOCK_SIZE: u32 = 1024;

/// Dispatch dimensions for one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchSize {
    pub instance_count: u32,
    /// Workgroups for vote and compact: ceil(n / 128), at least 1
    pub vote_groups: u32,
    /// Workgroups for the level-1 scan, `vote_groups` rounded to a power of two.
    /// Also the length of the group-sum arrays.
    pub scan_groups: u32,
    /// Workgroups for the level-2 scan: ceil(scan_groups / 1024), at least 1
    pub group_scan_groups: u32,
}

impl DispatchSize {
    pub fn for_instances(instance_count: u32) -> Self {
        let vote_groups = instance_count.div_ceil(SCAN_GROUP_SIZE).max(1);
        let scan_groups = vote_groups.next_power_of_two();
        let group_scan_groups = scan_groups.div_ceil(GROUP_SCAN_BLOCK_SIZE).max(1);

        Self {
            instance_count,
            vote_groups,
            scan_groups,
            group_scan_groups,
        }
    }

    /// Sizing that covers every chunk, used for the shared scratch set.
    pub fn for_largest(counts: impl IntoIterator<Item = u32>) -> Self {
        Self::for_instances(counts.into_iter().max().unwrap_or(0))
    }

    /// Entries in the vote and scan buffers.
    pub fn scratch_len(&self) -> u64 {
        self.scan_groups as u64 * SCAN_GROUP_SIZE as u64
    }

    /// Workgroup that owns instance `i`.
    pub fn group_of(i: u32) -> u32 {
        i / SCAN_GROUP_SIZE
    }

    /// True when scratch sized for `self` can serve a chunk sized `other`.
    pub fn covers(&self, other: &DispatchSize) -> bool {
        self.scan_groups >= other.scan_groups
    }

    /// Fail if any dispatch exceeds the device's per-dimension workgroup limit.
    pub fn check_limits(&self, max_workgroups_per_dimension: u32) -> Result<()> {
        let largest = self.scan_groups.max(self.vote_groups).max(self.group_scan_groups);
        if largest > max_workgroups_per_dimension {
            return Err(Error::Config(format!(
                "{} instances per chunk need {largest} workgroups, device allows {max_workgroups_per_dimension}; \
                 use more chunks or a lower density",
                self.instance_count
            )));
        }
        Ok(())
    }
}
