//! Host-side model of the vote → scan → compact passes.
//!
//! Mirrors the dispatch structure of grass_cull.wgsl (fixed-size groups,
//! per-group totals, a blocked group-of-groups scan with carry) so GPU output
//! can be checked stage by stage. The frame path never runs this.

use rayon::prelude::*;

use crate::grass::draw_args::{DrawArgs, MeshInfo};
use crate::grass::instance::GrassInstance;

use super::sizing::{DispatchSize, GROUP_SCAN_BLOCK_SIZE, SCAN_GROUP_SIZE};
use super::vote::VisibilityTest;

/// Every intermediate buffer of one chunk's cull.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceCull {
    pub votes: Vec<u32>,
    pub scan: Vec<u32>,
    pub group_sums: Vec<u32>,
    pub scanned_group_sums: Vec<u32>,
    pub draw_args: DrawArgs,
    /// Only `[..draw_args.instance_count]` is meaningful
    pub culled: Vec<GrassInstance>,
}

/// One flag per instance.
pub fn vote(instances: &[GrassInstance], test: &VisibilityTest) -> Vec<u32> {
    instances
        .par_iter()
        .map(|instance| u32::from(test.is_visible(instance.position())))
        .collect()
}

/// Exclusive prefix sum, returning the total alongside.
pub fn exclusive_scan(values: &[u32]) -> (Vec<u32>, u32) {
    let mut running = 0u32;
    let scanned = values
        .iter()
        .map(|&v| {
            let out = running;
            running += v;
            out
        })
        .collect();
    (scanned, running)
}

/// Level 1: per-group exclusive scan over `group_count` groups of `group_size`.
/// Slots that voted 0 hold 0. Votes past the end of `votes` count as zero.
pub fn scan_local(votes: &[u32], group_size: u32, group_count: u32) -> (Vec<u32>, Vec<u32>) {
    let group_size = group_size as usize;
    let mut padded = votes.to_vec();
    padded.resize(group_size * group_count as usize, 0);

    let mut scan = Vec::with_capacity(padded.len());
    let mut group_sums = Vec::with_capacity(group_count as usize);
    for group in padded.chunks(group_size) {
        let (local, total) = exclusive_scan(group);
        scan.extend(
            local.into_iter().zip(group).map(|(offset, &v)| if v == 1 { offset } else { 0 }),
        );
        group_sums.push(total);
    }
    (scan, group_sums)
}

/// Level 2: exclusive scan of the group sums, one 1024-wide block at a time,
/// each block offset by the reduction of every earlier sum.
pub fn scan_groups(group_sums: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(group_sums.len());
    for (block, sums) in group_sums.chunks(GROUP_SCAN_BLOCK_SIZE as usize).enumerate() {
        let block_start = block * GROUP_SCAN_BLOCK_SIZE as usize;
        let carry: u32 = group_sums[..block_start].iter().sum();
        let (local, _) = exclusive_scan(sums);
        out.extend(local.into_iter().map(|v| v + carry));
    }
    out
}

/// Scatter voted instances to their global slot and count them into `draw_args`.
/// Slots at or past the final count are left as they were.
pub fn compact(
    instances: &[GrassInstance],
    votes: &[u32],
    scan: &[u32],
    scanned_group_sums: &[u32],
    draw_args: &mut DrawArgs,
    culled: &mut [GrassInstance],
) {
    for (i, instance) in instances.iter().enumerate() {
        if votes[i] == 1 {
            let group = DispatchSize::group_of(i as u32) as usize;
            let slot = scanned_group_sums[group] + scan[i];
            culled[slot as usize] = *instance;
            draw_args.instance_count += 1;
        }
    }
}

/// Full cull of one chunk with the GPU group sizes, starting from a reset
/// draw-argument record. `culled` carries over whatever the caller passes in.
pub fn cull(
    instances: &[GrassInstance],
    test: &VisibilityTest,
    mesh: MeshInfo,
    mut culled: Vec<GrassInstance>,
) -> ReferenceCull {
    let dispatch = DispatchSize::for_instances(instances.len() as u32);
    culled.resize(instances.len().max(culled.len()), GrassInstance::default());

    let votes = vote(instances, test);
    let (scan, group_sums) = scan_local(&votes, SCAN_GROUP_SIZE, dispatch.scan_groups);
    let scanned_group_sums = scan_groups(&group_sums);

    let mut draw_args = DrawArgs::seeded(mesh);
    compact(
        instances,
        &votes,
        &scan,
        &scanned_group_sums,
        &mut draw_args,
        &mut culled,
    );

    ReferenceCull {
        votes,
        scan,
        group_sums,
        scanned_group_sums,
        draw_args,
        culled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::{Camera, FrameCamera};
    use crate::grass::config::GrassConfig;
    use glam::{Vec2, Vec3};

    fn instances(n: usize) -> Vec<GrassInstance> {
        (0..n)
            .map(|i| GrassInstance::new(Vec3::new(i as f32, 0.0, 0.0), Vec2::ZERO))
            .collect()
    }

    const MESH: MeshInfo = MeshInfo { index_count: 15, first_index: 0, base_vertex: 0 };

    #[test]
    fn test_four_instance_scenario() {
        let inst = instances(4);
        let votes = [1, 0, 1, 1];
        let (scan, group_sums) = scan_local(&votes, 4, 1);
        assert_eq!(scan, vec![0, 0, 1, 2]);
        assert_eq!(group_sums, vec![3]);

        let scanned = scan_groups(&group_sums);
        assert_eq!(scanned, vec![0]);

        let mut args = DrawArgs::seeded(MESH);
        let mut culled = vec![GrassInstance::default(); 4];
        compact(&inst, &votes, &scan, &scanned, &mut args, &mut culled);
        assert_eq!(args.instance_count, 3);
        assert_eq!(&culled[..3], &[inst[0], inst[2], inst[3]]);
    }

    #[test]
    fn test_two_groups_scenario() {
        let votes = [1, 1, 0, 1];
        let (scan, group_sums) = scan_local(&votes, 2, 2);
        assert_eq!(group_sums, vec![2, 1]);
        let scanned = scan_groups(&group_sums);
        assert_eq!(scanned, vec![0, 2]);
        assert_eq!(scan, vec![0, 1, 0, 0]);
        // Group 1's voted instance (index 3) lands in slot 2 + 0
        assert_eq!(scanned[1] + scan[3], 2);
    }

    #[test]
    fn test_scan_zero_where_voted_out() {
        let votes = [0, 1, 0, 0, 1, 1, 0, 1];
        let (scan, sums) = scan_local(&votes, 8, 1);
        assert_eq!(scan, vec![0, 0, 0, 0, 1, 2, 0, 3]);
        assert_eq!(sums, vec![4]);
    }

    #[test]
    fn test_all_zero_votes_leave_tail_untouched() {
        let inst = instances(3);
        let votes = [0, 0, 0];
        let (scan, sums) = scan_local(&votes, 128, 1);
        let scanned = scan_groups(&sums);
        let stale = GrassInstance::new(Vec3::splat(99.0), Vec2::ONE);
        let mut culled = vec![stale; 3];
        let mut args = DrawArgs::seeded(MESH);
        compact(&inst, &votes, &scan, &scanned, &mut args, &mut culled);
        assert_eq!(args.instance_count, 0);
        assert_eq!(culled, vec![stale; 3]);
    }

    #[test]
    fn test_scan_local_pads_with_zero() {
        let (scan, sums) = scan_local(&[1, 1, 1], 2, 4);
        assert_eq!(scan.len(), 8);
        assert_eq!(sums, vec![2, 1, 0, 0]);
    }

    #[test]
    fn test_scan_groups_carries_across_blocks() {
        let sums = vec![1u32; 2500];
        let scanned = scan_groups(&sums);
        let expected: Vec<u32> = (0..2500).collect();
        assert_eq!(scanned, expected);
    }

    #[test]
    fn test_compaction_is_stable_and_exact() {
        let inst = instances(1000);
        let votes: Vec<u32> = (0..1000).map(|i| u32::from(i % 3 == 0 || i % 7 == 0)).collect();
        let dispatch = DispatchSize::for_instances(1000);
        let (scan, sums) = scan_local(&votes, SCAN_GROUP_SIZE, dispatch.scan_groups);
        let scanned = scan_groups(&sums);
        let mut args = DrawArgs::seeded(MESH);
        let mut culled = vec![GrassInstance::default(); 1000];
        compact(&inst, &votes, &scan, &scanned, &mut args, &mut culled);

        let expected: Vec<GrassInstance> = inst
            .iter()
            .zip(&votes)
            .filter(|(_, v)| **v == 1)
            .map(|(i, _)| *i)
            .collect();
        assert_eq!(args.instance_count, votes.iter().sum::<u32>());
        assert_eq!(&culled[..expected.len()], expected.as_slice());
    }

    #[test]
    fn test_cull_is_idempotent() {
        let camera = Camera::look_at(Vec3::new(0.0, 2.0, 10.0), Vec3::ZERO);
        let test = VisibilityTest::new(&FrameCamera::from_camera(&camera), &GrassConfig::default());
        let inst: Vec<GrassInstance> = (0..500)
            .map(|i| GrassInstance::new(Vec3::new((i % 25) as f32 - 12.0, 0.0, (i / 25) as f32 - 10.0), Vec2::ZERO))
            .collect();

        let first = cull(&inst, &test, MESH, Vec::new());
        let second = cull(&inst, &test, MESH, first.culled.clone());
        assert_eq!(first, second);
        assert!(first.draw_args.instance_count > 0);
        assert!(first.draw_args.instance_count < 500);
    }

    #[test]
    fn test_cull_empty_chunk() {
        let test = VisibilityTest::new(&FrameCamera::from_camera(&Camera::default()), &GrassConfig::default());
        let result = cull(&[], &test, MESH, Vec::new());
        assert_eq!(result.draw_args.instance_count, 0);
        assert_eq!(result.group_sums, vec![0]);
        assert_eq!(result.scan.len(), 128);
        assert_eq!(result.draw_args.index_count, 15);
    }
}
