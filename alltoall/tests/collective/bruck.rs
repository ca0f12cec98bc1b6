use alltoall::{Algorithm, ErrorKind, ExchangeError};
use std::sync::atomic::Ordering;

use super::helpers::{counting_group, expected_recv, run_collective, run_on, send_buffer};

#[tokio::test]
async fn test_bruck_rank_ids_4_nodes() {
    run_collective(4, |comm| async move {
        let rank = comm.rank() as i32;
        let send: Vec<i32> = vec![rank; 4];
        let mut recv: Vec<i32> = vec![-1; 4];

        comm.all_to_all(
            bytemuck::cast_slice(&send),
            bytemuck::cast_slice_mut(&mut recv),
            1,
            4,
            Algorithm::Bruck,
        )
        .await
        .unwrap();

        assert_eq!(recv, vec![0, 1, 2, 3], "rank {rank} bruck failed");
    })
    .await;
}

#[tokio::test]
async fn test_bruck_power_of_two_worlds() {
    for world in [1u32, 2, 4, 8, 16] {
        run_collective(world, move |comm| async move {
            let rank = comm.rank() as usize;
            let w = world as usize;
            let send = send_buffer(rank, w, 5);
            let mut recv = vec![0u32; 5 * w];

            comm.all_to_all_typed(&send, &mut recv, 5, Algorithm::Bruck)
                .await
                .unwrap();

            assert_eq!(recv, expected_recv(rank, w, 5), "world {w} rank {rank}");
        })
        .await;
    }
}

#[tokio::test]
async fn test_bruck_wide_entries() {
    // 8-byte entries, 3 per cell: rotation and packing must move whole cells.
    run_collective(8, |comm| async move {
        let rank = comm.rank() as u64;
        let send: Vec<u64> = (0..8u64)
            .flat_map(|dst| (0..3u64).map(move |e| (rank << 32) | (dst << 8) | e))
            .collect();
        let mut recv = vec![0u64; 24];

        comm.all_to_all_typed(&send, &mut recv, 3, Algorithm::Bruck)
            .await
            .unwrap();

        let expected: Vec<u64> = (0..8u64)
            .flat_map(|src| (0..3u64).map(move |e| (src << 32) | (rank << 8) | e))
            .collect();
        assert_eq!(recv, expected);
    })
    .await;
}

#[tokio::test]
async fn test_bruck_round_count() {
    let (comms, counters) = counting_group(8);
    run_on(comms, |comm| async move {
        let rank = comm.rank() as usize;
        let send = send_buffer(rank, 8, 1);
        let mut recv = vec![0u32; 8];
        comm.all_to_all_typed(&send, &mut recv, 1, Algorithm::Bruck)
            .await
            .unwrap();
    })
    .await;

    for (rank, c) in counters.iter().enumerate() {
        assert_eq!(c.sends.load(Ordering::SeqCst), 3, "rank {rank} sends");
        assert_eq!(c.recvs.load(Ordering::SeqCst), 3, "rank {rank} recvs");
    }
    assert_eq!(Algorithm::Bruck.rounds(8), Some(3));
}

#[tokio::test]
async fn test_bruck_rejects_non_power_of_two_before_communicating() {
    let (comms, counters) = counting_group(6);
    let results = run_on(comms, |comm| async move {
        let rank = comm.rank() as usize;
        let send = send_buffer(rank, 6, 1);
        let mut recv = vec![0u32; 6];
        let result = comm
            .all_to_all_typed(&send, &mut recv, 1, Algorithm::Bruck)
            .await;
        result
    })
    .await;

    for result in results {
        let err = result.unwrap_err();
        assert!(matches!(err, ExchangeError::NotPowerOfTwo { world_size: 6 }));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
    for c in &counters {
        assert_eq!(c.sends.load(Ordering::SeqCst), 0);
        assert_eq!(c.recvs.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_bruck_single_rank_is_identity() {
    let (comms, counters) = counting_group(1);
    run_on(comms, |comm| async move {
        let send: Vec<u8> = vec![1, 2, 3];
        let mut recv: Vec<u8> = vec![0; 3];
        comm.all_to_all(&send, &mut recv, 3, 1, Algorithm::Bruck)
            .await
            .unwrap();
        assert_eq!(recv, send);
    })
    .await;
    assert_eq!(counters[0].sends.load(Ordering::SeqCst), 0);
}
