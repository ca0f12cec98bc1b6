use alltoall::Algorithm;
use std::sync::atomic::Ordering;

use super::helpers::{counting_group, expected_recv, run_collective, run_on, send_buffer};

#[tokio::test]
async fn test_pairwise_rank_ids_4_nodes() {
    run_collective(4, |comm| async move {
        let rank = comm.rank() as i32;
        let send: Vec<i32> = vec![rank; 4];
        let mut recv: Vec<i32> = vec![-1; 4];

        comm.all_to_all(
            bytemuck::cast_slice(&send),
            bytemuck::cast_slice_mut(&mut recv),
            1,
            4,
            Algorithm::Pairwise,
        )
        .await
        .unwrap();

        assert_eq!(recv, vec![0, 1, 2, 3], "rank {rank} pairwise failed");
    })
    .await;
}

#[tokio::test]
async fn test_pairwise_all_world_sizes() {
    for world in 1..=7u32 {
        run_collective(world, move |comm| async move {
            let rank = comm.rank() as usize;
            let w = world as usize;
            let send = send_buffer(rank, w, 3);
            let mut recv = vec![0u32; 3 * w];

            comm.all_to_all_typed(&send, &mut recv, 3, Algorithm::Pairwise)
                .await
                .unwrap();

            assert_eq!(recv, expected_recv(rank, w, 3), "world {w} rank {rank}");
        })
        .await;
    }
}

#[tokio::test]
async fn test_pairwise_round_count() {
    let (comms, counters) = counting_group(5);
    run_on(comms, |comm| async move {
        let rank = comm.rank() as usize;
        let send = send_buffer(rank, 5, 2);
        let mut recv = vec![0u32; 10];
        comm.all_to_all_typed(&send, &mut recv, 2, Algorithm::Pairwise)
            .await
            .unwrap();
    })
    .await;

    for (rank, c) in counters.iter().enumerate() {
        assert_eq!(c.sends.load(Ordering::SeqCst), 4, "rank {rank} sends");
        assert_eq!(c.recvs.load(Ordering::SeqCst), 4, "rank {rank} recvs");
    }
    assert_eq!(Algorithm::Pairwise.rounds(5), Some(4));
}

#[tokio::test]
async fn test_pairwise_single_rank_makes_no_channel_calls() {
    let (comms, counters) = counting_group(1);
    run_on(comms, |comm| async move {
        let send: Vec<u8> = vec![7, 8, 9, 10];
        let mut recv: Vec<u8> = vec![0; 4];
        comm.all_to_all(&send, &mut recv, 2, 2, Algorithm::Pairwise)
            .await
            .unwrap();
        assert_eq!(recv, send);
    })
    .await;

    assert_eq!(counters[0].sends.load(Ordering::SeqCst), 0);
    assert_eq!(counters[0].recvs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pairwise_does_not_touch_send_buffer() {
    run_collective(3, |comm| async move {
        let rank = comm.rank() as usize;
        let send = send_buffer(rank, 3, 4);
        let before = send.clone();
        let mut recv = vec![0u32; 12];
        comm.all_to_all_typed(&send, &mut recv, 4, Algorithm::Pairwise)
            .await
            .unwrap();
        assert_eq!(send, before);
    })
    .await;
}
