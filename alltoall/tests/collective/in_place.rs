use alltoall::Algorithm;

use super::helpers::{expected_recv, run_collective, send_buffer};

#[tokio::test]
async fn test_in_place_pairwise() {
    run_collective(5, |comm| async move {
        let rank = comm.rank() as usize;
        let mut buf = send_buffer(rank, 5, 2);
        comm.all_to_all_typed_in_place(&mut buf, 2, Algorithm::Pairwise)
            .await
            .unwrap();
        assert_eq!(buf, expected_recv(rank, 5, 2), "rank {rank}");
    })
    .await;
}

#[tokio::test]
async fn test_in_place_bruck() {
    run_collective(8, |comm| async move {
        let rank = comm.rank() as usize;
        let mut buf = send_buffer(rank, 8, 3);
        comm.all_to_all_typed_in_place(&mut buf, 3, Algorithm::Bruck)
            .await
            .unwrap();
        assert_eq!(buf, expected_recv(rank, 8, 3), "rank {rank}");
    })
    .await;
}

#[tokio::test]
async fn test_in_place_matches_separate_buffers() {
    run_collective(4, |comm| async move {
        let rank = comm.rank() as usize;
        let send = send_buffer(rank, 4, 1);

        let mut separate = vec![0u32; 4];
        comm.all_to_all_typed(&send, &mut separate, 1, Algorithm::Bruck)
            .await
            .unwrap();

        let mut shared = send.clone();
        comm.all_to_all_typed_in_place(&mut shared, 1, Algorithm::Pairwise)
            .await
            .unwrap();

        assert_eq!(separate, shared);
    })
    .await;
}
