use alltoall::{Algorithm, Communicator, ExchangeConfig};

use super::helpers::{run_collective, run_on, send_buffer};

/// Byte-level checksum of every cell, order-independent.
fn multiset(cells: &[Vec<u32>], entries: usize) -> Vec<Vec<u32>> {
    let mut all: Vec<Vec<u32>> = cells
        .iter()
        .flat_map(|buf| buf.chunks(entries).map(|c| c.to_vec()))
        .collect();
    all.sort();
    all
}

#[tokio::test]
async fn test_pairwise_and_bruck_agree() {
    for world in [2u32, 4, 8] {
        let results = run_collective(world, move |comm| async move {
            let rank = comm.rank() as usize;
            let w = world as usize;
            // Irregular payload so misplaced bytes would show.
            let send: Vec<u8> = (0..w * 6)
                .map(|i| (i * 31 + rank * 7) as u8)
                .collect();

            let mut via_pairwise = vec![0u8; send.len()];
            comm.all_to_all(&send, &mut via_pairwise, 3, 2, Algorithm::Pairwise)
                .await
                .unwrap();

            let mut via_bruck = vec![0u8; send.len()];
            comm.all_to_all(&send, &mut via_bruck, 3, 2, Algorithm::Bruck)
                .await
                .unwrap();

            (via_pairwise, via_bruck)
        })
        .await;

        for (rank, (pairwise, bruck)) in results.into_iter().enumerate() {
            assert_eq!(pairwise, bruck, "world {world} rank {rank}");
        }
    }
}

#[tokio::test]
async fn test_cells_are_conserved_across_ranks() {
    for algorithm in [Algorithm::Pairwise, Algorithm::Bruck] {
        let world = 8usize;
        let before: Vec<Vec<u32>> = (0..world).map(|r| send_buffer(r, world, 2)).collect();

        let after = run_collective(world as u32, move |comm| async move {
            let rank = comm.rank() as usize;
            let send = send_buffer(rank, world, 2);
            let mut recv = vec![0u32; world * 2];
            comm.all_to_all_typed(&send, &mut recv, 2, algorithm)
                .await
                .unwrap();
            recv
        })
        .await;

        assert_eq!(
            multiset(&before, 2),
            multiset(&after, 2),
            "{algorithm} created, lost or duplicated a cell"
        );
    }
}

#[tokio::test]
async fn test_auto_picks_a_working_algorithm() {
    for world in [3u32, 4] {
        let results = run_collective(world, move |comm| async move {
            let rank = comm.rank() as usize;
            let w = world as usize;
            let send = send_buffer(rank, w, 2);
            let mut recv = vec![0u32; 2 * w];
            comm.all_to_all_typed(&send, &mut recv, 2, Algorithm::Auto)
                .await
                .unwrap();
            recv
        })
        .await;
        for (rank, recv) in results.iter().enumerate() {
            assert_eq!(*recv, super::helpers::expected_recv(rank, world as usize, 2));
        }
    }
}

#[tokio::test]
async fn test_auto_respects_cell_threshold() {
    // A threshold of zero bytes forces pairwise even on a power-of-two world.
    let config = ExchangeConfig {
        bruck_max_cell_bytes: 0,
        ..ExchangeConfig::default()
    };
    let comms = Communicator::bootstrap_memory(4, config).unwrap();
    run_on(comms, |comm| async move {
        let rank = comm.rank() as usize;
        let send = send_buffer(rank, 4, 1);
        let mut recv = vec![0u32; 4];
        comm.all_to_all_typed(&send, &mut recv, 1, Algorithm::Auto)
            .await
            .unwrap();
        assert_eq!(recv, super::helpers::expected_recv(rank, 4, 1));
    })
    .await;
    assert_eq!(Algorithm::Auto.resolve(4, 4, 0), Algorithm::Pairwise);
}
