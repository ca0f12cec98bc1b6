use alltoall::{Algorithm, ExchangeError};

use super::helpers::run_collective;

#[tokio::test]
async fn test_typed_f64() {
    run_collective(4, |comm| async move {
        let rank = comm.rank() as f64;
        let send: Vec<f64> = (0..8).map(|i| rank * 100.0 + i as f64).collect();
        let mut recv = vec![0.0f64; 8];

        comm.all_to_all_typed(&send, &mut recv, 2, Algorithm::Bruck)
            .await
            .unwrap();

        // Rank s sent cell r = entries [2r, 2r+1] of its buffer.
        let r = comm.rank() as f64;
        let expected: Vec<f64> = (0..4)
            .flat_map(|s| {
                let s = s as f64;
                [s * 100.0 + 2.0 * r, s * 100.0 + 2.0 * r + 1.0]
            })
            .collect();
        assert_eq!(recv, expected);
    })
    .await;
}

#[tokio::test]
async fn test_typed_length_mismatch() {
    run_collective(2, |comm| async move {
        let send = vec![0u16; 3];
        let mut recv = vec![0u16; 4];
        let err = comm
            .all_to_all_typed(&send, &mut recv, 2, Algorithm::Pairwise)
            .await
            .unwrap_err();
        match err {
            ExchangeError::BufferSizeMismatch {
                buffer,
                expected,
                actual,
            } => {
                assert_eq!(buffer, "send");
                assert_eq!(expected, 8);
                assert_eq!(actual, 6);
            }
            other => panic!("unexpected: {other:?}"),
        }
    })
    .await;
}
