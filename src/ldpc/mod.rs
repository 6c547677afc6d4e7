//! LDPC (Low-Density Parity Check) Error Correction for FT8
//!
//! This module implements the LDPC(174,91) encoding and decoding used in FT8.
//!
//! **Encoding**: Takes a 91-bit message (77 information bits + 14 CRC bits) and
//! produces a 174-bit codeword by adding 83 parity bits.
//!
//! **Decoding**: Uses belief propagation (sum-product algorithm) to decode
//! received codewords with soft information (LLRs) back to the original message.
//!
//! The encoding uses a generator matrix to compute parity bits through
//! matrix multiplication in GF(2) (binary field).

mod constants;
mod encode;
mod decode;
mod osd;

use bitvec::prelude::*;
use bitvec::vec::BitVec;

pub use constants::{N, K, M};
pub use encode::encode;
pub use decode::{decode, decode_with_snapshots};
pub use osd::osd_decode;

/// Iterations (after the first) at which BP LLR state is snapshotted for OSD fallback.
const SNAPSHOT_ITERS: [usize; 3] = [1, 2, 3];

/// Maximum BP iterations before falling back to OSD.
const MAX_BP_ITERATIONS: usize = 200;

/// Maximum OSD search order (number of simultaneous bit flips tried).
const MAX_OSD_ORDER: usize = 2;

/// Decode a 174-bit codeword using WSJT-X's hybrid strategy: belief propagation
/// first, then ordered-statistics decoding over LLR snapshots taken during BP
/// if BP itself fails to converge on a CRC-valid codeword.
///
/// Returns the decoded 91-bit message (77 info + 14 CRC bits) and the number
/// of BP iterations run before success (or before the OSD fallback kicked in).
pub fn decode_hybrid(llr: &[f32]) -> Option<(BitVec<u8, Msb0>, usize)> {
    match decode::decode_with_snapshots(llr, MAX_BP_ITERATIONS, &SNAPSHOT_ITERS) {
        Ok((message, iters, _nharderrors, _snapshots)) => Some((message, iters)),
        Err(snapshots) => {
            for snapshot in snapshots.iter().rev() {
                if let Some(message) = osd::osd_decode(snapshot, MAX_OSD_ORDER) {
                    return Some((message, MAX_BP_ITERATIONS));
                }
            }
            None
        }
    }
}
