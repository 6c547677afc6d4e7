//! FT8 Symbol Mapping and Demapping
//!
//! This module handles the conversion between LDPC codewords (174 bits) and
//! FT8 symbol arrays (79 symbols using 8-FSK modulation).
//!
//! **Symbol Structure**: S7 D29 S7 D29 S7
//! - 3 sync sections of 7 symbols each (Costas arrays) = 21 sync symbols
//! - 2 data sections of 29 symbols each = 58 data symbols
//! - Total: 79 symbols
//!
//! **Mapping**: Each 3 bits from the 174-bit codeword map to one data symbol
//! using Gray coding to minimize bit errors between adjacent tones (0-7).


/// Number of data symbols (174 bits / 3 bits per symbol)
pub const ND: usize = 58;

/// Number of sync symbols (3 Costas arrays × 7 symbols each)
pub const NS: usize = 21;

/// Total number of symbols in FT8 transmission
pub const NN: usize = 79;

/// Costas 7×7 sync pattern
/// Used three times in the FT8 symbol sequence for time and frequency synchronization
const COSTAS: [u8; 7] = [3, 1, 4, 0, 6, 5, 2];

/// Gray code mapping for 3-bit values to tones (0-7)
/// This mapping minimizes bit errors between adjacent tones in 8-FSK modulation
const GRAY_MAP: [u8; 8] = [0, 1, 3, 2, 5, 6, 4, 7];

/// Inverse Gray code mapping (tone to 3-bit value)
/// Used for demapping received symbols back to bits
const GRAY_MAP_INV: [u8; 8] = [0, 1, 3, 2, 6, 4, 5, 7];

/// Map a 174-bit LDPC codeword to 79 FT8 symbols
///
/// Converts the codeword into 58 data symbols using Gray coding and inserts
/// 21 sync symbols (Costas arrays) at the proper positions.
///
/// # Structure
/// The resulting 79-symbol array follows the pattern: S7 D29 S7 D29 S7
/// - Positions 0-6: First Costas sync (7 symbols)
/// - Positions 7-35: First data block (29 symbols)
/// - Positions 36-42: Second Costas sync (7 symbols)
/// - Positions 43-71: Second data block (29 symbols)
/// - Positions 72-78: Third Costas sync (7 symbols)
///
/// # Arguments
/// * `codeword` - 174-bit LDPC codeword (bit slice)
/// * `symbols` - Output array for 79 symbols (tones 0-7)
///
/// # Example
/// ```
/// use bitvec::prelude::*;
/// use rustyft8::symbol;
///
/// let mut codeword_storage = [0u8; 22];
/// let codeword = &codeword_storage.view_bits::<Msb0>()[..174];
/// // ... fill codeword with LDPC encoded data ...
///
/// let mut symbols = [0u8; 79];
/// symbol::map(codeword, &mut symbols)?;
/// # Ok::<(), String>(())
/// ```
pub fn map(codeword: &bitvec::slice::BitSlice<u8, bitvec::order::Msb0>, symbols: &mut [u8; NN]) -> Result<(), String> {
    if codeword.len() != 174 {
        return Err(format!("Codeword must be exactly 174 bits, got {}", codeword.len()));
    }

    // Insert sync patterns at positions: 0-6, 36-42, 72-78
    symbols[0..7].copy_from_slice(&COSTAS);
    symbols[36..43].copy_from_slice(&COSTAS);
    symbols[72..79].copy_from_slice(&COSTAS);

    // Map data symbols
    // Structure: positions 7-35 (29 symbols), 43-71 (29 symbols)
    let mut k = 7; // Start after first sync

    for j in 0..ND {
        let i = 3 * j; // Bit position in codeword (0, 3, 6, ...)

        // After 29 data symbols, skip over middle sync (k jumps from 35 to 43)
        if j == 29 {
            k += 7;
        }

        // Extract 3 bits and convert to tone using Gray mapping
        let bit0 = codeword[i] as u8;
        let bit1 = codeword[i + 1] as u8;
        let bit2 = codeword[i + 2] as u8;
        let indx = (bit0 << 2) | (bit1 << 1) | bit2;

        symbols[k] = GRAY_MAP[indx as usize];
        k += 1;
    }

    Ok(())
}

/// Demap 79 FT8 symbols back to a 174-bit codeword
///
/// Extracts the 58 data symbols from the received symbol array, ignoring
/// the sync symbols, and converts them back to 174 bits using inverse Gray coding.
///
/// # Arguments
/// * `symbols` - Array of 79 received symbols (tones 0-7)
/// * `codeword` - Output buffer for 174-bit codeword
///
/// # Example
/// ```
/// use bitvec::prelude::*;
/// use rustyft8::symbol;
///
/// let symbols = [0u8; 79]; // Received symbols
/// let mut codeword_storage = [0u8; 22];
/// let codeword = &mut codeword_storage.view_bits_mut::<Msb0>()[..174];
/// symbol::demap(&symbols, codeword)?;
/// # Ok::<(), String>(())
/// ```
pub fn demap(symbols: &[u8; NN], codeword: &mut bitvec::slice::BitSlice<u8, bitvec::order::Msb0>) -> Result<(), String> {
    if codeword.len() != 174 {
        return Err(format!("Codeword must be exactly 174 bits, got {}", codeword.len()));
    }

    // Extract data symbols from positions: 7-35 (29 symbols), 43-71 (29 symbols)
    let mut k = 7; // Start after first sync

    for j in 0..ND {
        let i = 3 * j; // Bit position in codeword

        // After 29 data symbols, skip over middle sync
        if j == 29 {
            k += 7;
        }

        // Convert tone back to 3 bits using inverse Gray mapping
        let tone = symbols[k];
        let indx = GRAY_MAP_INV[tone as usize];

        codeword.set(i, (indx & 0b100) != 0);
        codeword.set(i + 1, (indx & 0b010) != 0);
        codeword.set(i + 2, (indx & 0b001) != 0);

        k += 1;
    }

    Ok(())
}
