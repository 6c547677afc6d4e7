/// Grid square (Maidenhead locator) and signal report encoding/decoding functions
/// 
/// Implements WSJT-X grid square and signal report encoding into 15-bit integers.

use alloc::vec::Vec;
use alloc::format;
use alloc::string::{String, ToString};

/// Maximum grid square value (18*18*10*10 = 32400)
/// Values above this are signal reports and special codes
const MAXGRID4: u16 = 32400;

/// Special code offsets (added to MAXGRID4)
const BLANK_CODE: u16 = 1;   // Empty string (2-word message)
const RRR_CODE: u16 = 2;     // "RRR" acknowledgment
const RR73_CODE: u16 = 3;    // "RR73" acknowledgment (special, handled as grid)
const CODE_73: u16 = 4;      // "73" sign-off

/// Encode a grid square or signal report to 15 bits
/// 
/// Handles:
/// - Grid squares: "DM42", "FN31", etc. (encoded as 0-32399)
/// - Signal reports: "+10", "-15", "R+10", "R-15" (encoded as MAXGRID4 + offset)
/// - Special codes: "RRR", "RR73", "73" (encoded as MAXGRID4 + 1, 2, or 3)
///
/// From WSJT-X packjt77.f90:
/// ```fortran
/// ! For grid squares:
/// j1=(ichar(grid4(1:1))-ichar('A'))*18*10*10
/// j2=(ichar(grid4(2:2))-ichar('A'))*10*10
/// j3=(ichar(grid4(3:3))-ichar('0'))*10
/// j4=(ichar(grid4(4:4))-ichar('0'))
/// igrid4=j1+j2+j3+j4
/// 
/// ! For signal reports:
/// if(irpt.ge.-50 .and. irpt.le.-31) irpt=irpt+101
/// irpt=irpt+35
/// igrid4=MAXGRID4 + irpt
/// ```
pub fn encode_grid(grid_or_report: &str) -> Result<u16, String> {
    let trimmed = grid_or_report.trim();
    
    // Handle BLANK (empty string means 2-word message like "CALL1 CALL2")
    if trimmed.is_empty() {
        return Ok(MAXGRID4 + BLANK_CODE);
    }
    
    // Check for signal report (starts with + or -)
    if trimmed.starts_with('+') || trimmed.starts_with('-') {
        return encode_signal_report(trimmed);
    }
    
    // Try to encode as a grid square first (4 characters)
    if trimmed.len() == 4 {
        // Check if it could be a valid grid square
        let chars: Vec<char> = trimmed.chars().collect();
        if chars[0].is_ascii_alphabetic() && chars[1].is_ascii_alphabetic() &&
           chars[2].is_ascii_digit() && chars[3].is_ascii_digit() {
            // It's a valid grid square format (including "RR73", "AA00", etc.)
            return encode_grid_square(trimmed);
        }
    }
    
    // Check for special codes (only if not a valid grid square)
    match trimmed {
        "RRR" => return Ok(MAXGRID4 + RRR_CODE),
        "73" => return Ok(MAXGRID4 + CODE_73),
        _ => {}
    }
    
    // If we get here, it's an unrecognized format
    Err(format!("Invalid grid/report format: '{}' (expected: grid AA00-RR99, signal report +/-NN, or special code RRR/73)", trimmed))
}

/// Encode a grid square (internal helper)
fn encode_grid_square(grid: &str) -> Result<u16, String> {
    // Convert to uppercase for case-insensitive matching
    let grid_upper = grid.to_uppercase();
    let chars: Vec<char> = grid_upper.chars().collect();

    if chars.len() != 4 {
        return Err(format!("Grid must be 4 characters (format: AA00-RR99): '{}'", grid));
    }

    // Convert letters A-R to 0-17
    let c1 = (chars[0] as u32 - 'A' as u32) as u16;
    let c2 = (chars[1] as u32 - 'A' as u32) as u16;
    
    // Convert digits to 0-9
    let c3 = chars[2].to_digit(10).ok_or_else(|| format!("Invalid digit in grid: '{}'", chars[2]))? as u16;
    let c4 = chars[3].to_digit(10).ok_or_else(|| format!("Invalid digit in grid: '{}'", chars[3]))? as u16;
    
    // Validate ranges
    if c1 > 17 || c2 > 17 {
        return Err(format!("Grid letters must be A-R: '{}' (got '{}{}', valid range: AA-RR)", grid, chars[0], chars[1]));
    }
    
    // Encode using WSJT-X formula
    let j1 = c1 * 18 * 10 * 10;
    let j2 = c2 * 10 * 10;
    let j3 = c3 * 10;
    let j4 = c4;
    let igrid4 = j1 + j2 + j3 + j4;
    
    Ok(igrid4)
}

/// Encode a signal report to 15 bits (internal helper)
fn encode_signal_report(report: &str) -> Result<u16, String> {
    // Parse the signal report value
    let report_str = if report.starts_with('R') {
        &report[1..]  // Strip R prefix
    } else {
        report
    };
    
    let irpt: i16 = report_str.parse()
        .map_err(|_| format!("Invalid signal report: '{}'", report))?;
    
    // Validate range: -50 to +49 normally, but -31 to -50 get special handling
    if irpt < -50 || irpt > 49 {
        return Err(format!("Signal report out of range (-50 to +49): {}", irpt));
    }
    
    // Apply WSJT-X encoding formula
    let mut encoded_irpt = irpt;
    if encoded_irpt >= -50 && encoded_irpt <= -31 {
        encoded_irpt += 101;
    }
    encoded_irpt += 35;
    
    let igrid4 = MAXGRID4 + (encoded_irpt as u16);
    Ok(igrid4)
}

/// Decode a 15-bit grid value back to a grid square or signal report string
/// 
/// Reverses the encoding process to reconstruct the original value.
/// 
/// From WSJT-X unpackjt77.f90:
/// ```fortran
/// if(igrid4.le.MAXGRID4) then
///   call to_grid4(igrid4,grid4,ok)
/// else
///   irpt = igrid4 - MAXGRID4
///   ! Decode signal report from irpt
/// endif
/// ```
pub fn decode_grid(igrid4: u16) -> Result<String, String> {
    // Check if it's a grid square or signal report/special code
    if igrid4 <= MAXGRID4 {
        // It's a grid square (note: MAXGRID4 itself would be an invalid grid)
        return decode_grid_square(igrid4);
    }
    
    // It's a signal report or special code
    let irpt = igrid4 - MAXGRID4;

    // Check for special codes
    match irpt {
        BLANK_CODE => Ok(String::new()),
        RRR_CODE => Ok("RRR".to_string()),
        RR73_CODE => Ok("RR73".to_string()),
        CODE_73 => Ok("73".to_string()),
        _ => decode_signal_report(irpt),
    }
}

/// Decode a grid square value (internal helper)
fn decode_grid_square(igrid4: u16) -> Result<String, String> {
    // Reverse the encoding formula
    // igrid4 = c1*1800 + c2*100 + c3*10 + c4
    
    let mut value = igrid4;
    
    // Extract j4 (last digit, 0-9)
    let c4 = (value % 10) as u8;
    value /= 10;
    
    // Extract j3 (third char, digit 0-9)
    let c3 = (value % 10) as u8;
    value /= 10;
    
    // Extract j2 (second letter, A-R)
    let c2 = (value % 18) as u8;
    value /= 18;
    
    // Extract j1 (first letter, A-R)
    let c1 = value as u8;
    
    // Validate ranges
    if c1 > 17 || c2 > 17 || c3 > 9 || c4 > 9 {
        return Err(format!("Invalid grid value: {}", igrid4));
    }
    
    // Convert back to characters
    let ch1 = (b'A' + c1) as char;
    let ch2 = (b'A' + c2) as char;
    let ch3 = (b'0' + c3) as char;
    let ch4 = (b'0' + c4) as char;
    
    Ok(format!("{}{}{}{}", ch1, ch2, ch3, ch4))
}

/// Decode a signal report value (internal helper)
fn decode_signal_report(irpt: u16) -> Result<String, String> {
    // Reverse the encoding: irpt was (report + 35), with special handling for -50 to -31
    let mut report = (irpt as i16) - 35;
    
    // Reverse the special handling for -50 to -31 range
    if report >= 51 && report <= 70 {
        report -= 101;
    }
    
    // Validate range
    if report < -50 || report > 49 {
        return Err(format!("Invalid signal report value: {}", irpt));
    }
    
    // Format with sign and zero-padding to match WSJT-X output
    // WSJT-X always outputs reports with leading zero for single digits: +09, -09, etc.
    if report >= 0 {
        Ok(format!("+{:02}", report))
    } else {
        Ok(format!("-{:02}", -report))
    }
}
