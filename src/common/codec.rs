use tracing::{debug, error};

use super::bitstream::BitStream;
use super::error::{QRError, QRResult};
use super::metadata::Metadata;
use super::tables::MODE_INDICATOR_BITS;

// Segment
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment<'a> {
    len_bits: usize, // Bit len of char count
    data: &'a [u8],  // Reference to raw data
}

impl<'a> Segment<'a> {
    pub fn new(len_bits: usize, data: &'a [u8]) -> Self {
        Self { len_bits, data }
    }

    pub fn bit_len(&self) -> usize {
        MODE_INDICATOR_BITS + self.len_bits + (self.data.len() << 3)
    }
}

// Encoder
//------------------------------------------------------------------------------

/// Assembles the data codewords for `data`: mode indicator, character count, payload bytes,
/// terminator and padding, totalling exactly `meta.required_bits`.
pub fn encode_payload(data: &[u8], meta: &Metadata) -> QRResult<BitStream> {
    if data.len() > meta.capacity {
        return Err(QRError::DataTooLong);
    }

    let seg = Segment::new(meta.cci_bits, data);
    debug!(bits = seg.bit_len(), required = meta.required_bits, "Encoding byte segment");

    let mut out = BitStream::new(meta.required_bits);
    push_segment(&seg, &mut out);
    pad_to_required(&mut out, meta.required_bits)?;
    Ok(out)
}

fn push_segment(seg: &Segment, out: &mut BitStream) {
    out.push_bits(BYTE_MODE_INDICATOR, MODE_INDICATOR_BITS);
    let char_cnt = seg.data.len();
    debug_assert!(
        char_cnt < (1 << seg.len_bits),
        "Char count exceeds bit length: Char count {char_cnt}, Char count bits {}",
        seg.len_bits
    );
    out.push_bits(char_cnt as u16, seg.len_bits);
    out.extend(seg.data);
}

/// Writes the terminator, aligns to a byte and fills with alternating pad codewords.
///
/// The terminator is at most 4 zero bits. Alignment bits are physical only, so a stream still
/// short and off a byte boundary afterwards cannot be padded.
fn pad_to_required(out: &mut BitStream, required: usize) -> QRResult<()> {
    if out.len() > required {
        error!(len = out.len(), required, "Stream overran its capacity");
        return Err(QRError::InvariantViolation("bit stream longer than capacity"));
    }

    let missing = required - out.len();
    if missing > 0 {
        out.push_bits(0u8, missing.min(4));
        out.flush();
    }

    if out.len() < required {
        if !out.is_byte_aligned() {
            error!(len = out.len(), required, "Stream not byte aligned before padding");
            return Err(QRError::InvariantViolation("bit stream not byte aligned before padding"));
        }
        let pad_cnt = (required - out.len()) >> 3;
        PADDING_CODEWORDS.iter().cycle().take(pad_cnt).for_each(|pc| out.push_bits(*pc, 8));
    }

    if out.len() != required {
        error!(len = out.len(), required, "Stream length mismatch after padding");
        return Err(QRError::InvariantViolation("bit stream length mismatch after padding"));
    }
    Ok(())
}


// Global constants
//------------------------------------------------------------------------------

static BYTE_MODE_INDICATOR: u8 = 0b0100;

pub static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];
