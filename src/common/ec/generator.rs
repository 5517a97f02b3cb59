use super::galois::Gf256;
use super::poly::{Notation, Polynomial};
use crate::common::error::QRResult;

/// Generator polynomial for `ecc_len` codewords, the product of `(x + alpha^i)` for
/// `i` in `0..ecc_len`, in exponent notation.
pub fn generator_polynomial(ecc_len: usize, gf: &Gf256) -> QRResult<Polynomial> {
    debug_assert!(ecc_len > 0, "Generator needs at least one factor");

    let mut gen = Polynomial::new(vec![0, 0], Notation::Exponent);
    for i in 1..ecc_len {
        let factor = Polynomial::new(vec![i as u8, 0], Notation::Exponent);
        gen = gen.mul(&factor, gf)?;
    }
    Ok(gen)
}
