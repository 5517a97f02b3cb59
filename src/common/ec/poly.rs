use tracing::error;

use super::galois::Gf256;
use crate::common::error::{QRError, QRResult};

// Polynomial over GF(256)
//------------------------------------------------------------------------------

/// How the stored coefficients are interpreted.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Notation {
    /// Coefficients are discrete logs of field elements
    Exponent,
    /// Coefficients are field elements
    Value,
}

/// Coefficients are stored in ascending powers, `coeffs[i]` belongs to `x^i`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Polynomial {
    coeffs: Vec<u8>,
    notation: Notation,
}

impl Polynomial {
    pub fn new(coeffs: Vec<u8>, notation: Notation) -> Self {
        Self { coeffs, notation }
    }

    /// Message polynomial of a data block, first byte being the highest power.
    pub fn from_block(block: &[u8]) -> Self {
        Self { coeffs: block.iter().rev().copied().collect(), notation: Notation::Value }
    }

    #[cfg(test)]
    pub fn coeffs(&self) -> &[u8] {
        &self.coeffs
    }

    #[cfg(test)]
    pub fn notation(&self) -> Notation {
        self.notation
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn lead(&self) -> Option<u8> {
        self.coeffs.last().copied()
    }

    pub fn drop_lead(&mut self) {
        self.coeffs.pop();
    }

    pub fn to_value(&self, gf: &Gf256) -> Self {
        match self.notation {
            Notation::Value => self.clone(),
            Notation::Exponent => Self {
                coeffs: self.coeffs.iter().map(|e| gf.exp(*e as usize)).collect(),
                notation: Notation::Value,
            },
        }
    }

    #[cfg(test)]
    pub fn to_exponent(&self, gf: &Gf256) -> QRResult<Self> {
        match self.notation {
            Notation::Exponent => Ok(self.clone()),
            Notation::Value => {
                let coeffs = self
                    .coeffs
                    .iter()
                    .map(|v| gf.log(*v).ok_or_else(zero_coefficient))
                    .collect::<QRResult<Vec<_>>>()?;
                Ok(Self { coeffs, notation: Notation::Exponent })
            }
        }
    }

    /// Multiplies every term by alpha^e. Exponent notation only.
    pub fn scale(&self, e: u8) -> Self {
        debug_assert!(self.notation == Notation::Exponent, "Scaling needs exponent notation");

        let coeffs = self.coeffs.iter().map(|c| ((*c as usize + e as usize) % 255) as u8).collect();
        Self { coeffs, notation: Notation::Exponent }
    }

    /// Product of two polynomials in exponent notation. Coinciding powers are summed in value
    /// form and converted back, so a sum cancelling to zero cannot be stored.
    pub fn mul(&self, other: &Self, gf: &Gf256) -> QRResult<Self> {
        debug_assert!(
            self.notation == Notation::Exponent && other.notation == Notation::Exponent,
            "Multiplication needs exponent notation"
        );

        if self.is_empty() || other.is_empty() {
            return Ok(Self::new(Vec::new(), Notation::Exponent));
        }

        let mut sums = vec![0u8; self.len() + other.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                sums[i + j] ^= gf.exp(*a as usize + *b as usize);
            }
        }
        let coeffs = sums
            .into_iter()
            .map(|v| gf.log(v).ok_or_else(zero_coefficient))
            .collect::<QRResult<Vec<_>>>()?;
        Ok(Self { coeffs, notation: Notation::Exponent })
    }

    /// Adds two value polynomials with their leading terms aligned. The shorter operand is
    /// padded with zeros at its low end.
    pub fn xor(&self, other: &Self) -> Self {
        debug_assert!(
            self.notation == Notation::Value && other.notation == Notation::Value,
            "Addition needs value notation"
        );

        let (long, short) = if self.len() >= other.len() { (self, other) } else { (other, self) };
        let off = long.len() - short.len();
        let mut coeffs = long.coeffs.clone();
        for (c, s) in coeffs[off..].iter_mut().zip(short.coeffs.iter()) {
            *c ^= s;
        }
        Self { coeffs, notation: Notation::Value }
    }

    /// Remainder of dividing this value polynomial by `divisor` in exponent notation, as
    /// `ecc_len` bytes from the highest power down.
    ///
    /// Runs one step per message coefficient. A zero lead is dropped, otherwise the divisor is
    /// scaled to the lead, added and the cancelled lead dropped. Low order terms implied by the
    /// lead alignment are zero, so the remainder is zero padded at its end.
    pub fn remainder(&self, divisor: &Self, ecc_len: usize, gf: &Gf256) -> QRResult<Vec<u8>> {
        debug_assert!(self.notation == Notation::Value, "Dividend needs value notation");
        debug_assert!(divisor.notation == Notation::Exponent, "Divisor needs exponent notation");

        let mut rem = self.clone();
        for _ in 0..self.len() {
            let Some(lead) = rem.lead() else { break };
            if let Some(e) = gf.log(lead) {
                rem = rem.xor(&divisor.scale(e).to_value(gf));
                if rem.lead() != Some(0) {
                    error!(lead = ?rem.lead(), "Lead term survived division step");
                    return Err(QRError::InvariantViolation("lead term not cancelled"));
                }
            }
            rem.drop_lead();
        }

        if rem.len() > ecc_len {
            error!(len = rem.len(), ecc_len, "Remainder longer than ecc length");
            return Err(QRError::InvariantViolation("remainder longer than ecc length"));
        }
        let mut res: Vec<u8> = rem.coeffs.into_iter().rev().collect();
        res.resize(ecc_len, 0);
        Ok(res)
    }
}

fn zero_coefficient() -> QRError {
    error!("Zero coefficient has no exponent form");
    QRError::InvariantViolation("zero coefficient in exponent notation")
}

#[cfg(test)]
mod poly_tests {
    use super::{Notation, Polynomial};
    use crate::common::ec::galois::Gf256;
    use crate::common::error::QRError;

    #[test]
    fn test_from_block() {
        let p = Polynomial::from_block(&[1, 2, 3]);
        assert_eq!(p.coeffs(), &[3, 2, 1]);
        assert_eq!(p.degree(), 2);
        assert_eq!(p.lead(), Some(1));
    }

    #[test]
    fn test_notation_conversion() {
        let gf = Gf256::new();
        let p = Polynomial::new(vec![0, 1, 8], Notation::Exponent);
        let v = p.to_value(&gf);
        assert_eq!(v.coeffs(), &[1, 2, 0x1D]);
        assert_eq!(v.notation(), Notation::Value);
        assert_eq!(v.to_exponent(&gf).unwrap(), p);
    }

    #[test]
    fn test_zero_has_no_exponent() {
        let gf = Gf256::new();
        let p = Polynomial::new(vec![3, 0], Notation::Value);
        assert!(matches!(p.to_exponent(&gf), Err(QRError::InvariantViolation(_))));
    }

    #[test]
    fn test_mul() {
        let gf = Gf256::new();
        // (x + 1)(x + 2) = x^2 + 3x + 2
        let a = Polynomial::new(vec![0, 0], Notation::Exponent);
        let b = Polynomial::new(vec![1, 0], Notation::Exponent);
        let p = a.mul(&b, &gf).unwrap().to_value(&gf);
        assert_eq!(p.coeffs(), &[2, 3, 1]);
    }

    #[test]
    fn test_mul_cancellation() {
        let gf = Gf256::new();
        // (x + 1)(x + 1) = x^2 + 1, middle term cancels
        let a = Polynomial::new(vec![0, 0], Notation::Exponent);
        assert!(matches!(a.mul(&a, &gf), Err(QRError::InvariantViolation(_))));
    }

    #[test]
    fn test_xor_aligns_leads() {
        let a = Polynomial::new(vec![1, 2, 3, 4], Notation::Value);
        let b = Polynomial::new(vec![1, 1], Notation::Value);
        assert_eq!(a.xor(&b).coeffs(), &[1, 2, 2, 5]);
        assert_eq!(b.xor(&a).coeffs(), &[1, 2, 2, 5]);
    }

    #[test]
    fn test_scale() {
        let p = Polynomial::new(vec![0, 200, 254], Notation::Exponent);
        assert_eq!(p.scale(60).coeffs(), &[60, 5, 59]);
    }

    #[test]
    fn test_remainder_of_zero_message() {
        let gf = Gf256::new();
        let gen = Polynomial::new(vec![1, 25, 0], Notation::Exponent);
        let msg = Polynomial::from_block(&[0, 0, 0]);
        assert_eq!(msg.remainder(&gen, 2, &gf).unwrap(), vec![0, 0]);
    }
}
