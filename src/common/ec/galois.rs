// Galois field GF(256)
//------------------------------------------------------------------------------

/// Log and antilog tables over GF(2^8) with the primitive polynomial x^8+x^4+x^3+x^2+1.
#[derive(Debug, Clone)]
pub struct Gf256 {
    exp: [u8; 256],
    log: [u8; 256],
}

impl Default for Gf256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Gf256 {
    pub fn new() -> Self {
        let mut exp = [0; 256];
        let mut log = [0; 256];
        let mut x: u16 = 1;
        for (i, e) in exp.iter_mut().enumerate().take(255) {
            *e = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIMITIVE_POLY;
            }
        }
        exp[255] = exp[0];
        Self { exp, log }
    }

    /// Antilog, alpha^e
    pub fn exp(&self, e: usize) -> u8 {
        self.exp[e % 255]
    }

    /// Discrete log, undefined for zero
    pub fn log(&self, x: u8) -> Option<u8> {
        if x == 0 {
            None
        } else {
            Some(self.log[x as usize])
        }
    }

    pub fn add(a: u8, b: u8) -> u8 {
        a ^ b
    }

    pub fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let s = self.log[a as usize] as usize + self.log[b as usize] as usize;
        self.exp(s)
    }
}


// Global constants
//------------------------------------------------------------------------------

static PRIMITIVE_POLY: u16 = 0x11D;
