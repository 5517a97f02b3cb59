use num_traits::PrimInt;

/// Append-only bit vector packed MSB first.
///
/// The logical length counts bits that belong to the stream. Bits written by [`BitStream::flush`]
/// to reach a byte boundary occupy physical space but are not counted.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BitStream {
    data: Vec<u8>,
    // Logical bit length
    len: usize,
    // Physical bit length
    phys_len: usize,
    // Max bit capacity
    capacity: usize,
}

// Writing
//------------------------------------------------------------------------------

impl BitStream {
    pub fn new(capacity: usize) -> Self {
        Self { data: Vec::with_capacity((capacity + 7) >> 3), len: 0, phys_len: 0, capacity }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn physical_len(&self) -> usize {
        self.phys_len
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.len & 7 == 0
    }

    pub fn push(&mut self, bit: bool) {
        debug_assert!(
            self.phys_len < self.capacity,
            "Insufficient capacity: Capacity {}, Size {}",
            self.capacity,
            self.phys_len + 1
        );

        let offset = self.phys_len & 7;
        if offset == 0 {
            self.data.push(0);
        }
        if bit {
            let pos = self.phys_len >> 3;
            self.data[pos] |= 0b10000000 >> offset;
        }

        self.phys_len += 1;
        self.len += 1;
    }

    /// Appends the low `size` bits of `bits`, most significant first.
    pub fn push_bits<T: PrimInt>(&mut self, bits: T, size: usize) {
        let bit_width = T::zero().count_zeros() as usize;
        debug_assert!(size <= bit_width, "Bit count {size} exceeds type width {bit_width}");
        debug_assert!(
            size >= bit_width - bits.leading_zeros() as usize,
            "Bit count shouldn't exceed bit length: Length {size}, Bits {}",
            bits.to_u64().unwrap_or_default()
        );

        for i in (0..size).rev() {
            self.push((bits >> i) & T::one() == T::one());
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.push_bits(*b, 8);
        }
    }

    /// Pads the physical length to the next byte boundary with zeros. The logical length is
    /// unchanged.
    pub fn flush(&mut self) {
        self.phys_len = (self.phys_len + 7) & !7;
    }
}

// Reading
//------------------------------------------------------------------------------

impl BitStream {
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.phys_len, "Index {i} out of bounds {}", self.phys_len);

        (self.data[i >> 3] >> (7 - (i & 7))) & 1 == 1
    }

    pub fn set(&mut self, i: usize, bit: bool) {
        debug_assert!(i < self.phys_len, "Index {i} out of bounds {}", self.phys_len);

        let mask = 0b10000000 >> (i & 7);
        if bit {
            self.data[i >> 3] |= mask;
        } else {
            self.data[i >> 3] &= !mask;
        }
    }

    pub fn iter(&self) -> BitStreamIter<'_> {
        BitStreamIter { stream: self, cursor: 0 }
    }
}

pub struct BitStreamIter<'a> {
    stream: &'a BitStream,
    cursor: usize,
}

impl Iterator for BitStreamIter<'_> {
    type Item = bool;
    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.stream.len {
            return None;
        }
        let bit = self.stream.get(self.cursor);
        self.cursor += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.stream.len.saturating_sub(self.cursor);
        (rem, Some(rem))
    }
}

impl ExactSizeIterator for BitStreamIter<'_> {}

impl<'a> IntoIterator for &'a BitStream {
    type Item = bool;
    type IntoIter = BitStreamIter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
