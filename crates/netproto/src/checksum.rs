//! The 16-bit Internet checksum of [RFC 1071].
//!
//! [RFC 1071]: https://www.rfc-editor.org/rfc/rfc1071

/// Incrementally computes the 16-bit one's-complement Internet checksum.
///
/// A new, empty digest can be created with [`ChecksumDigest::new()`]. Byte slices are then added
/// in network byte order, and the final checksum value can be retrieved with
/// [`ChecksumDigest::checksum()`], which is in the host's native endianness.
///
/// # Example
///
/// ```
/// # use netproto::checksum::ChecksumDigest;
/// let checksum = ChecksumDigest::new()
///     .add_slice(&[0x00, 0x01, 0xf2, 0x03])
///     .add_slice(&[0xf4, 0xf5, 0xf6, 0xf7])
///     .checksum();
///
/// assert_eq!(checksum, 0x220d);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumDigest {
    checksum_with_overflow: u32,
}

impl ChecksumDigest {
    /// Creates a new empty digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the data contained in the slice to the checksum computation.
    ///
    /// If the slice is not a multiple of 2-bytes, then it is zero-padded
    /// before being added to the checksum.
    pub fn add_slice(&mut self, data: &[u8]) -> &mut Self {
        let chunks = data.chunks_exact(2);
        let trailing = match chunks.remainder() {
            [last] => u16::from_be_bytes([*last, 0]) as u32,
            _ => 0,
        };

        let sum = chunks.fold(trailing, |sum, pair| {
            Self::fold_checksum(sum + u16::from_be_bytes([pair[0], pair[1]]) as u32)
        });

        self.add_folded(sum)
    }

    // Keeps the running sum folded so that arbitrarily long inputs cannot overflow the u32.
    #[inline]
    fn add_folded(&mut self, value: u32) -> &mut Self {
        self.checksum_with_overflow = Self::fold_checksum(self.checksum_with_overflow) + value;
        self
    }

    #[inline]
    fn fold_checksum(mut checksum: u32) -> u32 {
        // This needs to be done at most twice to fold the overflow into the checksum,
        // since the value is at most 0xffff_ffff -> 0x0001_fffe -> 0x0000_ffff
        for _ in 0..2 {
            checksum = (checksum >> u16::BITS) + (checksum & 0xffff);
        }
        checksum
    }

    /// Returns the computed checksum value.
    pub fn checksum(&self) -> u16 {
        !(Self::fold_checksum(self.checksum_with_overflow) as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_checksum(data: &[u8]) -> u16 {
        let mut cumsum = 0u32;
        let mut i = 0usize;

        let (data, leftover) = if data.len() % 2 == 0 {
            (data, 0u8)
        } else {
            (&data[..data.len() - 1], data[data.len() - 1])
        };

        while i + 1 < data.len() {
            cumsum += ((data[i] as u32) << 8) + (data[i + 1] as u32);
            i += 2;
        }
        cumsum += (leftover as u32) << 8;

        while cumsum > 0xffff {
            cumsum = (cumsum >> 16) + (cumsum & 0xffff);
        }

        !(cumsum as u16)
    }

    #[test]
    fn checksum_with_overflow() {
        let checksum = ChecksumDigest::default()
            .add_slice(&[0xff, 0xff])
            .add_slice(&[0xff, 0xff])
            .add_slice(&[0x00, 0x01])
            .checksum();
        assert_eq!(checksum, !0x1_u16);
    }

    #[test]
    fn checksum_with_repeated_overflow() {
        let checksum = ChecksumDigest {
            checksum_with_overflow: 0xffff_ffff,
        }
        .checksum();
        assert_eq!(checksum, !0xffff_u16);
    }

    #[test]
    fn rfc1071_example_binary_data() {
        let checksum = ChecksumDigest::default()
            .add_slice(b"\0\x01\xf2\x03\xf4\xf5\xf6\xf7")
            .checksum();
        assert_eq!(checksum, !0xddf2);
    }

    #[test]
    fn odd_length_slice_is_zero_padded() {
        let data = b"\0\x01\xf2\x03\xf4\xf5\xf6\xf7\x01";
        let checksum = ChecksumDigest::default().add_slice(data).checksum();

        assert_eq!(checksum, 0x210d);
        assert_eq!(checksum, reference_checksum(data));
    }

    #[test]
    fn long_input_matches_reference() {
        let data: Vec<u8> = (0..=u8::MAX).cycle().take(70_001).collect();

        assert_eq!(
            ChecksumDigest::default().add_slice(&data).checksum(),
            reference_checksum(&data)
        );
    }

    mod ipv4_header {
        use super::*;

        const HEADER_WITHOUT_CHECKSUM: [u8; 20] = [
            0x45, 0x00, 0x00, 0x28, 0xec, 0x6c, 0x40, 0x00, 0x40, 0x06, 0x00, 0x00, 0xc0, 0xa8,
            0x01, 0x60, 0xc0, 0xa8, 0x01, 0xfe,
        ];

        #[test]
        fn checksum_using_reference() {
            assert_eq!(reference_checksum(&HEADER_WITHOUT_CHECKSUM), 0xc9b4);
        }

        #[test]
        fn checksum_using_add_slice() {
            let checksum = ChecksumDigest::default()
                .add_slice(&HEADER_WITHOUT_CHECKSUM)
                .checksum();
            assert_eq!(checksum, 0xc9b4);
        }

        /// If x = checksum(input) then checksum(input || x) is 0.
        #[test]
        fn checksum_including_checksum() {
            let checksum = ChecksumDigest::default()
                .add_slice(&HEADER_WITHOUT_CHECKSUM)
                .add_slice(&[0xc9, 0xb4])
                .checksum();
            assert_eq!(checksum, 0);
        }
    }
}
