use log::debug;

use crate::common::{
    codec::{pad_remaining_capacity, push_segment, push_terminator, total_bits, Segment},
    ec::ecc,
    error::{QRError, QRResult},
    mask::MaskPattern,
    metadata::{ECLevel, Version},
    BitStream,
};

pub mod qr;

use qr::QrCode;

// QR builder
//------------------------------------------------------------------------------

pub struct QRBuilder<'a> {
    data: &'a [u8],
    ec_level: ECLevel,
    min_version: Version,
    max_version: Version,
    mask: Option<MaskPattern>,
    boost_ecl: bool,
}

impl<'a> QRBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            ec_level: ECLevel::M,
            min_version: Version::MIN,
            max_version: Version::MAX,
            mask: None,
            boost_ecl: true,
        }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.data = data;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.min_version = version;
        self.max_version = version;
        self
    }

    pub fn version_range(&mut self, min: Version, max: Version) -> &mut Self {
        debug_assert!(min <= max, "Empty version range");
        self.min_version = min;
        self.max_version = max;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    pub fn boost_ecl(&mut self, boost_ecl: bool) -> &mut Self {
        self.boost_ecl = boost_ecl;
        self
    }

    /// Encodes the data as text when it is valid UTF-8, otherwise in
    /// byte mode.
    pub fn build(&self) -> QRResult<QrCode> {
        let segs = match std::str::from_utf8(self.data) {
            Ok(text) => Segment::make_segments(text),
            Err(_) => vec![Segment::make_bytes(self.data)],
        };
        encode_segments_advanced(
            &segs,
            self.ec_level,
            self.min_version,
            self.max_version,
            self.mask,
            self.boost_ecl,
        )
    }
}

/// Encodes `text` at the smallest fitting version, boosting the error
/// correction level when the version has room.
pub fn encode_text(text: &str, ec_level: ECLevel) -> QRResult<QrCode> {
    let segs = Segment::make_segments(text);
    encode_segments(&segs, ec_level)
}

/// Encodes `data` in byte mode.
pub fn encode_bytes(data: &[u8], ec_level: ECLevel) -> QRResult<QrCode> {
    let segs = vec![Segment::make_bytes(data)];
    encode_segments(&segs, ec_level)
}

pub fn encode_segments(segs: &[Segment], ec_level: ECLevel) -> QRResult<QrCode> {
    encode_segments_advanced(segs, ec_level, Version::MIN, Version::MAX, None, true)
}

pub fn encode_segments_advanced(
    segs: &[Segment],
    ec_level: ECLevel,
    min_version: Version,
    max_version: Version,
    mask: Option<MaskPattern>,
    boost_ecl: bool,
) -> QRResult<QrCode> {
    debug!("Finding smallest fitting version...");
    let (version, used_bits) = find_version(segs, ec_level, min_version, max_version)?;

    let mut ecl = ec_level;
    if boost_ecl {
        for higher in [ECLevel::M, ECLevel::Q, ECLevel::H] {
            if higher > ecl && used_bits <= version.data_bit_capacity(higher) {
                ecl = higher;
            }
        }
    }
    debug!("Version {version}, ec level {ecl}, {used_bits} data bits");

    debug!("Assembling data codewords...");
    let bit_capacity = version.data_bit_capacity(ecl);
    let mut bs = BitStream::with_capacity(bit_capacity);
    for seg in segs {
        push_segment(seg, version, &mut bs);
    }
    push_terminator(&mut bs, bit_capacity);
    pad_remaining_capacity(&mut bs, bit_capacity);
    assert!(
        bs.len() == bit_capacity,
        "Assembled {} bits for a capacity of {bit_capacity}",
        bs.len()
    );

    debug!("Computing ecc & interleaving...");
    let (data_blocks, ecc_blocks) = compute_ecc(bs.data(), version, ecl);
    let mut payload = BitStream::with_capacity(version.total_codewords() << 3);
    for byte in interleave(&data_blocks) {
        payload.push_bits(byte as u32, 8);
    }
    for byte in interleave(&ecc_blocks) {
        payload.push_bits(byte as u32, 8);
    }

    debug!("Drawing QR...");
    let mut qr = QrCode::new(version, ecl);
    qr.draw_all_function_patterns();
    qr.draw_encoding_region(&payload);

    match mask {
        Some(m) => qr.apply_mask(m),
        None => {
            qr.apply_best_mask();
        }
    }
    debug!("QR generated, mask {:?}", qr.mask());

    Ok(qr)
}

fn find_version(
    segs: &[Segment],
    ec_level: ECLevel,
    min_version: Version,
    max_version: Version,
) -> QRResult<(Version, usize)> {
    for v in *min_version..=*max_version {
        let version = Version::new(v);
        if let Some(bits) = total_bits(segs, version) {
            if bits <= version.data_bit_capacity(ec_level) {
                return Ok((version, bits));
            }
        }
    }
    Err(QRError::DataTooLong)
}

// ECC: Error Correction Codeword generator
fn compute_ecc(data: &[u8], version: Version, ec_level: ECLevel) -> (Vec<&[u8]>, Vec<Vec<u8>>) {
    let data_blocks = blockify(data, version, ec_level);

    let ecc_size_per_block = version.ecc_per_block(ec_level);
    let ecc_blocks = data_blocks.iter().map(|b| ecc(b, ecc_size_per_block)).collect::<Vec<_>>();

    (data_blocks, ecc_blocks)
}

fn blockify(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<&[u8]> {
    let (block1_size, block1_count, block2_size, block2_count) =
        version.data_codewords_per_block(ec_level);

    let total_blocks = block1_count + block2_count;
    let total_block1_size = block1_size * block1_count;
    let total_size = total_block1_size + block2_size * block2_count;

    debug_assert!(
        total_size == data.len(),
        "Data len doesn't match total size of blocks: Data len {}, Total block size {}",
        data.len(),
        total_size
    );

    let mut data_blocks = Vec::with_capacity(total_blocks);
    data_blocks.extend(data[..total_block1_size].chunks(block1_size));
    if block2_count > 0 {
        data_blocks.extend(data[total_block1_size..].chunks(block2_size));
    }
    data_blocks
}

fn interleave<T: Copy, V: std::ops::Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
    let max_block_size = blocks.iter().map(|b| b.len()).max().expect("Blocks is empty");
    let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
    let mut res = Vec::with_capacity(total_size);
    for i in 0..max_block_size {
        for b in blocks {
            if i < b.len() {
                res.push(b[i]);
            }
        }
    }
    res
}

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn test_add_ec_simple() {
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let expected_ecc = [b"\xc4\x23\x27\x77\xeb\xd7\xe7\xe2\x5d\x17"];
        let (_, ecc) = compute_ecc(msg, Version::new(1), ECLevel::M);
        assert_eq!(&*ecc, expected_ecc);
    }

    #[test]
    fn test_add_ec_complex() {
        let msg = b"CUF\x86W&U\xc2w2\x06\x12\x06g&\xf6\xf6B\x07v\x86\xf2\x07&V\x16\xc6\xc7\x92\x06\
                    \xb6\xe6\xf7w2\x07v\x86W&R\x06\x86\x972\x07F\xf7vV\xc2\x06\x972\x10\xec\x11\xec\
                    \x11\xec\x11\xec";
        let expected_ec = [
            b"\xd5\xc7\x0b\x2d\x73\xf7\xf1\xdf\xe5\xf8\x9a\x75\x9a\x6f\x56\xa1\x6f\x27",
            b"\x57\xcc\x60\x3c\xca\xb6\x7c\x9d\xc8\x86\x1b\x81\xd1\x11\xa3\xa3\x78\x85",
            b"\x94\x74\xb1\xd4\x4c\x85\x4b\xf2\xee\x4c\xc3\xe6\xbd\x0a\x6c\xf0\xc0\x8d",
            b"\xeb\x9f\x05\xad\x18\x93\x3b\x21\x6a\x28\xff\xac\x52\x02\x83\x20\xb2\xec",
        ];
        let (_, ecc) = compute_ecc(msg, Version::new(5), ECLevel::Q);
        assert_eq!(&*ecc, &expected_ec[..]);
    }

    #[test]
    fn test_blockify_short_blocks_first() {
        let data: Vec<u8> = (0..62).collect();
        let blocks = blockify(&data, Version::new(5), ECLevel::Q);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].len(), 15);
        assert_eq!(blocks[1].len(), 15);
        assert_eq!(blocks[2].len(), 16);
        assert_eq!(blocks[3].len(), 16);
        assert_eq!(blocks[2][0], 30);
    }

    #[test]
    fn test_interleave() {
        let blocks = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9, 0]];
        let interleaved = interleave(&blocks);
        let exp_interleaved = vec![1, 4, 7, 2, 5, 8, 3, 6, 9, 0];
        assert_eq!(interleaved, exp_interleaved);
    }

    #[test]
    fn test_version_search() {
        let segs = Segment::make_segments("Hello, world!");
        let (version, bits) = find_version(&segs, ECLevel::L, Version::MIN, Version::MAX).unwrap();
        assert_eq!(version, Version::new(1));
        assert_eq!(bits, 4 + 8 + 13 * 8);
    }

    #[test]
    fn test_version_search_overflow() {
        let segs = vec![Segment::make_bytes(&[0u8; 3000])];
        let res = find_version(&segs, ECLevel::H, Version::MIN, Version::MAX);
        assert!(matches!(res, Err(QRError::DataTooLong)));
    }
}
