// Reed-Solomon error correction over GF(2^8)
//------------------------------------------------------------------------------

const REDUCTION_POLY: u16 = 0x11D;

// Exponent and log tables for the field, built at compile time.
static GF_TABLES: ([u8; 256], [u8; 256]) = build_tables();

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= REDUCTION_POLY;
        }
        i += 1;
    }
    exp[255] = exp[0];
    (exp, log)
}

fn mul(x: u8, y: u8) -> u8 {
    if x == 0 || y == 0 {
        return 0;
    }
    let (exp, log) = &GF_TABLES;
    exp[(log[x as usize] as usize + log[y as usize] as usize) % 255]
}

/// Generator polynomial of the given degree, as its coefficients from
/// the second highest power down to the constant term. The leading
/// coefficient is always 1 and omitted.
pub fn compute_divisor(degree: usize) -> Vec<u8> {
    debug_assert!((1..=255).contains(&degree), "Invalid ecc degree {degree}");

    let mut result = vec![0u8; degree];
    result[degree - 1] = 1;

    // Multiply the product by (x - 2^i) for i in 0..degree.
    let mut root: u8 = 1;
    for _ in 0..degree {
        for j in 0..degree {
            result[j] = mul(result[j], root);
            if j + 1 < degree {
                result[j] ^= result[j + 1];
            }
        }
        root = mul(root, 2);
    }
    result
}

/// Remainder of `data` times x^degree divided by the generator.
pub fn compute_remainder(data: &[u8], divisor: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; divisor.len()];
    for b in data {
        let factor = b ^ result[0];
        result.rotate_left(1);
        *result.last_mut().unwrap() = 0;
        for (rem, div) in result.iter_mut().zip(divisor.iter()) {
            *rem ^= mul(*div, factor);
        }
    }
    result
}

/// ECC codewords for one block.
pub fn ecc(data: &[u8], degree: usize) -> Vec<u8> {
    let divisor = compute_divisor(degree);
    compute_remainder(data, &divisor)
}

#[cfg(test)]
mod ec_tests {
    use super::*;

    #[test]
    fn test_mul() {
        assert_eq!(mul(0, 137), 0);
        assert_eq!(mul(1, 137), 137);
        assert_eq!(mul(2, 0x80), 0x1D);
        assert_eq!(mul(0x89, 0x07), 152);
    }

    #[test]
    fn test_divisor_degree_two() {
        // (x - 1)(x - 2) = x^2 + 3x + 2
        assert_eq!(compute_divisor(2), vec![3, 2]);
    }

    #[test]
    fn test_divisor_degree_seven() {
        assert_eq!(compute_divisor(7), vec![127, 122, 154, 164, 11, 68, 117]);
    }

    #[test]
    fn test_remainder_of_divisor_is_zero() {
        // The generator divides itself exactly.
        let divisor = compute_divisor(10);
        let mut poly = vec![1u8];
        poly.extend_from_slice(&divisor);
        assert_eq!(compute_remainder(&poly, &divisor), vec![0u8; 10]);
    }

    #[test]
    fn test_random_blocks_form_valid_codewords() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let len = rng.random_range(1..120);
            let data: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            let degree = rng.random_range(1..=30);

            let divisor = compute_divisor(degree);
            let mut codeword = data.clone();
            codeword.extend(ecc(&data, degree));
            assert_eq!(compute_remainder(&codeword, &divisor), vec![0u8; degree]);
        }
    }

    #[test]
    fn test_ecc_known_vector() {
        let data = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let expected = b"\xc4\x23\x27\x77\xeb\xd7\xe7\xe2\x5d\x17";
        assert_eq!(ecc(data, 10), expected.to_vec());
    }
}
