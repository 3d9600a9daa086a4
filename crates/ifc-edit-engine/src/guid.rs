// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC GlobalId generation (22-character base64 of a random UUID)

use uuid::Uuid;

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// Fresh compressed GlobalId
pub fn new_global_id() -> String {
    compress(Uuid::new_v4().as_u128())
}

/// Encode 128 bits as 2 + 21 * 6 bits, most significant first
pub fn compress(value: u128) -> String {
    let mut out = String::with_capacity(22);
    out.push(ALPHABET[((value >> 126) & 0x3) as usize] as char);
    for i in 0..21 {
        let shift = 120 - 6 * i;
        out.push(ALPHABET[((value >> shift) & 0x3f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_bounds() {
        assert_eq!(compress(0), "0000000000000000000000");
        assert_eq!(compress(u128::MAX), "3$$$$$$$$$$$$$$$$$$$$$");
    }

    #[test]
    fn test_new_ids_are_distinct() {
        let a = new_global_id();
        let b = new_global_id();
        assert_eq!(a.len(), 22);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| ALPHABET.contains(&(c as u8))));
    }
}
