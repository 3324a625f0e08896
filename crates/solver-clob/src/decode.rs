//! Decoding of BCS-packed u64 vectors returned by dev-inspect.
//!
//! The order-book view function returns each side of the book as a
//! `vector<u64>`: a ULEB128 length prefix followed by that many
//! little-endian u64 values.

use solver_types::{Result, SolverError};

/// Decodes one length-prefixed u64 vector, consuming the whole buffer.
pub fn decode_u64_vec(bytes: &[u8]) -> Result<Vec<u64>> {
	let (length, mut offset) = decode_uleb128(bytes)?;

	let mut values = Vec::with_capacity(length as usize);
	for _ in 0..length {
		let end = offset + 8;
		let chunk = bytes
			.get(offset..end)
			.ok_or_else(|| SolverError::Transient("u64 vector truncated".into()))?;
		values.push(u64::from_le_bytes(chunk.try_into().expect("slice is 8 bytes")));
		offset = end;
	}

	if offset != bytes.len() {
		return Err(SolverError::Transient(format!(
			"u64 vector has {} trailing bytes",
			bytes.len() - offset
		)));
	}
	Ok(values)
}

/// Decodes a ULEB128 value, returning it with the number of bytes read.
fn decode_uleb128(bytes: &[u8]) -> Result<(u64, usize)> {
	let mut value: u64 = 0;
	let mut shift = 0u32;
	for (i, byte) in bytes.iter().enumerate() {
		if shift >= 64 {
			return Err(SolverError::Transient("ULEB128 prefix too long".into()));
		}
		value |= u64::from(byte & 0x7f) << shift;
		if byte & 0x80 == 0 {
			return Ok((value, i + 1));
		}
		shift += 7;
	}
	Err(SolverError::Transient("ULEB128 prefix truncated".into()))
}

#[cfg(test)]
pub(crate) fn encode_u64_vec(values: &[u64]) -> Vec<u8> {
	let mut out = Vec::new();
	let mut length = values.len() as u64;
	loop {
		let byte = (length & 0x7f) as u8;
		length >>= 7;
		if length == 0 {
			out.push(byte);
			break;
		}
		out.push(byte | 0x80);
	}
	for v in values {
		out.extend_from_slice(&v.to_le_bytes());
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_vector() {
		assert_eq!(decode_u64_vec(&[0]).unwrap(), Vec::<u64>::new());
	}

	#[test]
	fn round_trip_small() {
		let values = vec![1, 2, u64::MAX, 0];
		assert_eq!(decode_u64_vec(&encode_u64_vec(&values)).unwrap(), values);
	}

	#[test]
	fn round_trip_multibyte_length() {
		// 200 elements forces a two-byte ULEB128 prefix.
		let values: Vec<u64> = (0..200).collect();
		let encoded = encode_u64_vec(&values);
		assert_eq!(encoded[0], 0xc8);
		assert_eq!(encoded[1], 0x01);
		assert_eq!(decode_u64_vec(&encoded).unwrap(), values);
	}

	#[test]
	fn truncated_payload_fails() {
		let mut encoded = encode_u64_vec(&[7, 8]);
		encoded.pop();
		assert!(decode_u64_vec(&encoded).is_err());
	}

	#[test]
	fn trailing_bytes_fail() {
		let mut encoded = encode_u64_vec(&[7]);
		encoded.push(0);
		assert!(decode_u64_vec(&encoded).is_err());
	}

	#[test]
	fn empty_buffer_fails() {
		assert!(decode_u64_vec(&[]).is_err());
	}
}
