use crate::row::ValueError;

const F64_BYTES: usize = std::mem::size_of::<f64>();

pub fn encode_vector_blob(values: &[f64]) -> Vec<u8> {
    let mut out = Vec::<u8>::with_capacity(values.len() * F64_BYTES);
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Decodes a little-endian `f64` blob. An empty blob is an empty vector.
pub fn decode_vector_blob(blob: &[u8]) -> Result<Vec<f64>, ValueError> {
    if blob.len() % F64_BYTES != 0 {
        return Err(ValueError::MalformedVector {
            byte_len: blob.len(),
        });
    }

    let mut out = Vec::<f64>::with_capacity(blob.len() / F64_BYTES);
    for chunk in blob.chunks_exact(F64_BYTES) {
        let mut bytes = [0_u8; F64_BYTES];
        bytes.copy_from_slice(chunk);
        out.push(f64::from_le_bytes(bytes));
    }

    Ok(out)
}
