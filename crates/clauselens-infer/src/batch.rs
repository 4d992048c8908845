//! Padding of tokenized sequences into rectangular model inputs.

/// Row-major `[batch, seq_len]` input ids and attention mask.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedBatch {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub batch: usize,
    pub seq_len: usize,
}

impl PaddedBatch {
    /// Truncate each `(ids, mask)` pair to `max_len` and right-pad to the
    /// longest remaining sequence with `pad_id`. Truncation keeps the closing
    /// special token.
    pub fn from_encodings(encodings: &[(Vec<u32>, Vec<u32>)], max_len: usize, pad_id: u32) -> Self {
        let seq_len = encodings
            .iter()
            .map(|(ids, _)| ids.len().min(max_len))
            .max()
            .unwrap_or(0)
            .max(1);

        let batch = encodings.len();
        let mut input_ids = Vec::with_capacity(batch * seq_len);
        let mut attention_mask = Vec::with_capacity(batch * seq_len);

        for (ids, mask) in encodings {
            let ids = truncate_keep_last(ids, seq_len);
            let len = ids.len();
            input_ids.extend(ids.iter().map(|&id| id as i64));
            attention_mask.extend(mask.iter().take(len).map(|&m| m as i64));
            // Mask may be shorter than ids on malformed encodings.
            attention_mask.extend(std::iter::repeat(1).take(len - mask.len().min(len)));
            input_ids.extend(std::iter::repeat(pad_id as i64).take(seq_len - len));
            attention_mask.extend(std::iter::repeat(0).take(seq_len - len));
        }

        Self {
            input_ids,
            attention_mask,
            batch,
            seq_len,
        }
    }

    /// All-zero token type ids of the same shape.
    pub fn token_type_ids(&self) -> Vec<i64> {
        vec![0; self.batch * self.seq_len]
    }
}

/// First `max_len` ids, with the final id of `ids` (`[SEP]`, `</s>`) moved
/// into the last kept position when truncation happens.
pub fn truncate_keep_last(ids: &[u32], max_len: usize) -> Vec<u32> {
    if ids.len() <= max_len {
        return ids.to_vec();
    }
    if max_len == 0 {
        return Vec::new();
    }
    let mut kept = ids[..max_len - 1].to_vec();
    kept.extend(ids.last().copied());
    kept
}
