use md5::{Digest, Md5};

/// Incremental MD5 over chunks as they arrive, finalized to lowercase hex.
#[derive(Default)]
pub struct Md5Accumulator {
    hasher: Md5,
}

impl Md5Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
    }

    pub fn finalize_hex(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

pub fn calculate_md5(data: &[u8]) -> String {
    let mut acc = Md5Accumulator::new();
    acc.update(data);
    acc.finalize_hex()
}
