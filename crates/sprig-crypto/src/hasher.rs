use std::io::{self, Read};

use sprig_types::ObjectId;

/// Kind-framed BLAKE3 content hasher.
///
/// Each hasher carries a kind tag (`"blob"`, `"tree"`, `"commit"`). The digest
/// covers the frame header `"<kind> <len>\0"` followed by the payload, so the
/// id is a pure function of kind and payload.
pub struct ContentHasher {
    kind: &'static str,
}

impl ContentHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self { kind: "blob" };
    /// Hasher for tree objects.
    pub const TREE: Self = Self { kind: "tree" };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self { kind: "commit" };

    /// Hash an in-memory payload.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = self.framed(data.len() as u64);
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash a payload of known length streamed from `reader`.
    ///
    /// Fails with `UnexpectedEof`/`InvalidData` if the reader does not yield
    /// exactly `len` bytes, since the frame header would then be wrong.
    pub fn hash_reader<R: Read>(&self, len: u64, mut reader: R) -> io::Result<ObjectId> {
        let mut hasher = self.framed(len);
        let mut buf = [0u8; 64 * 1024];
        let mut seen: u64 = 0;
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            seen += n as u64;
            hasher.update(&buf[..n]);
        }
        if seen != len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected {len} bytes, read {seen}"),
            ));
        }
        Ok(ObjectId::from_hash(*hasher.finalize().as_bytes()))
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    /// The kind tag used in the frame header.
    pub fn kind(&self) -> &str {
        self.kind
    }

    fn framed(&self, len: u64) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.kind.as_bytes());
        hasher.update(b" ");
        hasher.update(len.to_string().as_bytes());
        hasher.update(b"\0");
        hasher
    }
}
