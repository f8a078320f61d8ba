use std::path::Path;

/// 128-bit cache key produced by two independently seeded FNV-1a streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub hi: u64,
    pub lo: u64,
}

/// Incremental builder for [`Fingerprint`] values.
///
/// Every write is length-prefixed where ambiguity is possible, so
/// `["ab","c"]` and `["a","bc"]` produce different keys.
pub struct FingerprintBuilder {
    a: Fnv1a64,
    b: Fnv1a64,
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintBuilder {
    pub fn new() -> Self {
        Self {
            a: Fnv1a64::new(0xcbf29ce484222325),
            b: Fnv1a64::new(0x9ae16a3b2f90404f),
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.a.write_u64(v);
        self.b.write_u64(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write_u64(u64::from(v));
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.a.write_bytes(s.as_bytes());
        self.b.write_bytes(s.as_bytes());
    }

    pub fn write_path(&mut self, p: &Path) {
        self.write_str(&p.to_string_lossy());
    }

    pub fn write_strs<'s>(&mut self, items: impl IntoIterator<Item = &'s str>) {
        let mut n = 0u64;
        for item in items {
            self.write_str(item);
            n += 1;
        }
        self.write_u64(n);
    }

    pub fn finish(self) -> Fingerprint {
        Fingerprint {
            hi: self.a.finish(),
            lo: self.b.finish(),
        }
    }
}

#[derive(Clone, Copy)]
struct Fnv1a64(u64);

impl Fnv1a64 {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        self.0 = h;
    }

    fn finish(self) -> u64 {
        self.0
    }
}
