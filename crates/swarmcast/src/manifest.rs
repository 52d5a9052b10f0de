//! Playlist rewriting.
//!
//! An HLS media playlist names its segments by the filenames the encoder
//! uploaded. Players fetching through a Bee gateway need `/bytes/<ref>`
//! instead, so every segment line is swapped for the reference the
//! [`SegmentCache`] holds. Everything else passes through untouched.

use crate::segments::SegmentCache;

pub const DEFAULT_SEGMENT_MARKER: &str = ".ts";

/// Counts from one rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub segments: usize,
    /// Segment lines the cache had no entry for; these point at the zero address.
    pub unresolved: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub text: String,
    pub stats: RewriteStats,
}

#[derive(Debug, Clone)]
pub struct Rewriter {
    segment_marker: String,
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENT_MARKER)
    }
}

impl Rewriter {
    pub fn new(segment_marker: impl Into<String>) -> Self {
        Self {
            segment_marker: segment_marker.into(),
        }
    }

    /// The cache key for `line`, if it references a segment.
    pub fn segment_name<'a>(&self, line: &'a str) -> Option<&'a str> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || !line.contains(&self.segment_marker) {
            return None;
        }
        line.rsplit('/').next()
    }

    pub fn rewrite(&self, manifest: &str, cache: &SegmentCache) -> Rewritten {
        let mut stats = RewriteStats::default();

        let lines: Vec<String> = manifest
            .split('\n')
            .map(|line| {
                let (body, cr) = match line.strip_suffix('\r') {
                    Some(body) => (body, "\r"),
                    None => (line, ""),
                };
                let Some(name) = self.segment_name(body) else {
                    return line.to_string();
                };

                stats.segments += 1;
                let address = cache.lookup(name).unwrap_or_else(|| {
                    stats.unresolved += 1;
                    swarmchunk::SwarmAddress::ZERO
                });
                format!("/bytes/{}{}", address.to_hex(), cr)
            })
            .collect();

        Rewritten {
            text: lines.join("\n"),
            stats,
        }
    }
}

/// Rewrite with the default `.ts` segment marker.
pub fn rewrite(manifest: &str, cache: &SegmentCache) -> String {
    Rewriter::default().rewrite(manifest, cache).text
}
