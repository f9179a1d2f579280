//! Deterministic plan fingerprinting derived from the explain projection.

use crate::{
    explain::{ExplainNode, ExplainPlan},
    index::IndexPlan,
};
use sha2::{Digest, Sha256};
use std::fmt;

///
/// PlanFingerprint
///
/// Stable SHA-256 digest of a compiled plan. Equal trees hash equally;
/// source locations do not take part.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PlanFingerprint([u8; 32]);

impl PlanFingerprint {
    #[must_use]
    pub fn of(plan: &ExplainPlan) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"quernfp:v1");

        write_tag(&mut hasher, 0x01);
        hash_node(&mut hasher, &plan.root);

        match &plan.index {
            Some(index) => {
                write_tag(&mut hasher, 0x02);
                hash_index(&mut hasher, index);
            }
            None => write_tag(&mut hasher, 0x03),
        }

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::with_capacity(64);
        for byte in self.0 {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl fmt::Display for PlanFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

fn hash_node(hasher: &mut Sha256, node: &ExplainNode) {
    write_tag(hasher, 0x10);
    write_str(hasher, &node.name);

    write_len_u32(hasher, node.attributes.len());
    for (key, value) in &node.attributes {
        write_str(hasher, key);
        write_str(hasher, value);
    }

    write_len_u32(hasher, node.children.len());
    for child in &node.children {
        hash_node(hasher, child);
    }
}

fn hash_index(hasher: &mut Sha256, plan: &IndexPlan) {
    match plan {
        IndexPlan::Lookup(name) => {
            write_tag(hasher, 0x20);
            write_str(hasher, name);
        }
        IndexPlan::Intersect(inputs) => {
            write_tag(hasher, 0x21);
            write_len_u32(hasher, inputs.len());
            for input in inputs {
                hash_index(hasher, input);
            }
        }
        IndexPlan::Union(inputs) => {
            write_tag(hasher, 0x22);
            write_len_u32(hasher, inputs.len());
            for input in inputs {
                hash_index(hasher, input);
            }
        }
        IndexPlan::Empty => write_tag(hasher, 0x23),
    }
}

///
/// Encode one string with length prefix into the hash stream.
///

fn write_str(hasher: &mut Sha256, value: &str) {
    write_len_u32(hasher, value.len());
    hasher.update(value.as_bytes());
}

/// Encode a platform-sized length as u32 with deterministic saturation.
fn write_len_u32(hasher: &mut Sha256, len: usize) {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

///
/// TESTS
///
