//! Fixed fingerprint and escaping vectors
//!
//! These pin the exact bytes-on-the-wire behavior against independently
//! computed values. A change that breaks one of these breaks compatibility
//! with certificates already issued.

use crate::fingerprint;
use crate::xml;

struct FingerprintVector {
    content: &'static str,
    fingerprint: &'static str,
}

// SHA-256 digests computed with `printf %s <content> | sha256sum`
const FINGERPRINT_VECTORS: &[FingerprintVector] = &[
    FingerprintVector {
        content: "hello",
        fingerprint: "2CF24DBA5FB0A30E26E83B2AC5B9E29E1B161E5C1FA7425E73043362938B9824",
    },
    FingerprintVector {
        content: "abc",
        fingerprint: "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD",
    },
    FingerprintVector {
        content: "The quick brown fox jumps over the lazy dog",
        fingerprint: "D7A8FBB307D7809469CA9ABCB0082E4F8D5651E46D3CDB762D02D0BF37C9E592",
    },
];

#[test]
fn test_fingerprint_vectors() {
    for v in FINGERPRINT_VECTORS {
        let (raw, hash) = fingerprint::fingerprint(v.content);
        assert_eq!(raw, v.content);
        assert_eq!(hash, v.fingerprint, "content: {:?}", v.content);
    }
}

#[test]
fn test_fingerprint_vectors_hold_for_padded_input() {
    // trimming happens before hashing, so padding never changes the digest
    for v in FINGERPRINT_VECTORS {
        let padded = format!("\n  {}\t ", v.content);
        assert_eq!(fingerprint::fingerprint(&padded).1, v.fingerprint);
    }
}

#[test]
fn test_fingerprint_vectors_hold_for_encoded_input() {
    // entity-encoded input is decoded before hashing
    let (_, hash) = fingerprint::fingerprint("fish &amp; chips");
    let (_, plain) = fingerprint::fingerprint("fish & chips");
    assert_eq!(hash, plain);
}

#[test]
fn test_escape_vectors() {
    let vectors: &[(&str, &str)] = &[
        ("plain text", "plain text"),
        ("a & b", "a &amp; b"),
        ("<b>bold</b>", "&lt;b&gt;bold&lt;/b&gt;"),
        ("say \"hi\"", "say &quot;hi&quot;"),
        ("it's", "it&apos;s"),
        ("a &amp; b", "a &amp; b"),
        ("  trimmed  ", "trimmed"),
        ("tab\u{0B}stop", "tab stop"),
        ("soh\u{01}mark", "soh&#x1;mark"),
    ];
    for (input, expected) in vectors {
        assert_eq!(xml::escape(input), *expected, "input: {input:?}");
    }
}
