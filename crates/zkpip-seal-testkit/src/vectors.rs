//! Golden test vectors for deterministic sealing.
//!
//! Each vector fixes the canonical bytes, digest, URN and Ed25519 signature
//! for a body. Any implementation of the seal format must reproduce them.

use serde::Serialize;
use serde_json::Value;
use zkpip_seal_core::{
    canonicalize, digest_hex, parse_kind, sign_canonical, Keypair, Kind, Seal, SealBuilder,
};

/// Key id used when sealing golden vectors.
pub const GOLDEN_KEY_ID: &str = "golden";

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Kind tag the body is sealed under.
    pub kind: &'static str,
    /// Seed for deterministic key generation (every byte equal to this value).
    pub seed_byte: u8,
    /// Body as JSON text, keys deliberately out of order.
    pub input: &'static str,
    /// Expected canonical form.
    pub canonical: &'static str,
    /// Expected SHA-256 of the canonical form (hex).
    pub digest: &'static str,
    /// Expected signature (padded base64).
    pub signature: &'static str,
}

impl GoldenVector {
    pub fn seed(&self) -> [u8; 32] {
        [self.seed_byte; 32]
    }

    pub fn keypair(&self) -> Keypair {
        Keypair::from_seed(&self.seed())
    }

    pub fn body(&self) -> Value {
        serde_json::from_str(self.input).unwrap_or(Value::Null)
    }

    pub fn kind(&self) -> Kind {
        parse_kind(self.kind, true).unwrap_or_default()
    }

    pub fn urn(&self) -> String {
        format!("urn:zkpip:{}:sha256:{}", self.kind, self.digest)
    }

    /// Seal the body under [`GOLDEN_KEY_ID`], without signer or timestamp.
    pub fn sealed(&self) -> Seal {
        match SealBuilder::new(self.body())
            .kind(self.kind())
            .key_id(GOLDEN_KEY_ID)
            .sign(&self.keypair())
        {
            Ok(seal) => seal,
            Err(e) => unreachable!("golden body {} failed to canonicalize: {e}", self.name),
        }
    }

    /// Recompute every output and report the first disagreement.
    pub fn check(&self) -> Result<(), String> {
        let bytes = canonicalize(&self.body()).map_err(|e| e.to_string())?;
        if bytes.as_str() != self.canonical {
            return Err(format!("canonical: got {}", bytes.as_str()));
        }
        let digest = digest_hex(bytes.as_bytes());
        if digest != self.digest {
            return Err(format!("digest: got {digest}"));
        }
        let signature = sign_canonical(&bytes, &self.keypair());
        if signature != self.signature {
            return Err(format!("signature: got {signature}"));
        }
        let seal = self.sealed();
        if seal.seal.urn != self.urn() {
            return Err(format!("urn: got {}", seal.seal.urn));
        }
        Ok(())
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "ordered_pair",
            kind: "vector",
            seed_byte: 0x42,
            input: r#"{"b":1,"a":2}"#,
            canonical: r#"{"a":2,"b":1}"#,
            digest: "d3626ac30a87e6f7a6428233b3c68299976865fa5508e4267c5415c76af7a772",
            signature: "IYJfZVEa4lvgnELDbsIaxHwGLIR/ChfreoU57izDns26Fs5uCXOOzJL5Fz/5CrcgcwEZctqpIy4eLgn481HnBw==",
        },
        GoldenVector {
            name: "nested_scenario",
            kind: "vector",
            seed_byte: 0x42,
            input: r#"{"zeta":3,"alpha":"x","nested":{"b":[3,2,1],"a":{"y":null,"x":true}},"list":[{"k":"v"},{"k":"w"}]}"#,
            canonical: r#"{"alpha":"x","list":[{"k":"v"},{"k":"w"}],"nested":{"a":{"x":true,"y":null},"b":[3,2,1]},"zeta":3}"#,
            digest: "fda55810d1cbe821bd586c2c88dae2adf9b87053feb11cb022b3002f79363b2b",
            signature: "eQ2/0qWdd46XTFK7hqgRqd5l9Ic5w8uUtg6dxNxvhMMxPG2EkmT9L9DK8Pozbdz3DyKcnF4qfDcA8CR2joWTAQ==",
        },
        GoldenVector {
            name: "empty_object",
            kind: "vector",
            seed_byte: 0x01,
            input: "{}",
            canonical: "{}",
            digest: "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a",
            signature: "Q1z4N3LDhSt5Vq2AXvxbv8v7U3ZVMGxTML2/amGKJHaFidFsjYtvwji54+oWbb7AcrLPDoCiF7yMOgZ8kDfQCw==",
        },
        GoldenVector {
            name: "scalars",
            kind: "proof",
            seed_byte: 0x02,
            input: r#"{"s":"hi","n":null,"i":-17,"t":true,"f":false}"#,
            canonical: r#"{"f":false,"i":-17,"n":null,"s":"hi","t":true}"#,
            digest: "0d4a6ee5cb99b3167ecdeb6ef2b16b3a181b9313c86eacc19a96ecdb4276fcfa",
            signature: "2xLYNAsMTNvCtoA196HlF9rESC6iHG5imwcOaINhVyjCnwtEFVJQQxU0ClgpS4cMn5Sl6KS1x5iru2lYbbv6CA==",
        },
        GoldenVector {
            name: "unicode_and_escapes",
            kind: "manifest",
            seed_byte: 0x03,
            input: r#"{"ключ":"значение","quote":"say \"hi\"\n","tab":"a\tb","emoji":"😀","ctl":"\u0001"}"#,
            canonical: r#"{"ctl":"\u0001","emoji":"😀","quote":"say \"hi\"\n","tab":"a\tb","ключ":"значение"}"#,
            digest: "3ad65404d873fed254363f557d0e3cce407bd754af70c50b6e086bed81c29a31",
            signature: "hIZpiTfMePa+DzSbUtabcWdZHVhYPoyTcOFWBf8ZBUNwSbZzQtl/+MXzDhrsvYady92QWBjQao3lHmGIs6ToCQ==",
        },
        GoldenVector {
            name: "floats",
            kind: "schema",
            seed_byte: 0x04,
            input: r#"{"whole":2.0,"tenth":0.1,"half":1.5,"big":1e21,"small":1e-7}"#,
            canonical: r#"{"big":1e+21,"half":1.5,"small":1e-7,"tenth":0.1,"whole":2}"#,
            digest: "936242ded2933950591ccfa54c519d0368ac44a1e78db815c8c16c8af8e09e09",
            signature: "CZo2YwLJChKVPQjBBfCNc54qyzObrLcvsi5o+NYIMPxGMNdV7IUfjvmwKFVHTGescb7CrXOF76I3dWqc+s5xCg==",
        },
        GoldenVector {
            name: "nested_arrays",
            kind: "x-acme-trace",
            seed_byte: 0x05,
            input: r#"[[],[[]],{"a":[]}]"#,
            canonical: r#"[[],[[]],{"a":[]}]"#,
            digest: "b5a849444c22b5aa2785f0bb163a82a383d365e4e8f19fed90ccdd17afa9fb31",
            signature: "XtAt1+LPyDeM3TfovRCCHswylBzAG73lDJrBnp1cVGb0Z6lHs7jScKpiprTRDLPcGFn6ls6Izm8ONKBfzScmCA==",
        },
        GoldenVector {
            name: "integer_extremes",
            kind: "circuit",
            seed_byte: 0x06,
            input: r#"{"min":-9223372036854775808,"max":18446744073709551615}"#,
            canonical: r#"{"max":18446744073709551615,"min":-9223372036854775808}"#,
            digest: "cfe0eb53032eebf76ab409341ba8a6c618e9db2280a04e5ebdcbecdee12ef837",
            signature: "1jzQ9xXmXUCx3w08Wo2ONyT8R/D4oe3+jWKSTeiEAroHyGo/YyeLHgwx7BKuY+12WEYxS5mfZ48tJVDBrYD2Bw==",
        },
    ]
}

/// Check all golden vectors.
///
/// Returns `(name, ok, detail)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match v.check() {
            Ok(()) => (v.name.to_string(), true, v.urn()),
            Err(detail) => (v.name.to_string(), false, detail),
        })
        .collect()
}

/// Export the vectors as JSON, with the derived public key of each seed.
pub fn export_vectors() -> Value {
    Value::Array(
        all_vectors()
            .iter()
            .map(|v| {
                let mut entry = serde_json::to_value(v).unwrap_or(Value::Null);
                if let Value::Object(map) = &mut entry {
                    map.insert("seed".into(), Value::String(hex::encode(v.seed())));
                    map.insert(
                        "publicKey".into(),
                        Value::String(v.keypair().public_key().to_hex()),
                    );
                    map.insert("urn".into(), Value::String(v.urn()));
                }
                entry
            })
            .collect(),
    )
}
