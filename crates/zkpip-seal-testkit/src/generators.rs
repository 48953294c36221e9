//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

use zkpip_seal_core::{Keypair, Kind, Seal, SealBuilder, KNOWN_KINDS};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a known or vendor-extension kind.
pub fn kind() -> impl Strategy<Value = Kind> {
    prop_oneof![
        3 => proptest::sample::select(KNOWN_KINDS.to_vec()).prop_map(Kind::from),
        1 => "x-[a-z0-9][a-z0-9-]{0,20}".prop_map(Kind::Extension),
    ]
}

/// Generate a key id that passes both the schema and the semantic check.
pub fn key_id() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._:-]{1,32}".prop_map(String::from)
}

/// Generate any finite float, subnormals included.
pub fn finite_float() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
}

/// Generate a JSON scalar.
pub fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        finite_float().prop_map(Value::from),
        "\\PC{0,16}".prop_map(Value::String),
        "[\\x00-\\x1f\"\\\\]{0,4}".prop_map(Value::String),
    ]
}

/// Generate an arbitrary JSON value of bounded depth and size.
pub fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::vec(("\\PC{0,8}", inner), 0..8).prop_map(|entries| {
                Value::Object(entries.into_iter().collect::<Map<String, Value>>())
            }),
        ]
    })
}

/// Generate a JSON object body.
pub fn json_body() -> impl Strategy<Value = Value> {
    prop::collection::vec(("\\PC{0,8}", json_value()), 0..8)
        .prop_map(|entries| Value::Object(entries.into_iter().collect()))
}

/// Parameters for generating a seal.
#[derive(Debug, Clone)]
pub struct SealParams {
    pub keypair: Keypair,
    pub key_id: String,
    pub kind: Kind,
    pub body: Value,
    pub signer: Option<String>,
}

impl Arbitrary for SealParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            keypair(),
            key_id(),
            kind(),
            json_body(),
            proptest::option::of("[a-z][a-z0-9 .-]{0,23}"),
        )
            .prop_map(|(keypair, key_id, kind, body, signer)| SealParams {
                keypair,
                key_id,
                kind,
                body,
                signer,
            })
            .boxed()
    }
}

/// Generate a seal from parameters.
pub fn seal_from_params(params: &SealParams) -> Seal {
    let mut builder = SealBuilder::new(params.body.clone())
        .kind(params.kind.clone())
        .key_id(params.key_id.clone());

    if let Some(signer) = &params.signer {
        builder = builder.signer(signer.clone());
    }

    builder
        .sign(&params.keypair)
        .expect("generated bodies stay within the depth limit")
}
