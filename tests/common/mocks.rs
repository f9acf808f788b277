//! Mock version of a field converter.
use mockall::mock;

use dsv_rs::FieldCodec;

use super::Cents;

mock! {
    pub Codec {}
    impl FieldCodec for Codec {
        type Value = Cents;
        fn decode(&self, bytes: &[u8]) -> Option<Cents>;
        fn encode(&self, value: &Cents) -> Option<Vec<u8>>;
    }
}
